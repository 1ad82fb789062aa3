//! The endpoint for recording a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    AppState, Error, User,
    category::CategoryId,
    clock::Clock,
    transaction::{Amount, Currency, Transaction, TransactionType, create_transaction},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Timestamps new transactions.
    pub clock: Arc<dyn Clock>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            clock: state.clock.clone(),
        }
    }
}

/// The JSON body for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub description: String,
    pub category_id: CategoryId,
    pub currency: Option<String>,
}

/// A route handler for creating a new transaction owned by the logged in user.
///
/// # Errors
///
/// Returns a 400 error if the amount or currency is invalid or the category
/// does not exist.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<Json<Transaction>, Error> {
    let amount = Amount::new(request.amount)?;
    let currency = match request.currency.as_deref() {
        Some(code) => Currency::new(code)?,
        None => Currency::default(),
    };

    let builder = Transaction::build(amount, request.transaction_type, request.category_id)
        .description(&request.description)
        .currency(currency);

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transaction = create_transaction(builder, user.id, state.clock.now(), &connection)?;
    tracing::debug!(
        "Created transaction {} for user {}",
        transaction.id,
        user.id
    );

    Ok(Json(transaction))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{
        test_utils::{get_test_clock, get_test_connection, insert_category, insert_user},
        transaction::create_endpoint::{CreateTransactionState, create_transaction_endpoint},
    };

    fn get_test_server() -> (TestServer, i64) {
        let connection = get_test_connection();
        let user = insert_user("alice@example.com", &connection);
        let category = insert_category("Salary", &connection);

        let app = Router::new()
            .route("/transactions", post(create_transaction_endpoint))
            .layer(Extension(user))
            .with_state(CreateTransactionState {
                db_connection: Arc::new(Mutex::new(connection)),
                clock: Arc::new(get_test_clock()),
            });

        (
            TestServer::try_new(app).expect("Could not create test server."),
            category.id,
        )
    }

    #[tokio::test]
    async fn create_transaction_echoes_normalized_amount() {
        let (server, category_id) = get_test_server();

        let response = server
            .post("/transactions")
            .json(&json!({
                "amount": 100.50,
                "type": "income",
                "description": "Pay",
                "category_id": category_id,
            }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["amount"], "100.50");
        assert_eq!(body["type"], "income");
        assert_eq!(body["currency"], "USD");
        assert_eq!(body["description"], "Pay");
        assert_eq!(body["date"], "2025-10-19T12:00:00Z");
        assert_eq!(body["category"]["name"], "Salary");
    }

    #[tokio::test]
    async fn create_transaction_accepts_string_amount_and_currency() {
        let (server, category_id) = get_test_server();

        let response = server
            .post("/transactions")
            .json(&json!({
                "amount": "42",
                "type": "expense",
                "description": "Books",
                "category_id": category_id,
                "currency": "nzd",
            }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["amount"], "42.00");
        assert_eq!(body["currency"], "NZD");
    }

    #[tokio::test]
    async fn create_transaction_rejects_too_many_decimal_places() {
        let (server, category_id) = get_test_server();

        server
            .post("/transactions")
            .json(&json!({
                "amount": "1.005",
                "type": "expense",
                "description": "",
                "category_id": category_id,
            }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn create_transaction_rejects_invalid_currency() {
        let (server, category_id) = get_test_server();

        server
            .post("/transactions")
            .json(&json!({
                "amount": "1.00",
                "type": "expense",
                "description": "",
                "category_id": category_id,
                "currency": "dollars",
            }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn create_transaction_rejects_missing_category() {
        let (server, category_id) = get_test_server();

        let response = server
            .post("/transactions")
            .json(&json!({
                "amount": "1.00",
                "type": "expense",
                "description": "",
                "category_id": category_id + 1,
            }))
            .await;

        response.assert_status_bad_request();
        response.assert_json(&json!({
            "detail": format!("Category {} does not exist", category_id + 1)
        }));
    }

    #[tokio::test]
    async fn create_transaction_requires_description() {
        let (server, category_id) = get_test_server();

        server
            .post("/transactions")
            .json(&json!({
                "amount": "1.00",
                "type": "expense",
                "category_id": category_id,
            }))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}
