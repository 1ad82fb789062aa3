//! The endpoint for listing the logged in user's transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, User,
    pagination::{PageQuery, PaginationConfig},
    transaction::{Transaction, list_transactions},
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config,
        }
    }
}

/// A route handler that responds with a page of the user's transactions, newest first.
///
/// The page is selected with the optional `skip` and `limit` query parameters.
pub async fn list_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    Extension(user): Extension<User>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let page = query.resolve(&state.pagination_config);

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    list_transactions(user.id, page, &connection).map(Json)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Router, routing::get};
    use axum_test::TestServer;
    use rust_decimal_macros::dec;
    use time::macros::datetime;

    use crate::{
        pagination::PaginationConfig,
        test_utils::{get_test_connection, insert_category, insert_user},
        transaction::{
            Amount, Transaction, TransactionType, create_transaction,
            list_endpoint::{ListTransactionsState, list_transactions_endpoint},
        },
    };

    fn get_test_server(transaction_count: u32) -> TestServer {
        let connection = get_test_connection();
        let user = insert_user("alice@example.com", &connection);
        let category = insert_category("Other", &connection);
        for _ in 0..transaction_count {
            create_transaction(
                Transaction::build(
                    Amount::new(dec!(1)).unwrap(),
                    TransactionType::Expense,
                    category.id,
                ),
                user.id,
                datetime!(2025-10-19 12:00:00 UTC),
                &connection,
            )
            .unwrap();
        }

        let app = Router::new()
            .route("/transactions", get(list_transactions_endpoint))
            .layer(Extension(user))
            .with_state(ListTransactionsState {
                db_connection: Arc::new(Mutex::new(connection)),
                pagination_config: PaginationConfig {
                    default_limit: 3,
                    max_limit: 4,
                },
            });

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn uses_default_limit() {
        let server = get_test_server(10);

        let transactions: Vec<Transaction> = server.get("/transactions").await.json();

        assert_eq!(transactions.len(), 3);
    }

    #[tokio::test]
    async fn caps_limit() {
        let server = get_test_server(10);

        let transactions: Vec<Transaction> = server
            .get("/transactions")
            .add_query_param("limit", 1000)
            .await
            .json();

        assert_eq!(transactions.len(), 4);
    }

    #[tokio::test]
    async fn skips_transactions() {
        let server = get_test_server(5);

        let transactions: Vec<Transaction> = server
            .get("/transactions")
            .add_query_param("skip", 3)
            .add_query_param("limit", 4)
            .await
            .json();

        assert_eq!(transactions.len(), 2);
    }

    #[tokio::test]
    async fn empty_list() {
        let server = get_test_server(0);

        let response = server.get("/transactions").await;

        response.assert_status_ok();
        response.assert_json(&serde_json::json!([]));
    }
}
