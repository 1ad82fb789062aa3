//! The endpoint for changing some fields of a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    AppState, Error, User,
    category::CategoryId,
    database_id::TransactionId,
    transaction::{
        Amount, Currency, Transaction, TransactionType, TransactionUpdate, update_transaction,
    },
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The JSON body for editing a transaction. Missing fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct EditTransactionRequest {
    pub amount: Option<Decimal>,
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub currency: Option<String>,
}

impl TryFrom<EditTransactionRequest> for TransactionUpdate {
    type Error = Error;

    fn try_from(request: EditTransactionRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            amount: request.amount.map(Amount::new).transpose()?,
            transaction_type: request.transaction_type,
            description: request.description,
            currency: request
                .currency
                .as_deref()
                .map(Currency::new)
                .transpose()?,
            category_id: request.category_id,
        })
    }
}

/// A route handler for updating one of the logged in user's transactions.
///
/// # Errors
///
/// Returns a 404 if the user has no transaction with the given ID and a 400
/// if a new value is invalid.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Extension(user): Extension<User>,
    Path(transaction_id): Path<TransactionId>,
    Json(request): Json<EditTransactionRequest>,
) -> Result<Json<Transaction>, Error> {
    let update = TransactionUpdate::try_from(request)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transaction = update_transaction(user.id, transaction_id, update, &connection)?;

    Ok(Json(transaction))
}
