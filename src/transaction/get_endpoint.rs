//! The endpoint for reading a single transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, User,
    database_id::TransactionId,
    transaction::{Transaction, get_transaction},
};

/// The state needed to read a transaction.
#[derive(Debug, Clone)]
pub struct GetTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GetTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that responds with one of the logged in user's transactions.
///
/// # Errors
///
/// Returns [Error::NotFound] if the user has no transaction with the given ID.
pub async fn get_transaction_endpoint(
    State(state): State<GetTransactionState>,
    Extension(user): Extension<User>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Transaction>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    get_transaction(user.id, transaction_id, &connection).map(Json)
}
