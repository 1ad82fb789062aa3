//! Per-user totals of income and expenses.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, User, auth::UserID};

/// The totals of a user's transactions.
///
/// Amounts in different currencies are added up as they are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionSummary {
    /// The sum of all income.
    pub total_income: Decimal,
    /// The sum of all expenses.
    pub total_expenses: Decimal,
    /// Income minus expenses, negative if the user spent more than they earned.
    pub balance: Decimal,
    /// How many transactions the user has.
    pub transaction_count: i64,
}

/// Add up the transactions owned by `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn summarize_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<TransactionSummary, Error> {
    let (income_cents, expense_cents, transaction_count): (i64, i64, i64) = connection
        .query_row(
            "SELECT
                COALESCE(SUM(CASE WHEN type = 'income' THEN amount END), 0),
                COALESCE(SUM(CASE WHEN type = 'expense' THEN amount END), 0),
                COUNT(id)
             FROM \"transaction\"
             WHERE user_id = :user_id",
            &[(":user_id", &user_id.as_i64())],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

    Ok(TransactionSummary {
        total_income: Decimal::new(income_cents, 2),
        total_expenses: Decimal::new(expense_cents, 2),
        balance: Decimal::new(income_cents - expense_cents, 2),
        transaction_count,
    })
}

/// The state needed to summarize transactions.
#[derive(Debug, Clone)]
pub struct TransactionSummaryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionSummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that responds with the totals of the logged in user's transactions.
pub async fn get_transaction_summary(
    State(state): State<TransactionSummaryState>,
    Extension(user): Extension<User>,
) -> Result<Json<TransactionSummary>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    summarize_transactions(user.id, &connection).map(Json)
}
