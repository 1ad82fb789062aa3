//! Defines the core data models and database queries for transactions.
//!
//! Every query takes the owner's [UserID] and only ever touches rows owned by
//! that user. A transaction that exists but belongs to someone else is
//! reported exactly like one that does not exist.

use std::fmt::Display;

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Type, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    category::{Category, CategoryId, CategoryName},
    database_id::TransactionId,
    pagination::Page,
    transaction::{Amount, Currency},
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionType {
    fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(FromSqlError::Other(
                format!("unknown transaction type \"{other}\"").into(),
            )),
        }
    }
}

/// An income or expense recorded by a user.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The amount of money earned or spent, always non-negative.
    pub amount: Amount,
    /// Whether `amount` was earned or spent.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The currency `amount` is in.
    pub currency: Currency,
    /// When the transaction was recorded. Assigned by the server.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// The user that owns the transaction.
    pub user_id: UserID,
    /// The ID of the category the transaction belongs to.
    pub category_id: CategoryId,
    /// The category the transaction belongs to.
    pub category: Category,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        amount: Amount,
        transaction_type: TransactionType,
        category_id: CategoryId,
    ) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            transaction_type,
            description: String::new(),
            currency: Currency::default(),
            category_id,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// The description defaults to an empty string and the currency to USD.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    pub amount: Amount,
    pub transaction_type: TransactionType,
    pub description: String,
    pub currency: Currency,
    pub category_id: CategoryId,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        description.clone_into(&mut self.description);
        self
    }

    /// Set the currency for the transaction.
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }
}

/// The fields of a transaction to change. `None` leaves a field as it is.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionUpdate {
    pub amount: Option<Amount>,
    pub transaction_type: Option<TransactionType>,
    pub description: Option<String>,
    pub currency: Option<Currency>,
    pub category_id: Option<CategoryId>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const SELECT_TRANSACTION: &str = "SELECT t.id, t.amount, t.type, t.description, t.currency, \
        t.created_at, t.user_id, t.category_id, c.id, c.name, c.description \
     FROM \"transaction\" t \
     INNER JOIN category c ON c.id = t.category_id";

/// Create a new transaction owned by `user_id` from a builder.
///
/// The transaction is stamped with `now`, or the newest existing timestamp if
/// the clock went backwards, so timestamps never decrease from one insert to
/// the next.
///
/// # Errors
/// This function will return a:
/// - [Error::CategoryNotFound] if the category ID does not refer to a category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    user_id: UserID,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    let latest: Option<i64> =
        sql_transaction.query_row("SELECT MAX(created_at) FROM \"transaction\"", [], |row| {
            row.get(0)
        })?;
    let created_at = latest.map_or(to_micros(now), |latest| latest.max(to_micros(now)));

    let id: TransactionId = sql_transaction
        .prepare(
            "INSERT INTO \"transaction\" (amount, type, description, currency, created_at, user_id, category_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id",
        )?
        .query_row(
            (
                builder.amount.cents(),
                builder.transaction_type,
                &builder.description,
                builder.currency.as_ref(),
                created_at,
                user_id.as_i64(),
                builder.category_id,
            ),
            |row| row.get(0),
        )
        .map_err(|error| map_category_constraint(error, builder.category_id))?;

    let transaction = get_transaction(user_id, id, &sql_transaction)?;
    sql_transaction.commit()?;

    Ok(transaction)
}

/// Retrieve the transaction with `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "{SELECT_TRANSACTION} WHERE t.id = :id AND t.user_id = :user_id"
        ))?
        .query_one(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a page of the transactions owned by `user_id`, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn list_transactions(
    user_id: UserID,
    page: Page,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let limit = i64::try_from(page.limit).unwrap_or(i64::MAX);
    let offset = i64::try_from(page.offset).unwrap_or(i64::MAX);

    connection
        .prepare(&format!(
            "{SELECT_TRANSACTION} WHERE t.user_id = :user_id \
             ORDER BY t.created_at DESC, t.id DESC \
             LIMIT :limit OFFSET :offset"
        ))?
        .query_map(
            &[
                (":user_id", &user_id.as_i64()),
                (":limit", &limit),
                (":offset", &offset),
            ],
            map_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Apply `update` to the transaction with `id` owned by `user_id`.
///
/// Returns the transaction as it is after the update.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - [Error::CategoryNotFound] if the new category ID does not refer to a category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    user_id: UserID,
    id: TransactionId,
    update: TransactionUpdate,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let sql_transaction = connection.unchecked_transaction()?;
    let current = get_transaction(user_id, id, &sql_transaction)?;

    let amount = update.amount.unwrap_or(current.amount);
    let transaction_type = update.transaction_type.unwrap_or(current.transaction_type);
    let description = update.description.unwrap_or(current.description);
    let currency = update.currency.unwrap_or(current.currency);
    let category_id = update.category_id.unwrap_or(current.category_id);

    sql_transaction
        .execute(
            "UPDATE \"transaction\"
             SET amount = ?1, type = ?2, description = ?3, currency = ?4, category_id = ?5
             WHERE id = ?6 AND user_id = ?7",
            (
                amount.cents(),
                transaction_type,
                &description,
                currency.as_ref(),
                category_id,
                id,
                user_id.as_i64(),
            ),
        )
        .map_err(|error| map_category_constraint(error, category_id))?;

    let transaction = get_transaction(user_id, id, &sql_transaction)?;
    sql_transaction.commit()?;

    Ok(transaction)
}

/// Delete the transaction with `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
        &[(":id", &id), (":user_id", &user_id.as_i64())],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Get the number of transactions owned by `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_transactions(user_id: UserID, connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE user_id = ?1",
            [user_id.as_i64()],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount INTEGER NOT NULL CHECK (amount >= 0),
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                description TEXT NOT NULL,
                currency TEXT NOT NULL DEFAULT 'USD',
                created_at INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                category_id INTEGER NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id),
                FOREIGN KEY(category_id) REFERENCES category(id)
                )",
        (),
    )?;

    // Used by the paginated transaction list.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_created
         ON \"transaction\"(user_id, created_at);",
        (),
    )?;

    Ok(())
}

/// Map a row selected with the transaction columns followed by the category
/// columns to a [Transaction].
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let amount = Amount::from_cents(row.get(1)?);
    let transaction_type = row.get(2)?;
    let description = row.get(3)?;
    let raw_currency: String = row.get(4)?;
    let created_at: i64 = row.get(5)?;
    let user_id = UserID::new(row.get(6)?);
    let category_id = row.get(7)?;

    let date = OffsetDateTime::from_unix_timestamp_nanos(i128::from(created_at) * 1_000)
        .map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(5, Type::Integer, Box::new(error))
        })?;

    let category = map_category_columns(row)?;

    Ok(Transaction {
        id,
        amount,
        transaction_type,
        description,
        currency: Currency::new_unchecked(&raw_currency),
        date,
        user_id,
        category_id,
        category,
    })
}

/// Read the category columns that follow the eight transaction columns.
fn map_category_columns(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(8)?;
    let raw_name: String = row.get(9)?;
    let description = row.get(10)?;

    Ok(Category {
        id,
        name: CategoryName::new_unchecked(&raw_name),
        description,
    })
}

fn to_micros(date_time: OffsetDateTime) -> i64 {
    (date_time.unix_timestamp_nanos() / 1_000) as i64
}

fn map_category_constraint(error: rusqlite::Error, category_id: CategoryId) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            },
            _,
        ) => Error::CategoryNotFound(category_id),
        error => error.into(),
    }
}
