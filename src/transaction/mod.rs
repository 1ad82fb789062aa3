//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model, its validated [Amount] and [Currency], and
//!   `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying, and managing a user's transactions
//! - The JSON route handlers for the transaction API

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod get_endpoint;
mod list_endpoint;
mod money;
mod summary;

pub use core::{
    Transaction, TransactionType, TransactionUpdate, create_transaction, create_transaction_table,
    delete_transaction, get_transaction, list_transactions, update_transaction,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use get_endpoint::get_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;
pub use money::{Amount, Currency};
pub use summary::{TransactionSummary, get_transaction_summary};

#[cfg(test)]
pub use core::count_transactions;
