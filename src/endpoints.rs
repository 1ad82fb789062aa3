//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., `/api/v1/transactions/{transaction_id}`, the tests use `format_endpoint`.

/// The welcome message.
pub const ROOT: &str = "/";
/// The route for exchanging an email and password for a bearer token.
pub const LOG_IN: &str = "/auth/token";
/// The route for creating a user.
pub const REGISTER: &str = "/auth/register";
/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/v1/categories/";
/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/v1/transactions/";
/// The route for the totals of the user's transactions.
pub const TRANSACTION_SUMMARY: &str = "/api/v1/transactions/summary";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/v1/transactions/{transaction_id}";
/// Where the API documentation lives, advertised by [ROOT].
pub const DOCS: &str = "/docs";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is the text between a left brace and the next right brace,
/// for example '{transaction_id}' in '/api/v1/transactions/{transaction_id}'.
/// Only the first parameter is replaced.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
#[cfg(test)]
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some((prefix, rest)) = endpoint_path.split_once('{') else {
        return endpoint_path.to_owned();
    };

    let suffix = rest.split_once('}').map_or("", |(_, suffix)| suffix);

    format!("{prefix}{id}{suffix}")
}
