//! Finance Tracker is a JSON API for tracking personal income and expenses.
//!
//! Users register, log in to receive a bearer token, and record transactions
//! against a shared catalog of categories. Every transaction belongs to exactly
//! one user and is only visible to that user.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
mod category;
mod clock;
mod config;
mod database_id;
mod db;
mod endpoints;
mod logging;
mod pagination;
mod routing;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{
    Email, PasswordHash, RawPassword, Scope, TokenService, User, UserID, authorize,
    get_user_by_email, get_user_by_id, resolve,
};
pub use category::{
    Category, CategoryData, CategoryId, CategoryName, ensure_seeded, get_all_categories,
};
pub use clock::{Clock, SystemClock};
pub use config::{AppConfig, default_categories, load_default_categories};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use transaction::{Amount, Currency, Transaction, TransactionSummary, TransactionType};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The email and password pair did not match a registered user.
    #[error("Incorrect email or password")]
    InvalidCredentials,

    /// The request did not carry a bearer token, or the token's subject is no
    /// longer a registered, active user.
    #[error("Could not validate credentials")]
    Unauthenticated,

    /// The user is authenticated but lacks a scope required by the route.
    ///
    /// No route requires a scope at the moment, so this is never returned.
    #[error("Not enough permissions")]
    Forbidden,

    /// The bearer token's expiry time has passed.
    #[error("Token has expired")]
    TokenExpired,

    /// The bearer token could not be parsed as a signed token.
    #[error("Token is malformed")]
    MalformedToken,

    /// The bearer token's signature does not match its contents.
    #[error("Token signature is invalid")]
    InvalidTokenSignature,

    /// The token could not be signed.
    ///
    /// Callers should pass in the original error as a string.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// An unexpected error occurred with the underlying hashing library.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An empty string was used as a password.
    #[error("Password cannot be empty")]
    EmptyPassword,

    /// The password is too long to be hashed without losing bytes.
    #[error("Password cannot be longer than 71 bytes")]
    PasswordTooLong,

    /// The email address is not of the form `local@domain`.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// The email address is already used by another user.
    #[error("The user with this email already exists in the system.")]
    DuplicateEmail,

    /// The OAuth2 password flow was called with another grant type.
    #[error("Unsupported grant type \"{0}\"")]
    UnsupportedGrantType(String),

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// The specified category name already exists in the database.
    #[error("The category \"{0}\" already exists")]
    DuplicateCategoryName(String),

    /// The category ID used for a transaction did not match a category.
    #[error("Category {0} does not exist")]
    CategoryNotFound(CategoryId),

    /// The amount is negative, has too many decimal places or too many digits.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// The currency is not a three letter code.
    #[error("\"{0}\" is not a three letter currency code")]
    InvalidCurrency(String),

    /// The requested resource was not found.
    ///
    /// For transactions this is also returned when the transaction belongs to
    /// another user, so that clients cannot probe for other users' records.
    #[error("Transaction not found")]
    NotFound,

    /// The configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCredentials
            | Error::Unauthenticated
            | Error::TokenExpired
            | Error::MalformedToken
            | Error::InvalidTokenSignature => StatusCode::UNAUTHORIZED,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::EmptyPassword
            | Error::PasswordTooLong
            | Error::InvalidEmail(_)
            | Error::DuplicateEmail
            | Error::UnsupportedGrantType(_)
            | Error::EmptyCategoryName
            | Error::DuplicateCategoryName(_)
            | Error::CategoryNotFound(_)
            | Error::InvalidAmount(_)
            | Error::InvalidCurrency(_) => StatusCode::BAD_REQUEST,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::TokenCreation(_)
            | Error::HashingError(_)
            | Error::InvalidConfig(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("An unexpected error occurred: {}", self);
        }

        // Server error messages are sent to the client too.
        let body = Json(json!({ "detail": self.to_string() }));

        let mut response = (status, body).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}
