//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use time::Duration;

use crate::{
    AppConfig, Error,
    auth::{PasswordHash, TokenService},
    clock::Clock,
    db::initialize,
    pagination::PaginationConfig,
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// Issues and validates bearer tokens.
    pub token_service: TokenService,

    /// How long issued bearer tokens are valid.
    pub token_ttl: Duration,

    /// The bcrypt cost for hashing new passwords.
    pub password_cost: u32,

    /// A hash with the same cost as real ones, checked when a log-in names an
    /// unknown email so that the response takes as long as for a known one.
    pub dummy_password_hash: PasswordHash,

    /// The source of the current time, shared with `token_service`.
    pub clock: Arc<dyn Clock>,

    /// The config that controls the size of pages of transactions.
    pub pagination_config: PaginationConfig,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        config: &AppConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let dummy_password_hash =
            PasswordHash::from_raw_password("not-a-real-password", config.password_cost)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            token_service: TokenService::new(&config.secret, clock.clone()),
            token_ttl: config.token_ttl,
            password_cost: config.password_cost,
            dummy_password_hash,
            clock,
            pagination_config: config.pagination,
        })
    }
}
