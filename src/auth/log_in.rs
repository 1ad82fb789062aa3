//! The OAuth2 password flow: trade an email and password for a bearer token.

use std::sync::{Arc, Mutex};

use axum::{
    Form, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{PasswordHash, TokenResponse, TokenService, get_user_by_email},
};

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LogInState {
    /// Signs the issued tokens.
    pub token_service: TokenService,
    /// How long issued tokens are valid for.
    pub token_ttl: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
    /// Checked in place of a real hash when the email is unknown.
    pub dummy_password_hash: PasswordHash,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            token_service: state.token_service.clone(),
            token_ttl: state.token_ttl,
            db_connection: state.db_connection.clone(),
            dummy_password_hash: state.dummy_password_hash.clone(),
        }
    }
}

/// The form data for an OAuth2 password grant.
///
/// `username` holds the user's email address.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInForm {
    pub username: String,
    pub password: String,
    pub grant_type: Option<String>,
}

/// Handler for log-in requests via the POST method.
///
/// On success the response holds a bearer token for the user.
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - `grant_type` is present but not "password".
/// - The email does not belong to a registered, active user.
/// - The password is not correct.
/// - An internal error occurred when verifying the password or signing the token.
pub async fn post_log_in(
    State(state): State<LogInState>,
    Form(form): Form<LogInForm>,
) -> Result<Json<TokenResponse>, Error> {
    match form.grant_type.as_deref() {
        None | Some("password") => {}
        Some(grant_type) => return Err(Error::UnsupportedGrantType(grant_type.to_owned())),
    }

    let maybe_user = {
        let connection = state.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        match get_user_by_email(&form.username, &connection) {
            Ok(user) => Some(user),
            Err(Error::NotFound) => None,
            Err(error) => {
                tracing::error!("Unhandled error while verifying credentials: {error}");
                return Err(error);
            }
        }
    };

    let Some(user) = maybe_user else {
        // Same bcrypt work as for a registered email.
        state.dummy_password_hash.verify(&form.password)?;
        return Err(Error::InvalidCredentials);
    };

    let password_matches = user.password_hash.verify(&form.password)?;

    if !user.is_active || !password_matches {
        return Err(Error::InvalidCredentials);
    }

    let access_token = state.token_service.issue(user.email.as_ref(), state.token_ttl)?;
    tracing::debug!("Issued token for user {}", user.id);

    Ok(Json(TokenResponse::bearer(access_token)))
}
