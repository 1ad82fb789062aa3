//! Authentication middleware that resolves the bearer token of a request to a user.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{TokenService, User, get_user_by_email},
};

/// A named permission that a route can require.
pub type Scope = &'static str;

/// The scopes required by every protected route.
const REQUIRED_SCOPES: &[Scope] = &[];

/// The state needed for the auth middleware
#[derive(Debug, Clone)]
pub struct AuthState {
    /// Validates the bearer tokens.
    pub token_service: TokenService,
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            token_service: state.token_service.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Resolve a bearer token to the user it was issued to.
///
/// # Errors
///
/// This function will return a:
/// - [Error::TokenExpired], [Error::MalformedToken] or [Error::InvalidTokenSignature]
///   if the token is not valid,
/// - [Error::Unauthenticated] if the user no longer exists or is inactive,
/// - or [Error::SqlError] if the user could not be read from the database.
pub fn resolve(
    token: &str,
    token_service: &TokenService,
    connection: &Connection,
) -> Result<User, Error> {
    let email = token_service.validate(token)?;

    let user = get_user_by_email(&email, connection).map_err(|error| match error {
        Error::NotFound => Error::Unauthenticated,
        error => error,
    })?;

    if !user.is_active {
        return Err(Error::Unauthenticated);
    }

    Ok(user)
}

/// Check that `user` holds every scope in `required_scopes`.
///
/// There are no scopes yet, so any authenticated user may do anything and this
/// always succeeds. It is the place to return [Error::Forbidden] once routes
/// start requiring scopes.
pub fn authorize(_user: &User, _required_scopes: &[Scope]) -> Result<(), Error> {
    Ok(())
}

/// Middleware function that checks for a valid bearer token.
///
/// The resolved [User] is placed into the request extensions and the request
/// executed normally, otherwise a 401 response is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(user): Extension<User>` to receive the user.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    let token =
        match TypedHeader::<Authorization<Bearer>>::from_request_parts(&mut parts, &state).await {
            Ok(TypedHeader(Authorization(bearer))) => bearer,
            Err(error) => {
                tracing::debug!("Missing or invalid authorization header: {error}");
                return Error::Unauthenticated.into_response();
            }
        };

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        match resolve(token.token(), &state.token_service, &connection) {
            Ok(user) => user,
            Err(error) => {
                tracing::debug!("Rejected bearer token: {error}");
                return error.into_response();
            }
        }
    };

    if let Err(error) = authorize(&user, REQUIRED_SCOPES) {
        return error.into_response();
    }

    parts.extensions.insert(user);
    let request = Request::from_parts(parts, body);

    next.run(request).await
}
