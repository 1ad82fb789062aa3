//! The endpoint for creating a new user account.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::{Email, NewUser, PasswordHash, RawPassword, User, create_user},
};

/// The state needed to register a user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The bcrypt cost used when hashing new passwords.
    pub password_cost: u32,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            password_cost: state.password_cost,
        }
    }
}

/// The JSON body of a registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Handler for registration requests via the POST method.
///
/// Responds with the new user, without their password hash.
///
/// # Errors
///
/// This function will return an error if the email address is invalid or
/// already registered, the password is empty, or the user could not be stored.
pub async fn register_user(
    State(state): State<RegistrationState>,
    Json(request): Json<RegisterUserRequest>,
) -> Result<Json<User>, Error> {
    let email = Email::new(&request.email)?;
    let raw_password = RawPassword::new(&request.password)?;
    let password_hash = PasswordHash::new(&raw_password, state.password_cost)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let user = create_user(
        NewUser {
            email,
            password_hash,
            full_name: request.full_name,
        },
        &connection,
    )?;

    tracing::info!("Registered user {}", user.id);

    Ok(Json(user))
}

#[cfg(test)]
mod register_user_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, routing::post};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::auth::{
        get_user_by_email,
        register_user::{RegistrationState, register_user},
        user::create_user_table,
    };

    fn get_test_server() -> (TestServer, Arc<Mutex<Connection>>) {
        let connection = Connection::open_in_memory().unwrap();
        create_user_table(&connection).unwrap();
        let db_connection = Arc::new(Mutex::new(connection));

        let app = Router::new()
            .route("/auth/register", post(register_user))
            .with_state(RegistrationState {
                db_connection: db_connection.clone(),
                password_cost: 4,
            });

        (
            TestServer::try_new(app).expect("Could not create test server."),
            db_connection,
        )
    }

    #[tokio::test]
    async fn register_user_succeeds() {
        let (server, db_connection) = get_test_server();

        let response = server
            .post("/auth/register")
            .json(&json!({
                "email": "alice@example.com",
                "password": "pw123",
                "full_name": "Alice",
            }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["email"], "alice@example.com");
        assert_eq!(body["full_name"], "Alice");
        assert_eq!(body["is_active"], true);
        assert!(body["id"].as_i64().is_some());
        assert!(body.get("password").is_none());
        assert!(body.get("password_hash").is_none());

        let stored = get_user_by_email("alice@example.com", &db_connection.lock().unwrap())
            .unwrap();
        assert_ne!(stored.password_hash.as_ref(), "pw123");
        assert!(stored.password_hash.verify("pw123").unwrap());
    }

    #[tokio::test]
    async fn register_user_fails_on_duplicate_email() {
        let (server, _) = get_test_server();
        let body = json!({
            "email": "alice@example.com",
            "password": "pw123",
            "full_name": "Alice",
        });
        server.post("/auth/register").json(&body).await.assert_status_ok();

        let response = server.post("/auth/register").json(&body).await;

        response.assert_status_bad_request();
        response.assert_json(&json!({
            "detail": "The user with this email already exists in the system."
        }));
    }

    #[tokio::test]
    async fn register_user_fails_with_empty_password() {
        let (server, _) = get_test_server();

        server
            .post("/auth/register")
            .json(&json!({
                "email": "alice@example.com",
                "password": "",
                "full_name": "Alice",
            }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn register_user_fails_with_invalid_email() {
        let (server, _) = get_test_server();

        server
            .post("/auth/register")
            .json(&json!({
                "email": "not-an-email",
                "password": "pw123",
                "full_name": "Alice",
            }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn register_user_fails_with_password_longer_than_bcrypt_limit() {
        let (server, _) = get_test_server();

        let response = server
            .post("/auth/register")
            .json(&json!({
                "email": "alice@example.com",
                "password": "a".repeat(72),
                "full_name": "Alice",
            }))
            .await;

        response.assert_status_bad_request();
        response.assert_json(&json!({ "detail": "Password cannot be longer than 71 bytes" }));
    }
}
