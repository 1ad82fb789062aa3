//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::{Email, PasswordHash},
};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
///
/// The password hash is never serialized, so a `User` can be sent to clients as is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The email the user logs in with. Unique across users.
    pub email: Email,
    /// The user's password hash.
    #[serde(skip_serializing)]
    pub password_hash: PasswordHash,
    /// The name to show for the user.
    pub full_name: String,
    /// Inactive users cannot log in or use their existing tokens.
    pub is_active: bool,
}

/// The data needed to create a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub password_hash: PasswordHash,
    pub full_name: String,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                full_name TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new, active user into the database.
///
/// # Errors
///
/// This function will return a:
/// - [Error::DuplicateEmail] if another user already has the email address,
/// - or [Error::SqlError] if some other SQL error occurred.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    connection
        .execute(
            "INSERT INTO user (email, password, full_name, is_active) VALUES (?1, ?2, ?3, 1)",
            (
                new_user.email.as_ref(),
                new_user.password_hash.as_ref(),
                &new_user.full_name,
            ),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateEmail,
            error => error.into(),
        })?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        email: new_user.email,
        password_hash: new_user.password_hash,
        full_name: new_user.full_name,
        is_active: true,
    })
}

/// Get the user from the database with an email equal to `email`.
///
/// # Errors
///
/// This function will return an error if:
/// - `email` does not belong to a registered user ([Error::NotFound]).
/// - there was an error trying to access the store.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, email, password, full_name, is_active FROM user WHERE email = :email",
        )?
        .query_row(&[(":email", &email)], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user ([Error::NotFound]).
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, email, password, full_name, is_active FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let id = UserID::new(row.get(0)?);
    let raw_email: String = row.get(1)?;
    let raw_password_hash: String = row.get(2)?;
    let full_name = row.get(3)?;
    let is_active = row.get(4)?;

    Ok(User {
        id,
        email: Email::new_unchecked(&raw_email),
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        full_name,
        is_active,
    })
}

#[cfg(test)]
mod user_tests {
    use rusqlite::Connection;

    use crate::{
        Email, Error, PasswordHash,
        auth::user::{NewUser, UserID, create_user, get_user_by_email, get_user_by_id},
    };

    use super::create_user_table;

    fn get_db_connection() -> Connection {
        let conn =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        create_user_table(&conn).expect("Could not create user table");

        conn
    }

    fn new_user(email: &str, password_hash: &str) -> NewUser {
        NewUser {
            email: Email::new_unchecked(email),
            password_hash: PasswordHash::new_unchecked(password_hash),
            full_name: "Test User".to_owned(),
        }
    }

    #[test]
    fn insert_user_succeeds() {
        let db_connection = get_db_connection();
        let password_hash = PasswordHash::new_unchecked("hunter2");

        let inserted_user =
            create_user(new_user("foo@bar.baz", "hunter2"), &db_connection).unwrap();

        assert!(inserted_user.id.as_i64() > 0);
        assert_eq!(inserted_user.password_hash, password_hash);
        assert_eq!(inserted_user.full_name, "Test User");
        assert!(inserted_user.is_active);
    }

    #[test]
    fn insert_user_fails_on_duplicate_email() {
        let db_connection = get_db_connection();
        let first = create_user(new_user("foo@bar.baz", "hunter2"), &db_connection).unwrap();

        let duplicate = create_user(new_user("foo@bar.baz", "hunter3"), &db_connection);

        assert_eq!(duplicate, Err(Error::DuplicateEmail));
        assert_eq!(
            get_user_by_email("foo@bar.baz", &db_connection),
            Ok(first),
            "the original user should be unchanged"
        );
    }

    #[test]
    fn emails_are_case_sensitive() {
        let db_connection = get_db_connection();
        create_user(new_user("foo@bar.baz", "hunter2"), &db_connection).unwrap();

        let result = create_user(new_user("Foo@bar.baz", "hunter2"), &db_connection);

        assert!(result.is_ok());
        assert_eq!(
            get_user_by_email("FOO@BAR.BAZ", &db_connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn get_user_fails_with_non_existent_id() {
        let db_connection = get_db_connection();

        let id = UserID::new(42);

        assert_eq!(get_user_by_id(id, &db_connection), Err(Error::NotFound));
    }

    #[test]
    fn get_user_succeeds_with_existing_id() {
        let db_connection = get_db_connection();
        let test_user = create_user(new_user("foo@bar.baz", "hunter2"), &db_connection).unwrap();

        let retrieved_user = get_user_by_id(test_user.id, &db_connection).unwrap();

        assert_eq!(retrieved_user, test_user);
    }

    #[test]
    fn get_user_by_email_succeeds() {
        let db_connection = get_db_connection();
        let test_user = create_user(new_user("foo@bar.baz", "hunter2"), &db_connection).unwrap();

        let retrieved_user = get_user_by_email("foo@bar.baz", &db_connection).unwrap();

        assert_eq!(retrieved_user, test_user);
    }

    #[test]
    fn serialized_user_has_no_password_hash() {
        let db_connection = get_db_connection();
        let test_user = create_user(new_user("foo@bar.baz", "hunter2"), &db_connection).unwrap();

        let json = serde_json::to_value(&test_user).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": test_user.id.as_i64(),
                "email": "foo@bar.baz",
                "full_name": "Test User",
                "is_active": true,
            })
        );
    }
}
