#![allow(missing_docs)]

use std::sync::Arc;

use rusqlite::Connection;
use time::macros::datetime;

use crate::{
    AppConfig, AppState, Email, PasswordHash,
    auth::{NewUser, User, create_user},
    category::{Category, CategoryName, create_category},
    clock::FixedClock,
    db::initialize,
};

/// The password of every user created by [insert_user].
pub(crate) const TEST_PASSWORD: &str = "pw123";

/// The lowest bcrypt cost, keeps the tests fast.
pub(crate) const TEST_PASSWORD_COST: u32 = 4;

pub(crate) fn get_test_clock() -> FixedClock {
    FixedClock::new(datetime!(2025-10-19 12:00:00 UTC))
}

pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    initialize(&connection).expect("Could not initialize database.");
    connection
}

pub(crate) fn get_test_app_state(clock: FixedClock) -> AppState {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    let config = AppConfig {
        password_cost: TEST_PASSWORD_COST,
        ..AppConfig::new("foobar")
    };

    AppState::new(connection, &config, Arc::new(clock)).expect("Could not create app state.")
}

#[track_caller]
pub(crate) fn insert_user(email: &str, connection: &Connection) -> User {
    create_user(
        NewUser {
            email: Email::new_unchecked(email),
            password_hash: PasswordHash::from_raw_password(TEST_PASSWORD, TEST_PASSWORD_COST)
                .expect("Could not hash password."),
            full_name: "Test User".to_owned(),
        },
        connection,
    )
    .expect("Could not create test user.")
}

#[track_caller]
pub(crate) fn insert_category(name: &str, connection: &Connection) -> Category {
    create_category(CategoryName::new_unchecked(name), None, connection)
        .expect("Could not create test category.")
}
