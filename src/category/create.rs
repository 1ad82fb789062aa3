//! Category creation endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{Category, CategoryData, CategoryName, create_category},
};

/// The state needed for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle a request to add a category to the shared catalog.
///
/// # Errors
///
/// Returns [Error::EmptyCategoryName] for a blank name and
/// [Error::DuplicateCategoryName] if the name is taken.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryState>,
    Json(new_category): Json<CategoryData>,
) -> Result<Json<Category>, Error> {
    let name = CategoryName::new(&new_category.name)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let category = create_category(name, new_category.description, &connection)?;
    tracing::info!("Created category {} ({})", category.name, category.id);

    Ok(Json(category))
}

#[cfg(test)]
mod create_category_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, routing::post};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;

    use crate::category::{
        create::{CreateCategoryState, create_category_endpoint},
        db::create_category_table,
        get_all_categories,
    };

    fn get_test_server() -> (TestServer, Arc<Mutex<Connection>>) {
        let connection = Connection::open_in_memory().unwrap();
        create_category_table(&connection).unwrap();
        let db_connection = Arc::new(Mutex::new(connection));

        let app = Router::new()
            .route("/categories", post(create_category_endpoint))
            .with_state(CreateCategoryState {
                db_connection: db_connection.clone(),
            });

        (
            TestServer::try_new(app).expect("Could not create test server."),
            db_connection,
        )
    }

    #[tokio::test]
    async fn create_category_returns_new_category() {
        let (server, _) = get_test_server();

        let response = server
            .post("/categories")
            .json(&json!({ "name": " Groceries ", "description": "Food" }))
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["name"], "Groceries");
        assert_eq!(body["description"], "Food");
        assert!(body["id"].as_i64().is_some());
    }

    #[tokio::test]
    async fn description_is_optional() {
        let (server, _) = get_test_server();

        let response = server
            .post("/categories")
            .json(&json!({ "name": "Salary" }))
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["description"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn duplicate_category_is_rejected() {
        let (server, db_connection) = get_test_server();
        server
            .post("/categories")
            .json(&json!({ "name": "Groceries" }))
            .await
            .assert_status_ok();

        let response = server
            .post("/categories")
            .json(&json!({ "name": "Groceries", "description": "again" }))
            .await;

        response.assert_status_bad_request();
        response.assert_json(&json!({ "detail": "The category \"Groceries\" already exists" }));
        let categories = get_all_categories(&db_connection.lock().unwrap()).unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].description, None);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let (server, _) = get_test_server();

        server
            .post("/categories")
            .json(&json!({ "name": "   " }))
            .await
            .assert_status_bad_request();
    }
}
