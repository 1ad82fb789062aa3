//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    routing::post,
};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;

use crate::{
    AppState,
    auth::{auth_guard, post_log_in, register_user},
    category::{create_category_endpoint, list_categories_endpoint},
    endpoints,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        get_transaction_endpoint, get_transaction_summary, list_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Routes under `/api` need a bearer token from [endpoints::LOG_IN].
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_root))
        .route(endpoints::DOCS, get(get_docs))
        .route(endpoints::LOG_IN, post(post_log_in))
        .route(endpoints::REGISTER, post(register_user));

    let protected_routes = Router::new()
        .route(
            endpoints::CATEGORIES,
            get(list_categories_endpoint).post(create_category_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION_SUMMARY,
            get(get_transaction_summary),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(edit_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// The root path '/' greets the client and points to the docs.
async fn get_root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the Finance Tracker API",
        "docs": endpoints::DOCS,
    }))
}

/// A short description of every route.
async fn get_docs() -> Json<Value> {
    Json(json!([
        { "method": "POST", "path": endpoints::REGISTER, "auth": false,
          "description": "Create a user from a JSON body with email, password and full_name." },
        { "method": "POST", "path": endpoints::LOG_IN, "auth": false,
          "description": "Exchange the form fields username and password for a bearer token." },
        { "method": "GET", "path": endpoints::CATEGORIES, "auth": true,
          "description": "List all categories by name." },
        { "method": "POST", "path": endpoints::CATEGORIES, "auth": true,
          "description": "Create a category from a JSON body with name and an optional description." },
        { "method": "GET", "path": endpoints::TRANSACTIONS, "auth": true,
          "description": "List your transactions, newest first. Takes the query parameters skip and limit." },
        { "method": "POST", "path": endpoints::TRANSACTIONS, "auth": true,
          "description": "Record a transaction from a JSON body with amount, type, description, category_id and an optional currency." },
        { "method": "GET", "path": endpoints::TRANSACTION_SUMMARY, "auth": true,
          "description": "Total income, expenses and balance of your transactions." },
        { "method": "GET", "path": endpoints::TRANSACTION, "auth": true,
          "description": "Get one of your transactions." },
        { "method": "PUT", "path": endpoints::TRANSACTION, "auth": true,
          "description": "Change some fields of one of your transactions." },
        { "method": "DELETE", "path": endpoints::TRANSACTION, "auth": true,
          "description": "Delete one of your transactions." },
    ]))
}

async fn get_404_not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not Found" }))).into_response()
}
