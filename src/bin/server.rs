use std::{
    env::{self},
    fs::OpenOptions,
    net::SocketAddr,
    path::PathBuf,
    process::ExitCode,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use time::Duration;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{
    EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt,
};

use finance_tracker::{
    AppConfig, AppState, PaginationConfig, SystemClock, build_router, ensure_seeded,
    graceful_shutdown, load_default_categories, logging_middleware,
};

/// The JSON API server for the finance tracker.
///
/// The secret for signing bearer tokens is read from the environment variable `SECRET`.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 8000)]
    port: u16,

    /// How many minutes an issued bearer token stays valid.
    #[arg(long, default_value_t = 30)]
    token_ttl_minutes: i64,

    /// A JSON file listing the categories to create on startup, e.g.
    /// `[{"name": "Groceries", "description": "Food"}]`.
    #[arg(long)]
    default_categories: Option<PathBuf>,

    /// How many transactions to list when a request does not give a limit.
    #[arg(long, default_value_t = 100)]
    page_limit_default: u64,

    /// The most transactions a single request may list.
    #[arg(long, default_value_t = 1000)]
    page_limit_max: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    let args = Args::parse();

    let Ok(secret) = env::var("SECRET") else {
        tracing::error!("The environment variable 'SECRET' must be set");
        return ExitCode::FAILURE;
    };

    let default_categories = match load_default_categories(args.default_categories.as_deref()) {
        Ok(categories) => categories,
        Err(error) => {
            tracing::error!("Could not load the default categories: {error}");
            return ExitCode::FAILURE;
        }
    };

    let config = AppConfig {
        token_ttl: Duration::minutes(args.token_ttl_minutes),
        pagination: PaginationConfig {
            default_limit: args.page_limit_default,
            max_limit: args.page_limit_max,
        },
        default_categories,
        ..AppConfig::new(&secret)
    };
    tracing::debug!("Starting with {config:?}");

    let connection = match Connection::open(&args.db_path) {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not open database file {}: {error}", args.db_path);
            return ExitCode::FAILURE;
        }
    };

    let state = match AppState::new(connection, &config, Arc::new(SystemClock)) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("Could not initialize the database: {error}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(error) = seed_categories(&state, &config) {
        tracing::error!("Could not create the default categories: {error}");
        return ExitCode::FAILURE;
    }

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state).layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    tracing::info!("HTTP server listening on {}", addr);

    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server error: {error}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn seed_categories(state: &AppState, config: &AppConfig) -> Result<(), finance_tracker::Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| finance_tracker::Error::DatabaseLockError)?;

    ensure_seeded(&config.default_categories, &connection)?;

    Ok(())
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    let debug_log = match OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
    {
        Ok(log_file) => Some(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(Arc::new(log_file))
                .with_filter(filter::LevelFilter::DEBUG),
        ),
        Err(error) => {
            eprintln!("Could not create log file, logging to stdout only: {error}");
            None
        }
    };

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged where they are turned into responses.
        .on_failure(());

    router.layer(tracing_layer)
}
