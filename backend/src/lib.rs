//! # Household Backend
//!
//! HTTP service for shared household bills and chores.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST API, handlers, session extraction)
//!     ↓
//! Domain Layer (split allocation, bill and balance services)
//!     ↓
//! Storage Layer (SQLite repositories)
//! ```
//!
//! `initialize_backend` wires storage into services and `create_router`
//! exposes them under `/api`.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::{AppConfig, BillSettings};
use crate::domain::{BalanceService, BillService};
use crate::io::rest::{balance_apis, bill_apis, split_apis, task_apis};
use crate::storage::{BillRepository, BillStorage, DbConnection};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub bill_service: BillService,
    pub balance_service: BalanceService,
}

impl AppState {
    /// Build services on top of an open database
    pub fn new(db: DbConnection, settings: BillSettings) -> Self {
        let storage: Arc<dyn BillStorage> = Arc::new(BillRepository::new(db));
        Self {
            bill_service: BillService::new(storage.clone(), settings),
            balance_service: BalanceService::new(storage),
        }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up database at {}", config.database_url);
    let db = DbConnection::new(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;

    info!("Setting up domain model");
    let settings = config.bill_settings()?;

    Ok(AppState::new(db, settings))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, cors_origin: &str) -> Result<Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin '{}'", cors_origin))?;

    // CORS setup to allow the web frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let api_routes = Router::new()
        .nest("/splits", split_apis::router())
        .nest("/bills", bill_apis::router())
        .nest("/balances", balance_apis::router())
        .nest("/tasks", task_apis::router());

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state))
}
