//! Academy API Library
//!
//! Backend for academy management: student enrollment, tuition billing,
//! bookstore inventory and sales, and teacher payroll.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod services;

use axum::{routing::get, Json, Router};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;

// App state definition
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

/// Liveness probe plus a DB ping.
async fn health(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
) -> Json<serde_json::Value> {
    let db_ok = db::check_connection(&state.db).await.is_ok();
    Json(json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "database": db_ok,
    }))
}

/// The full v1 API surface, nested under `/api/v1` by the binary.
pub fn api_v1_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/students", handlers::students::routes())
        .nest("/classes", handlers::classes::class_routes())
        .nest("/tuition", handlers::classes::tuition_routes())
        .nest("/books", handlers::bookstore::book_routes())
        .nest("/sales", handlers::bookstore::sale_routes())
        .nest("/suppliers", handlers::bookstore::supplier_routes())
        .nest("/teachers", handlers::teachers::teacher_routes())
        .nest("/payroll", handlers::teachers::payroll_routes())
        .nest("/dashboard", handlers::dashboard::routes())
}

/// Root router: status, health and the versioned API.
pub fn app_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(|| async { "academy-api up" }))
        .route("/health", get(health))
        .nest("/api/v1", api_v1_routes())
}
