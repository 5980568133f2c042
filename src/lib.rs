//! Todo list REST API with HTTP Basic authentication on mutating routes.

use sqlx::SqlitePool;

pub mod account;
pub mod config;
pub mod db;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod model;
pub mod route;
pub mod schema;

pub use route::create_router;

// Struct representing the application state
pub struct AppState {
    pub db: SqlitePool,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}
