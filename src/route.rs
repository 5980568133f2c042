use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};

use crate::{handler::*, middleware::mw_require_auth, AppState};

/// Builds the full route table. Only the mutating todo routes sit behind Basic auth.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/api/v1/todos", post(create_todo))
        .route("/api/v1/todos/:id", put(update_todo).delete(delete_todo))
        .route_layer(from_fn_with_state(app_state.clone(), mw_require_auth));

    Router::new()
        .route("/", get(index_handler))
        .route("/api/v1/healthchecker", get(health_checker_handler))
        .route("/api/v1/todos", get(get_todos))
        .route("/api/v1/todos/:id", get(get_todo))
        .route("/api/v1/users", post(register))
        .merge(protected)
        .with_state(app_state)
}
