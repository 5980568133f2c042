use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    Extension, Json,
};
use sqlx::{query, query_as};

use crate::{
    account,
    error::ApiError,
    model::{CurrentUser, Todo},
    schema::{Payload, RegisterSchema, TodoId, TodoSchema},
    AppState,
};

const INDEX_HTML: &str = include_str!("../templates/index.html");

// Handler for the home page
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

// Handler for the health checker route
pub async fn health_checker_handler() -> impl IntoResponse {
    const MESSAGE: &str = "Todo API with Rust, SQLX, SQLite, and Axum";

    let json_response = serde_json::json!({
        "status": "success",
        "message": MESSAGE
    });

    Json(json_response)
}

// Handler for getting all Todo items
pub async fn get_todos(State(data): State<Arc<AppState>>) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = query_as::<_, Todo>("SELECT id, name, created_at FROM todos ORDER BY id")
        .fetch_all(&data.db)
        .await?;

    Ok(Json(todos))
}

// Handler for creating a new Todo
pub async fn create_todo(
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Payload(body): Payload<TodoSchema>,
) -> Result<impl IntoResponse, ApiError> {
    let name = body.into_name()?;

    let todo = query_as::<_, Todo>(
        "INSERT INTO todos (name, created_at) VALUES (?, ?) RETURNING id, name, created_at",
    )
    .bind(name)
    .bind(chrono::Utc::now())
    .fetch_one(&data.db)
    .await?;

    tracing::info!(todo_id = todo.id, user = %user.username, "todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

// Handler for getting a specific Todo by ID
pub async fn get_todo(
    TodoId(id): TodoId,
    State(data): State<Arc<AppState>>,
) -> Result<Json<Todo>, ApiError> {
    let todo = query_as::<_, Todo>("SELECT id, name, created_at FROM todos WHERE id = ?")
        .bind(id)
        .fetch_optional(&data.db)
        .await?
        .ok_or_else(|| ApiError::NotFound(id.to_string()))?;

    Ok(Json(todo))
}

// Handler for renaming a Todo by ID
pub async fn update_todo(
    TodoId(id): TodoId,
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Payload(body): Payload<TodoSchema>,
) -> Result<Json<Todo>, ApiError> {
    let name = body.into_name()?;

    let todo = query_as::<_, Todo>(
        "UPDATE todos SET name = ? WHERE id = ? RETURNING id, name, created_at",
    )
    .bind(name)
    .bind(id)
    .fetch_optional(&data.db)
    .await?
    .ok_or_else(|| ApiError::NotFound(id.to_string()))?;

    tracing::info!(todo_id = todo.id, user = %user.username, "todo updated");
    Ok(Json(todo))
}

// Handler for deleting a Todo by ID
pub async fn delete_todo(
    TodoId(id): TodoId,
    State(data): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<StatusCode, ApiError> {
    let rows_affected = query("DELETE FROM todos WHERE id = ?")
        .bind(id)
        .execute(&data.db)
        .await?
        .rows_affected();
    if rows_affected == 0 {
        return Err(ApiError::NotFound(id.to_string()));
    }

    tracing::info!(todo_id = id, user = %user.username, "todo deleted");
    Ok(StatusCode::NO_CONTENT)
}

// Handler for registering a new user
pub async fn register(
    State(data): State<Arc<AppState>>,
    Payload(body): Payload<RegisterSchema>,
) -> Result<impl IntoResponse, ApiError> {
    let registration = body.validate()?;

    let user = account::create_user(
        &data.db,
        &registration.username,
        &registration.email,
        &registration.password,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(user)))
}
