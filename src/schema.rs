use axum::{
    async_trait,
    body::HttpBody,
    extract::{FromRequest, FromRequestParts, Path},
    http::{header::CONTENT_TYPE, request::Parts, Request},
    BoxError, Form, Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

// Request body for creating or updating a Todo
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct TodoSchema {
    pub name: Option<String>,
}

impl TodoSchema {
    /// The trimmed-nonempty `name`, or the validation error the API reports for it.
    pub fn into_name(self) -> Result<String, ApiError> {
        match self.name {
            Some(name) if !name.trim().is_empty() => Ok(name),
            _ => Err(ApiError::Validation("No todo name provided".to_string())),
        }
    }
}

// Request body for registering a user
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct RegisterSchema {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub verify_password: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterSchema {
    /// Checks that every field is present and that both password fields agree.
    pub fn validate(self) -> Result<Registration, ApiError> {
        let username = required(self.username, "username")?;
        let email = required(self.email, "email")?;
        let password = required(self.password, "password")?;
        let verify_password = required(self.verify_password, "verify_password")?;

        if password != verify_password {
            return Err(ApiError::Validation(
                "Password and password verification do not match".to_string(),
            ));
        }

        Ok(Registration {
            username,
            email,
            password,
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::Validation(format!("No {} provided", field))),
    }
}

/// Body extractor accepting either a form-encoded or a JSON payload, picked by `Content-Type`.
#[derive(Debug)]
pub struct Payload<T>(pub T);

#[async_trait]
impl<T, S, B> FromRequest<S, B> for Payload<T>
where
    T: DeserializeOwned,
    B: HttpBody + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false);

        if is_form {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::Validation(e.to_string()))?;
            Ok(Payload(value))
        } else {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::Validation(e.to_string()))?;
            Ok(Payload(value))
        }
    }
}

/// Todo id taken from the `:id` path segment. Anything that isn't an `i64` is an unknown todo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodoId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for TodoId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::Validation(e.to_string()))?;

        raw.parse().map(TodoId).map_err(|_| ApiError::NotFound(raw))
    }
}
