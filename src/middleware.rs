use std::sync::Arc;

use axum::{
    extract::State,
    http::{self, Request},
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose, Engine};

use crate::{account, error::ApiError, model::CurrentUser, AppState};

/// Rejects the request unless it carries valid HTTP Basic credentials.
///
/// On success the matching [`CurrentUser`] is placed in the request extensions.
pub async fn mw_require_auth<B>(
    State(data): State<Arc<AppState>>,
    mut request: Request<B>,
    next: Next<B>,
) -> Result<Response, ApiError> {
    let credentials = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(parse_basic_credentials);

    let Some((username, password)) = credentials else {
        tracing::debug!("missing or malformed Authorization header");
        return Err(ApiError::Unauthorized);
    };

    match account::verify_credentials(&data.db, &username, &password).await? {
        Some(user) => {
            request.extensions_mut().insert(CurrentUser::from(&user));
        }
        None => {
            tracing::warn!(username = %username, "rejected credentials");
            return Err(ApiError::Unauthorized);
        }
    }

    Ok(next.run(request).await)
}

/// Splits a `Basic <base64(username:password)>` header value into its two halves.
fn parse_basic_credentials(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = general_purpose::STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some((username.to_string(), password.to_string()))
}
