use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    common::error::AppError, config::AppState, models::auth::SessionUser,
    services::sessions::SESSION_COOKIE,
};

// Session middleware: resolves the session cookie to its user and attaches
// the user to the request. No live session means 401, before any handler
// runs.
pub async fn auth_guard(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let user = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| state.sessions.get(cookie.value()))
        .ok_or(AppError::NotAuthenticated)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

// Extractor for handlers that need the logged-in user.
pub struct AuthenticatedUser(pub SessionUser);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionUser>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::NotAuthenticated)
    }
}
