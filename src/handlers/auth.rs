use axum::{Json, extract::State};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::{Value, json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        audit::InsertAuditLog,
        auth::{LoginPayload, LoginResponse, SessionUser},
    },
    services::sessions::{SESSION_COOKIE, SESSION_TTL_HOURS},
};

fn session_cookie(state: &AppState, value: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.is_production())
        .max_age(time::Duration::hours(SESSION_TTL_HOURS))
        .build()
}

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Session created", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 429, description = "Too many attempts")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    payload.validate().map_err(AppError::Validation)?;

    let user = app_state
        .auth_service
        .login(&payload.username, &payload.password)
        .await?;

    let session_user = SessionUser::from(&user);
    let cookie_value = app_state.sessions.create(session_user.clone());

    // Logins leave an audit entry like every other admin action.
    app_state
        .storage
        .create_audit_log(InsertAuditLog {
            user_id: user.id,
            action: format!("User {} logged in", user.username),
            details: None,
        })
        .await?;

    let jar = jar.add(session_cookie(&app_state, cookie_value));
    Ok((
        jar,
        Json(LoginResponse {
            message: "Login successful".to_string(),
            user: session_user,
        }),
    ))
}

// POST /api/auth/logout
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Session destroyed"))
)]
pub async fn logout(
    State(app_state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Value>), AppError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        app_state.sessions.destroy(cookie.value());
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/").build());
    Ok((jar, Json(json!({ "message": "Logout successful" }))))
}

// GET /api/auth/user
#[utoipa::path(
    get,
    path = "/api/auth/user",
    tag = "Auth",
    responses(
        (status = 200, description = "The logged-in user", body = SessionUser),
        (status = 401, description = "No session")
    ),
    security(("session_cookie" = []))
)]
pub async fn current_user(AuthenticatedUser(user): AuthenticatedUser) -> Json<SessionUser> {
    Json(user)
}
