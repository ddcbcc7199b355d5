use axum::{
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};

use crate::{common::error::AppError, config::AppState};

// Security headers for every response, plus HTTPS enforcement behind the
// production proxy. Admin responses are additionally marked uncacheable.
pub async fn security_headers(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if state.config.is_production() {
        let proto = request
            .headers()
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok());
        if proto != Some("https") {
            return Err(AppError::HttpsRequired);
        }
    }

    let path = request.uri().path();
    let is_admin = path.starts_with("/api/admin");
    // Swagger UI frames itself; everything else refuses framing outright.
    let is_docs = path.starts_with("/docs");

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::X_FRAME_OPTIONS,
        HeaderValue::from_static(if is_docs { "SAMEORIGIN" } else { "DENY" }),
    );

    if state.config.is_production() {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }

    if is_admin {
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate, private"),
        );
        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    }

    Ok(response)
}
