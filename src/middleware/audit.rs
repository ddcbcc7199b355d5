use axum::{
    extract::Request,
    http::Method,
    middleware::Next,
    response::Response,
};

use crate::models::auth::SessionUser;

// Request-level trail of admin mutations: who, what, and how it ended.
// The durable audit entries are written by the handlers; this line exists
// so even a failed mutation leaves a trace. Runs inside the auth guard.
pub async fn admin_audit_log(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let user = request.extensions().get::<SessionUser>().cloned();

    let response = next.run(request).await;

    if method != Method::GET {
        if let Some(user) = user {
            tracing::info!(
                user = %user.username,
                role = ?user.role,
                %method,
                %path,
                status = %response.status(),
                "admin action"
            );
        }
    }

    response
}
