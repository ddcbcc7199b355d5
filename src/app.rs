use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, patch, post, put},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::{audit, auth::auth_guard, rate_limit, security},
};

/// Assembles the full application router. `main` serves it; the
/// integration tests drive it directly with `tower::ServiceExt`.
pub fn build_router(app_state: AppState) -> Router {
    // Public catalog/booking/review routes, sharing the general quota
    let public_routes = Router::new()
        .route("/activities", get(handlers::activities::list))
        .route("/activities/{id}", get(handlers::activities::get_one))
        .route("/activities/{id}/rating", get(handlers::activities::rating))
        .route("/bookings", post(handlers::bookings::create))
        .route(
            "/reviews",
            get(handlers::reviews::list).post(handlers::reviews::create),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            rate_limit::general_rate_limit,
        ));

    // /user only answers with a live session
    let session_routes = Router::new()
        .route("/user", get(handlers::auth::current_user))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Login gets the strict per-IP quota; logout is open
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            rate_limit::auth_rate_limit,
        ))
        .route("/logout", post(handlers::auth::logout))
        .merge(session_routes);

    let admin_routes = Router::new()
        .route("/bookings", get(handlers::admin::list_bookings))
        .route(
            "/bookings/{id}/status",
            patch(handlers::admin::update_booking_status),
        )
        .route(
            "/bookings/{id}/payment",
            patch(handlers::admin::update_booking_payment),
        )
        .route("/activities", post(handlers::admin::create_activity))
        .route(
            "/activities/{id}",
            put(handlers::admin::update_activity).delete(handlers::admin::delete_activity),
        )
        .route(
            "/activities/{id}/getyourguide-price",
            patch(handlers::admin::update_getyourguide_price),
        )
        .route(
            "/getyourguide/comparison",
            get(handlers::admin::price_comparison),
        )
        .route("/reviews", get(handlers::admin::list_reviews))
        .route(
            "/reviews/{id}/approval",
            patch(handlers::admin::update_review_approval),
        )
        .route("/audit-logs", get(handlers::admin::audit_logs))
        .route(
            "/whatsapp-contacts",
            get(handlers::admin::whatsapp_contacts),
        )
        .route("/analytics/earnings", get(handlers::analytics::earnings))
        .route("/analytics/bookings", get(handlers::analytics::bookings))
        .route(
            "/analytics/activities",
            get(handlers::analytics::activities),
        )
        .route("/system-health", get(handlers::analytics::system_health))
        // Execution order: admin quota, then session auth, then the trail
        .layer(axum_middleware::from_fn(audit::admin_audit_log))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            rate_limit::admin_rate_limit,
        ));

    let cors = cors_layer(&app_state);

    Router::new()
        .route("/api/health", get(handlers::health::health))
        .nest("/api/auth", auth_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api", public_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            security::security_headers,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

// Session cookies cross the CORS boundary, so origins are an explicit
// allow-list and credentials are on.
fn cors_layer(app_state: &AppState) -> CorsLayer {
    let origins: Vec<HeaderValue> = app_state
        .config
        .client_urls
        .iter()
        .filter_map(|url| url.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::ACCEPT_LANGUAGE,
        ])
}
