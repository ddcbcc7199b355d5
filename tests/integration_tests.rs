use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use marrakech_dunes::app::build_router;
use marrakech_dunes::config::{AppConfig, AppState};
use marrakech_dunes::db::{self, Storage, memory::MemStorage};

// ── Helpers ──

fn test_config(environment: &str) -> AppConfig {
    AppConfig {
        port: 3000,
        database_url: None,
        session_secret: "test-secret".to_string(),
        admin_password: "admin-pass".to_string(),
        superadmin_password: "super-pass".to_string(),
        client_urls: vec!["http://localhost:5173".to_string()],
        environment: environment.to_string(),
    }
}

async fn test_state_with_env(environment: &str) -> AppState {
    let config = test_config(environment);
    let storage: Arc<dyn Storage> = Arc::new(MemStorage::new());
    db::seed_initial_data(storage.as_ref(), &config)
        .await
        .expect("seeding should succeed");
    AppState::with_storage(config, storage)
}

async fn test_state() -> AppState {
    test_state_with_env("development").await
}

fn test_app(state: &AppState) -> Router {
    build_router(state.clone())
}

async fn body_json(res: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn json_request_with_cookie(method: &str, uri: &str, body: &Value, cookie: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, cookie)
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Logs in and returns the session cookie pair (`dunes.session=...`).
async fn login(state: &AppState, username: &str, password: &str) -> String {
    let res = test_app(state)
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            &json!({ "username": username, "password": password }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK, "login should succeed");

    let set_cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .expect("login must set the session cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

/// The seeded activity priced "450" MAD (Agafay combo).
async fn activity_id_priced_450(state: &AppState) -> String {
    let res = test_app(state).oneshot(get("/api/activities")).await.unwrap();
    let activities = body_json(res).await;
    activities
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["price"] == "450")
        .expect("seeded catalog should contain a 450 MAD activity")["id"]
        .as_str()
        .unwrap()
        .to_string()
}

fn booking_payload(activity_id: &str) -> Value {
    json!({
        "customerName": "Marie",
        "customerPhone": "+33612345678",
        "activityId": activity_id,
        "numberOfPeople": 2,
        "preferredDate": "2025-06-01",
        "participantNames": ["Marie", "Paul"]
    })
}

async fn create_booking(state: &AppState, activity_id: &str) -> Value {
    let res = test_app(state)
        .oneshot(json_request(
            "POST",
            "/api/bookings",
            &booking_payload(activity_id),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    body_json(res).await
}

// ── Health ──

#[tokio::test]
async fn health_reports_connected_storage() {
    let state = test_state().await;
    let res = test_app(&state).oneshot(get("/api/health")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "connected");
    assert_eq!(json["activities"], 5);
}

// ── Public catalog ──

#[tokio::test]
async fn catalog_lists_seeded_activities() {
    let state = test_state().await;
    let res = test_app(&state).oneshot(get("/api/activities")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let activities = body_json(res).await;
    let activities = activities.as_array().unwrap();
    assert_eq!(activities.len(), 5);
    assert!(activities.iter().all(|a| a["isActive"] == true));
    assert!(
        activities
            .iter()
            .any(|a| a["name"] == "Agafay Desert Combo Experience" && a["price"] == "450")
    );
}

#[tokio::test]
async fn unknown_activity_is_404() {
    let state = test_state().await;
    let res = test_app(&state)
        .oneshot(get(&format!(
            "/api/activities/{}",
            uuid::Uuid::new_v4()
        )))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(res).await["message"], "activity not found");
}

#[tokio::test]
async fn rating_is_zero_without_reviews() {
    let state = test_state().await;
    let activity_id = activity_id_priced_450(&state).await;

    let res = test_app(&state)
        .oneshot(get(&format!("/api/activities/{activity_id}/rating")))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["averageRating"], 0.0);
    assert_eq!(json["totalReviews"], 0);
}

// ── Booking creation ──

#[tokio::test]
async fn booking_end_to_end_computes_total_from_price_snapshot() {
    let state = test_state().await;
    let activity_id = activity_id_priced_450(&state).await;

    let booking = create_booking(&state, &activity_id).await;

    assert_eq!(booking["totalAmount"], "900");
    assert_eq!(booking["status"], "pending");
    assert_eq!(booking["paymentStatus"], "unpaid");
    assert_eq!(booking["paidAmount"], 0);
    assert_eq!(booking["customerName"], "Marie");
    assert_eq!(booking["participantNames"], json!(["Marie", "Paul"]));
    assert_eq!(booking["preferredDate"], "2025-06-01");
}

#[tokio::test]
async fn booking_defaults_participants_to_customer_name() {
    let state = test_state().await;
    let activity_id = activity_id_priced_450(&state).await;

    let res = test_app(&state)
        .oneshot(json_request(
            "POST",
            "/api/bookings",
            &json!({
                "customerName": "Marie",
                "customerPhone": "+33612345678",
                "activityId": activity_id,
                "numberOfPeople": 1,
                "preferredDate": "2025-06-01"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);
    let booking = body_json(res).await;
    assert_eq!(booking["participantNames"], json!(["Marie"]));
    assert_eq!(booking["totalAmount"], "450");
}

#[tokio::test]
async fn booking_against_unknown_activity_is_404() {
    let state = test_state().await;
    let res = test_app(&state)
        .oneshot(json_request(
            "POST",
            "/api/bookings",
            &booking_payload(&uuid::Uuid::new_v4().to_string()),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn booking_with_zero_people_is_rejected() {
    let state = test_state().await;
    let activity_id = activity_id_priced_450(&state).await;

    let mut payload = booking_payload(&activity_id);
    payload["numberOfPeople"] = json!(0);

    let res = test_app(&state)
        .oneshot(json_request("POST", "/api/bookings", &payload))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let json = body_json(res).await;
    assert_eq!(json["message"], "Validation error");
    assert!(json["details"]["number_of_people"].is_array());
}

// ── Sessions and role gates ──

#[tokio::test]
async fn admin_routes_require_a_session() {
    let state = test_state().await;
    let res = test_app(&state)
        .oneshot(get("/api/admin/bookings"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(res).await["message"], "Not authenticated");
}

#[tokio::test]
async fn admin_passes_admin_gate_but_not_superadmin_gate() {
    let state = test_state().await;
    let cookie = login(&state, "ahmed", "admin-pass").await;

    let res = test_app(&state)
        .oneshot(get_with_cookie("/api/admin/bookings", &cookie))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    for uri in [
        "/api/admin/audit-logs",
        "/api/admin/system-health",
        "/api/admin/analytics/earnings",
    ] {
        let res = test_app(&state)
            .oneshot(get_with_cookie(uri, &cookie))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN, "{uri} should be superadmin-only");
        assert_eq!(body_json(res).await["message"], "Superadmin access required");
    }
}

#[tokio::test]
async fn superadmin_passes_both_gates() {
    let state = test_state().await;
    let cookie = login(&state, "nadia", "super-pass").await;

    for uri in [
        "/api/admin/bookings",
        "/api/admin/audit-logs",
        "/api/admin/system-health",
        "/api/admin/analytics/earnings",
    ] {
        let res = test_app(&state)
            .oneshot(get_with_cookie(uri, &cookie))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{uri} should be open to superadmin");
    }
}

#[tokio::test]
async fn login_with_wrong_password_creates_no_session() {
    let state = test_state().await;
    let res = test_app(&state)
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            &json!({ "username": "ahmed", "password": "wrong" }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn login_with_unknown_user_is_401() {
    let state = test_state().await;
    let res = test_app(&state)
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            &json!({ "username": "nobody", "password": "whatever" }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn current_user_reflects_the_session() {
    let state = test_state().await;
    let cookie = login(&state, "nadia", "super-pass").await;

    let res = test_app(&state)
        .oneshot(get_with_cookie("/api/auth/user", &cookie))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let user = body_json(res).await;
    assert_eq!(user["username"], "nadia");
    assert_eq!(user["role"], "superadmin");
    assert!(user.get("passwordHash").is_none());
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let state = test_state().await;
    let cookie = login(&state, "ahmed", "admin-pass").await;

    let res = test_app(&state)
        .oneshot(json_request_with_cookie(
            "POST",
            "/api/auth/logout",
            &json!({}),
            &cookie,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = test_app(&state)
        .oneshot(get_with_cookie("/api/auth/user", &cookie))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn forged_session_cookie_is_rejected() {
    let state = test_state().await;
    let res = test_app(&state)
        .oneshot(get_with_cookie(
            "/api/admin/bookings",
            "dunes.session=deadbeef.Zm9yZ2Vk",
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

// ── Booking management ──

#[tokio::test]
async fn booking_status_update_writes_an_audit_entry() {
    let state = test_state().await;
    let activity_id = activity_id_priced_450(&state).await;
    let booking = create_booking(&state, &activity_id).await;
    let booking_id = booking["id"].as_str().unwrap();

    let cookie = login(&state, "ahmed", "admin-pass").await;
    let res = test_app(&state)
        .oneshot(json_request_with_cookie(
            "PATCH",
            &format!("/api/admin/bookings/{booking_id}/status"),
            &json!({ "status": "confirmed" }),
            &cookie,
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["status"], "confirmed");

    // The audit trail is superadmin territory.
    let super_cookie = login(&state, "nadia", "super-pass").await;
    let res = test_app(&state)
        .oneshot(get_with_cookie("/api/admin/audit-logs", &super_cookie))
        .await
        .unwrap();
    let logs = body_json(res).await;
    assert!(
        logs.as_array().unwrap().iter().any(|log| {
            log["action"]
                .as_str()
                .is_some_and(|a| a.contains("status to confirmed"))
        }),
        "status change should be audited"
    );
}

#[tokio::test]
async fn full_payment_path_reaches_total_amount() {
    let state = test_state().await;
    let activity_id = activity_id_priced_450(&state).await;
    let booking = create_booking(&state, &activity_id).await;
    let booking_id = booking["id"].as_str().unwrap();

    let cookie = login(&state, "ahmed", "admin-pass").await;
    // The "full" UI path sends paidAmount == totalAmount.
    let res = test_app(&state)
        .oneshot(json_request_with_cookie(
            "PATCH",
            &format!("/api/admin/bookings/{booking_id}/payment"),
            &json!({
                "paymentStatus": "fully_paid",
                "paidAmount": 900,
                "paymentMethod": "cash"
            }),
            &cookie,
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let updated = body_json(res).await;
    assert_eq!(updated["paymentStatus"], "fully_paid");
    assert_eq!(updated["paymentMethod"], "cash");
    assert_eq!(updated["paidAmount"], 900);
    assert_eq!(updated["totalAmount"], "900");
}

#[tokio::test]
async fn deposit_payment_keeps_client_supplied_amounts() {
    let state = test_state().await;
    let activity_id = activity_id_priced_450(&state).await;
    let booking = create_booking(&state, &activity_id).await;
    let booking_id = booking["id"].as_str().unwrap();

    let cookie = login(&state, "ahmed", "admin-pass").await;
    let res = test_app(&state)
        .oneshot(json_request_with_cookie(
            "PATCH",
            &format!("/api/admin/bookings/{booking_id}/payment"),
            &json!({
                "paymentStatus": "deposit_paid",
                "paidAmount": 270,
                "paymentMethod": "cash_deposit",
                "depositAmount": 270
            }),
            &cookie,
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let updated = body_json(res).await;
    assert_eq!(updated["paymentStatus"], "deposit_paid");
    assert_eq!(updated["paidAmount"], 270);
    assert_eq!(updated["depositAmount"], 270);
}

#[tokio::test]
async fn payment_update_for_unknown_booking_is_404() {
    let state = test_state().await;
    let cookie = login(&state, "ahmed", "admin-pass").await;

    let res = test_app(&state)
        .oneshot(json_request_with_cookie(
            "PATCH",
            &format!("/api/admin/bookings/{}/payment", uuid::Uuid::new_v4()),
            &json!({
                "paymentStatus": "fully_paid",
                "paidAmount": 900,
                "paymentMethod": "cash"
            }),
            &cookie,
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

// ── Reviews ──

#[tokio::test]
async fn review_is_public_only_after_approval() {
    let state = test_state().await;
    let activity_id = activity_id_priced_450(&state).await;

    let res = test_app(&state)
        .oneshot(json_request(
            "POST",
            "/api/reviews",
            &json!({
                "customerName": "Paul",
                "customerEmail": "paul@example.com",
                "activityId": activity_id,
                "rating": 5,
                "title": "Unforgettable",
                "comment": "The desert dinner was amazing."
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let review = body_json(res).await;
    assert_eq!(review["approved"], false);
    let review_id = review["id"].as_str().unwrap().to_string();

    // Not listed publicly, no effect on the rating yet.
    let res = test_app(&state)
        .oneshot(get(&format!("/api/reviews?activityId={activity_id}")))
        .await
        .unwrap();
    assert_eq!(body_json(res).await.as_array().unwrap().len(), 0);

    let res = test_app(&state)
        .oneshot(get(&format!("/api/activities/{activity_id}/rating")))
        .await
        .unwrap();
    assert_eq!(body_json(res).await["totalReviews"], 0);

    // Admin sees it and approves it.
    let cookie = login(&state, "ahmed", "admin-pass").await;
    let res = test_app(&state)
        .oneshot(get_with_cookie("/api/admin/reviews", &cookie))
        .await
        .unwrap();
    assert_eq!(body_json(res).await.as_array().unwrap().len(), 1);

    let res = test_app(&state)
        .oneshot(json_request_with_cookie(
            "PATCH",
            &format!("/api/admin/reviews/{review_id}/approval"),
            &json!({ "approved": true }),
            &cookie,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Now it is public and feeds the aggregate.
    let res = test_app(&state)
        .oneshot(get(&format!("/api/reviews?activityId={activity_id}")))
        .await
        .unwrap();
    let listed = body_json(res).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["activity"]["price"], "450");

    let res = test_app(&state)
        .oneshot(get(&format!("/api/activities/{activity_id}/rating")))
        .await
        .unwrap();
    let rating = body_json(res).await;
    assert_eq!(rating["averageRating"], 5.0);
    assert_eq!(rating["totalReviews"], 1);
}

#[tokio::test]
async fn out_of_range_rating_is_rejected() {
    let state = test_state().await;
    let activity_id = activity_id_priced_450(&state).await;

    let res = test_app(&state)
        .oneshot(json_request(
            "POST",
            "/api/reviews",
            &json!({
                "customerName": "Paul",
                "customerEmail": "paul@example.com",
                "activityId": activity_id,
                "rating": 6,
                "title": "Too good",
                "comment": "Six stars."
            }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

// ── Activity management ──

#[tokio::test]
async fn activity_crud_roundtrip() {
    let state = test_state().await;
    let cookie = login(&state, "ahmed", "admin-pass").await;

    let res = test_app(&state)
        .oneshot(json_request_with_cookie(
            "POST",
            "/api/admin/activities",
            &json!({
                "name": "Atlas Mountains Trek",
                "description": "Guided day hike through Imlil and the foothills of Toubkal.",
                "price": "350",
                "image": "/images/atlas-trek.jpg",
                "category": "Nature"
            }),
            &cookie,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let activity = body_json(res).await;
    assert_eq!(activity["currency"], "MAD");
    assert_eq!(activity["isActive"], true);
    let activity_id = activity["id"].as_str().unwrap().to_string();

    // Visible in the public catalog.
    let res = test_app(&state).oneshot(get("/api/activities")).await.unwrap();
    assert_eq!(body_json(res).await.as_array().unwrap().len(), 6);

    // Partial update keeps the other fields.
    let res = test_app(&state)
        .oneshot(json_request_with_cookie(
            "PUT",
            &format!("/api/admin/activities/{activity_id}"),
            &json!({ "price": "380" }),
            &cookie,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated = body_json(res).await;
    assert_eq!(updated["price"], "380");
    assert_eq!(updated["name"], "Atlas Mountains Trek");

    // Delete removes it from the catalog.
    let res = test_app(&state)
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/admin/activities/{activity_id}"))
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = test_app(&state)
        .oneshot(get(&format!("/api/activities/{activity_id}")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn getyourguide_price_edit_is_superadmin_only() {
    let state = test_state().await;
    let activity_id = activity_id_priced_450(&state).await;
    let payload = json!({ "getyourguidePrice": 650 });

    let admin_cookie = login(&state, "ahmed", "admin-pass").await;
    let res = test_app(&state)
        .oneshot(json_request_with_cookie(
            "PATCH",
            &format!("/api/admin/activities/{activity_id}/getyourguide-price"),
            &payload,
            &admin_cookie,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let super_cookie = login(&state, "nadia", "super-pass").await;
    let res = test_app(&state)
        .oneshot(json_request_with_cookie(
            "PATCH",
            &format!("/api/admin/activities/{activity_id}/getyourguide-price"),
            &payload,
            &super_cookie,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["getyourguidePrice"], 650);
}

#[tokio::test]
async fn whatsapp_contacts_lists_the_staff() {
    let state = test_state().await;
    let cookie = login(&state, "ahmed", "admin-pass").await;

    let res = test_app(&state)
        .oneshot(get_with_cookie("/api/admin/whatsapp-contacts", &cookie))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let contacts = body_json(res).await;
    assert_eq!(contacts.as_array().unwrap().len(), 3);
    assert!(
        contacts
            .as_array()
            .unwrap()
            .iter()
            .any(|c| c["name"] == "Nadia" && c["role"] == "superadmin")
    );
}

// ── Analytics ──

#[tokio::test]
async fn booking_analytics_counts_by_status() {
    let state = test_state().await;
    let activity_id = activity_id_priced_450(&state).await;

    let first = create_booking(&state, &activity_id).await;
    create_booking(&state, &activity_id).await;

    let cookie = login(&state, "ahmed", "admin-pass").await;
    test_app(&state)
        .oneshot(json_request_with_cookie(
            "PATCH",
            &format!("/api/admin/bookings/{}/status", first["id"].as_str().unwrap()),
            &json!({ "status": "confirmed" }),
            &cookie,
        ))
        .await
        .unwrap();

    let res = test_app(&state)
        .oneshot(get_with_cookie("/api/admin/analytics/bookings", &cookie))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let analytics = body_json(res).await;
    assert_eq!(analytics["total"], 2);
    assert_eq!(analytics["pending"], 1);
    assert_eq!(analytics["confirmed"], 1);
    assert_eq!(analytics["cancelled"], 0);
}

#[tokio::test]
async fn earnings_count_only_paid_bookings() {
    let state = test_state().await;
    let activity_id = activity_id_priced_450(&state).await;

    let paid = create_booking(&state, &activity_id).await;
    create_booking(&state, &activity_id).await; // stays unpaid

    let admin_cookie = login(&state, "ahmed", "admin-pass").await;
    test_app(&state)
        .oneshot(json_request_with_cookie(
            "PATCH",
            &format!("/api/admin/bookings/{}/payment", paid["id"].as_str().unwrap()),
            &json!({
                "paymentStatus": "fully_paid",
                "paidAmount": 900,
                "paymentMethod": "cash"
            }),
            &admin_cookie,
        ))
        .await
        .unwrap();

    let super_cookie = login(&state, "nadia", "super-pass").await;
    let res = test_app(&state)
        .oneshot(get_with_cookie("/api/admin/analytics/earnings", &super_cookie))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let earnings = body_json(res).await;
    assert_eq!(earnings["currentMonth"], 900);
    assert_eq!(earnings["currency"], "MAD");
}

#[tokio::test]
async fn activity_analytics_reports_booking_counts() {
    let state = test_state().await;
    let activity_id = activity_id_priced_450(&state).await;
    create_booking(&state, &activity_id).await;

    let cookie = login(&state, "ahmed", "admin-pass").await;
    let res = test_app(&state)
        .oneshot(get_with_cookie("/api/admin/analytics/activities", &cookie))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let analytics = body_json(res).await;
    let agafay = analytics
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["price"] == "450")
        .unwrap();
    assert_eq!(agafay["bookingCount"], 1);
}

// ── Auth rate limiting (active outside development) ──

#[tokio::test]
async fn auth_rate_limiter_blocks_the_sixth_attempt() {
    let state = test_state_with_env("production").await;

    let attempt = || {
        Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            // Behind the production proxy: forwarded proto and client IP.
            .header("x-forwarded-proto", "https")
            .header("x-forwarded-for", "203.0.113.7")
            .body(Body::from(
                json!({ "username": "ahmed", "password": "wrong" }).to_string(),
            ))
            .unwrap()
    };

    for _ in 0..5 {
        let res = test_app(&state).oneshot(attempt()).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    let res = test_app(&state).oneshot(attempt()).await.unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn auth_rate_limiter_is_skipped_in_development() {
    let state = test_state().await;

    for _ in 0..8 {
        let res = test_app(&state)
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                &json!({ "username": "ahmed", "password": "wrong" }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
