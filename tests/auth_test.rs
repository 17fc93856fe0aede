use axum::body::{to_bytes, Body};
use axum::http::{header, header::LOCATION, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt; // for oneshot

#[path = "common.rs"]
mod common;

const BODY_LIMIT: usize = 1024 * 1024;

#[tokio::test]
async fn login_redirects_to_provider() {
    let db = common::init_test_db().expect("init db");
    let state = common::test_state(common::test_config(&db.path), db.pool.clone(), None);
    let app = common::build_test_app(state);

    let res = app
        .oneshot(Request::get("/auth").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    let loc = res
        .headers()
        .get(LOCATION)
        .expect("Location header")
        .to_str()
        .unwrap();
    assert!(
        loc.starts_with("https://example.com/authorize"),
        "Location was: {}",
        loc
    );
    assert!(loc.contains("client_id=CLIENT"), "Location was: {}", loc);
    assert!(loc.contains("redirect_uri="), "Location was: {}", loc);
    assert!(loc.contains("state="), "Location was: {}", loc);
}

#[tokio::test]
async fn callback_without_state_redirects_to_failure_path() {
    let db = common::init_test_db().expect("init db");
    let state = common::test_state(common::test_config(&db.path), db.pool.clone(), None);
    let app = common::build_test_app(state);

    let res = app
        .oneshot(
            Request::get("/auth/callback?code=abc&state=bogus")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    let loc = res.headers().get(LOCATION).unwrap().to_str().unwrap();
    assert_eq!(loc, "/");
}

#[tokio::test]
async fn logout_requires_a_session() {
    let db = common::init_test_db().expect("init db");
    let state = common::test_state(common::test_config(&db.path), db.pool.clone(), None);
    let cookie = common::session_cookie_header(&state.cookie_key, "user-1");
    let app = common::build_test_app(state);

    let res = app
        .clone()
        .oneshot(Request::get("/logout").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app
        .oneshot(
            Request::get("/logout")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    // The response must tell the client to drop the session cookie.
    let removals: Vec<String> = res
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter(|v| v.starts_with("sid="))
        .map(String::from)
        .collect();
    assert!(!removals.is_empty(), "no sid removal in Set-Cookie");
    let body: Value =
        serde_json::from_slice(&to_bytes(res.into_body(), BODY_LIMIT).await.unwrap()).unwrap();
    assert_eq!(body["message"], "Successfully logged out");
}

#[tokio::test]
async fn expired_session_is_rejected() {
    let db = common::init_test_db().expect("init db");
    let state = common::test_state(common::test_config(&db.path), db.pool.clone(), None);
    let expired = common::session_cookie_with_exp(&state.cookie_key, "user-1", Some(0));
    let app = common::build_test_app(state);

    let res = app
        .oneshot(
            Request::get("/weather-data")
                .header(header::COOKIE, &expired)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_and_api_docs_respond() {
    let db = common::init_test_db().expect("init db");
    let state = common::test_state(common::test_config(&db.path), db.pool.clone(), None);
    let app = common::build_test_app(state);

    let res = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value =
        serde_json::from_slice(&to_bytes(res.into_body(), BODY_LIMIT).await.unwrap()).unwrap();
    assert_eq!(body["status"], "ok");

    let res = app
        .oneshot(Request::get("/api-docs").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value =
        serde_json::from_slice(&to_bytes(res.into_body(), BODY_LIMIT).await.unwrap()).unwrap();
    assert_eq!(body["openapi"], "3.0.0");
    assert!(body["paths"]["/weather"].is_object());
}
