//! Authentication boundary tests
//!
//! Every subscription route must reject unauthenticated requests before any
//! handler logic (and therefore before any database access) runs. The app is
//! built without a database pool on purpose: a request that got past the
//! middleware would fail with a 500, not a 401.
//!
//! The middleware rejects by returning a service-level error, so these tests
//! go through `try_call_service` and render the error to inspect status and
//! body.

use actix_web::{body::to_bytes, http::StatusCode, test, App};

use subscription_service::routes::configure_routes;

const ROUTES: &[(&str, &str)] = &[
    ("GET", "/api/v1/subscriptions/7d3f0a48-9a0e-4b1d-8a4e-2f6d7c9b1e23/status"),
    ("POST", "/api/v1/subscriptions/7d3f0a48-9a0e-4b1d-8a4e-2f6d7c9b1e23/toggle"),
    ("GET", "/api/v1/subscriptions/subscribers"),
    ("GET", "/api/v1/subscriptions/channels"),
    ("GET", "/api/v1/subscriptions/channels/search"),
];

fn request(method: &str, path: &str) -> test::TestRequest {
    match method {
        "POST" => test::TestRequest::post().uri(path),
        _ => test::TestRequest::get().uri(path),
    }
}

#[actix_web::test]
async fn test_missing_authorization_header_is_rejected() {
    let app = test::init_service(App::new().configure(configure_routes)).await;

    for (method, path) in ROUTES {
        let result = test::try_call_service(&app, request(method, path).to_request()).await;
        let err = result.expect_err("request without credentials must not reach the handler");
        assert_eq!(
            err.error_response().status(),
            StatusCode::UNAUTHORIZED,
            "{} {} without credentials",
            method,
            path
        );
    }
}

#[actix_web::test]
async fn test_non_bearer_scheme_is_rejected() {
    let app = test::init_service(App::new().configure(configure_routes)).await;

    for (method, path) in ROUTES {
        let result = test::try_call_service(
            &app,
            request(method, path)
                .insert_header(("Authorization", "Basic dXNlcjpwYXNz"))
                .to_request(),
        )
        .await;
        let err = result.expect_err("non-Bearer credentials must not reach the handler");
        assert_eq!(
            err.error_response().status(),
            StatusCode::UNAUTHORIZED,
            "{} {} with a non-Bearer scheme",
            method,
            path
        );
    }
}

#[actix_web::test]
async fn test_garbage_bearer_token_is_rejected() {
    let app = test::init_service(App::new().configure(configure_routes)).await;

    for (method, path) in ROUTES {
        let result = test::try_call_service(
            &app,
            request(method, path)
                .insert_header(("Authorization", "Bearer not.a.token"))
                .to_request(),
        )
        .await;
        let err = result.expect_err("garbage token must not reach the handler");
        assert_eq!(
            err.error_response().status(),
            StatusCode::UNAUTHORIZED,
            "{} {} with a garbage token",
            method,
            path
        );
    }
}

#[actix_web::test]
async fn test_unauthenticated_rejection_uses_error_envelope() {
    let app = test::init_service(App::new().configure(configure_routes)).await;

    let result = test::try_call_service(
        &app,
        request("GET", "/api/v1/subscriptions/channels").to_request(),
    )
    .await;
    let err = result.expect_err("request without credentials must not reach the handler");

    let resp = err.error_response();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body = to_bytes(resp.into_body()).await.unwrap();
    let v: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["statusCode"], 401);
    assert_eq!(v["success"], false);
    assert_eq!(v["errors"], serde_json::json!([]));
    assert!(v["message"].as_str().unwrap().contains("Authentication"));
}
