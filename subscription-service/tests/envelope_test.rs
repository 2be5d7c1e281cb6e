//! Response envelope contract tests
//!
//! Success and error envelopes must keep their exact wire shape:
//! `{statusCode, data, message, success: true}` and
//! `{statusCode, message, success: false, errors: []}`.

use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use actix_web::ResponseError;
use serde_json::json;

use subscription_service::error::AppError;
use subscription_service::response::ApiResponse;

#[actix_web::test]
async fn test_success_envelope_contract() {
    let resp = ApiResponse::ok(json!({"isSubscribed": false}), "subscription status fetched");
    assert_eq!(resp.status(), StatusCode::OK);

    let body = to_bytes(resp.into_body()).await.unwrap();
    let v: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(v["statusCode"], 200);
    assert_eq!(v["success"], true);
    assert_eq!(v["message"], "subscription status fetched");
    assert_eq!(v["data"]["isSubscribed"], false);
}

#[actix_web::test]
async fn test_created_envelope_reports_201() {
    let resp = ApiResponse::created(json!({"isSubscribed": true}), "subscribed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body = to_bytes(resp.into_body()).await.unwrap();
    let v: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(v["statusCode"], 201);
    assert_eq!(v["data"]["isSubscribed"], true);
}

#[actix_web::test]
async fn test_error_envelope_contract() {
    let resp = AppError::NotFound("user not found".to_string()).error_response();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body = to_bytes(resp.into_body()).await.unwrap();
    let v: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(v["statusCode"], 404);
    assert_eq!(v["success"], false);
    assert_eq!(v["errors"], json!([]));
    assert_eq!(v["message"], "Not found: user not found");
    assert!(v.get("data").is_none());
}

#[actix_web::test]
async fn test_validation_error_maps_to_400() {
    let resp = AppError::Validation("invalid channel id".to_string()).error_response();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = to_bytes(resp.into_body()).await.unwrap();
    let v: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(v["statusCode"], 400);
    assert_eq!(v["message"], "Validation error: invalid channel id");
}
