use actix_web::{http::StatusCode, HttpResponse};
use serde::Serialize;

/// Success envelope shared by every successful response:
/// `{statusCode, data, message, success: true}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
    pub success: bool,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            data,
            message: message.into(),
            success: true,
        }
    }

    /// 200 OK wrapped in the success envelope
    pub fn ok(data: T, message: impl Into<String>) -> HttpResponse {
        HttpResponse::Ok().json(Self::new(StatusCode::OK, data, message))
    }

    /// 201 Created wrapped in the success envelope
    pub fn created(data: T, message: impl Into<String>) -> HttpResponse {
        HttpResponse::Created().json(Self::new(StatusCode::CREATED, data, message))
    }
}
