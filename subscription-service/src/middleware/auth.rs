/// JWT authentication middleware for Bearer token validation.
///
/// Extracts the requester id from JWT claims and adds it to request
/// extensions; handlers receive it explicitly through the `RequesterId`
/// extractor argument.
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use uuid::Uuid;

use crate::error::AppError;
use crate::security::jwt;

/// Rejections surface as `AppError::Authentication` so unauthenticated
/// requests get the same error envelope as every other failure.
fn unauthorized(message: &str) -> Error {
    AppError::Authentication(message.to_string()).into()
}

/// Authenticated requester id extracted from the access token
#[derive(Debug, Clone, Copy)]
pub struct RequesterId(pub Uuid);

/// JWT authentication middleware factory
pub struct JwtAuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            // Copy the header out before touching extensions_mut; holding an
            // immutable borrow across the mutable one panics at runtime.
            let auth_header = req
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .map(str::to_owned)
                .ok_or_else(|| unauthorized("missing Authorization header"))?;

            let token = auth_header
                .strip_prefix("Bearer ")
                .ok_or_else(|| unauthorized("invalid Authorization scheme, expected Bearer"))?;

            let token_data = jwt::validate_token(token).map_err(|e| {
                tracing::debug!("Token validation failed: {}", e);
                unauthorized("invalid or expired token")
            })?;

            let requester_id = Uuid::parse_str(&token_data.claims.sub)
                .map_err(|_| unauthorized("invalid requester ID in token"))?;

            req.extensions_mut().insert(RequesterId(requester_id));

            service.call(req).await
        })
    }
}

impl FromRequest for RequesterId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<RequesterId>() {
            Some(requester_id) => ready(Ok(*requester_id)),
            None => ready(Err(unauthorized(
                "requester ID missing in request extensions",
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_extractor_reads_request_extensions() {
        let id = Uuid::new_v4();
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(RequesterId(id));

        let extracted = RequesterId::extract(&req).await.unwrap();
        assert_eq!(extracted.0, id);
    }

    #[actix_web::test]
    async fn test_extractor_rejects_unauthenticated_request() {
        let req = TestRequest::default().to_http_request();
        assert!(RequesterId::extract(&req).await.is_err());
    }
}
