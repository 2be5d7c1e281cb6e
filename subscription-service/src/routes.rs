//! Route configuration
//!
//! Centralized route setup extracted from main.rs

use actix_web::{error::QueryPayloadError, web, HttpRequest};

use crate::error::AppError;
use crate::handlers;
use crate::middleware::JwtAuthMiddleware;

/// Configure all routes for the application
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .service(
            web::scope("/api/v1")
                .route("/health", web::get().to(handlers::health_check))
                .configure(routes::subscriptions::configure),
        );
}

/// Malformed query strings fail with the standard validation envelope
/// instead of actix's plain-text 400.
fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::Validation(err.to_string()).into()
}

// Sub-modules for each domain
mod routes {
    use super::*;

    pub mod subscriptions {
        use super::*;

        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/subscriptions")
                    .wrap(JwtAuthMiddleware)
                    // Literal segments first so "channels" never binds as a channel id
                    .route(
                        "/subscribers",
                        web::get().to(handlers::list_channel_subscribers),
                    )
                    .route("/channels", web::get().to(handlers::list_subscribed_channels))
                    .route(
                        "/channels/search",
                        web::get().to(handlers::search_subscribed_channels),
                    )
                    .route(
                        "/{channel_id}/status",
                        web::get().to(handlers::check_subscription_status),
                    )
                    .route(
                        "/{channel_id}/toggle",
                        web::post().to(handlers::toggle_subscription),
                    ),
            );
        }
    }
}
