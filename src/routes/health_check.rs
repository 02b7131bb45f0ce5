use actix_web::HttpResponse;
use serde_json::json;

use crate::error::{AppError, NotFoundError};
use crate::response;

/// GET /
pub async fn home() -> HttpResponse {
    response::ok("API is running.", json!({ "version": env!("CARGO_PKG_VERSION") }))
}

pub async fn health_check() -> HttpResponse {
    tracing::debug!("Health check endpoint called");
    response::ok("API is healthy", json!({ "status": "healthy" }))
}

/// Fallback for unknown routes.
pub async fn not_found() -> Result<HttpResponse, AppError> {
    Err(NotFoundError::Resource.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, web, App};

    #[actix_web::test]
    async fn test_health_check_envelope() {
        let app = test::init_service(App::new().route("/healthz", web::get().to(health_check))).await;

        let req = test::TestRequest::get().uri("/healthz").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "healthy");
    }

    #[actix_web::test]
    async fn test_home_reports_version() {
        let app = test::init_service(App::new().route("/", web::get().to(home))).await;

        let req = test::TestRequest::get().uri("/").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "API is running.");
        assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn test_unknown_route_is_not_found_envelope() {
        let app = test::init_service(App::new().default_service(web::to(not_found))).await;

        let req = test::TestRequest::get().uri("/nope").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["error"]["code"], "not_found");
    }
}
