/// Server-side session middleware
///
/// In stateful mode, rejects requests whose refresh cookie no longer maps to
/// a live session. Stateless deployments pass straight through.

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::read_refresh_cookie;
use crate::session::Authenticator;

pub struct SessionCheckMiddleware {
    authenticator: Authenticator,
}

impl SessionCheckMiddleware {
    pub fn new(authenticator: Authenticator) -> Self {
        Self { authenticator }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionCheckMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionCheckMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(SessionCheckMiddlewareService {
            service: Rc::new(service),
            authenticator: self.authenticator.clone(),
        }))
    }
}

pub struct SessionCheckMiddlewareService<S> {
    service: Rc<S>,
    authenticator: Authenticator,
}

impl<S, B> Service<ServiceRequest> for SessionCheckMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let refresh_token = read_refresh_cookie(req.request());
        let authenticator = self.authenticator.clone();
        let service = self.service.clone();

        Box::pin(async move {
            if let Err(e) = authenticator.check_session(refresh_token.as_deref()).await {
                return Ok(req.error_response(e).map_into_right_body());
            }

            service
                .call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::SessionMode;
    use crate::session::authenticator::lazy_authenticator;
    use actix_web::{http::StatusCode, test, web, App, HttpResponse};

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    #[actix_web::test]
    async fn test_stateless_mode_passes_without_cookie() {
        let app = test::init_service(
            App::new()
                .wrap(SessionCheckMiddleware::new(lazy_authenticator(SessionMode::Stateless)))
                .route("/me", web::get().to(ok)),
        )
        .await;

        let req = test::TestRequest::get().uri("/me").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_stateful_mode_without_cookie_is_session_expired() {
        let app = test::init_service(
            App::new()
                .wrap(SessionCheckMiddleware::new(lazy_authenticator(SessionMode::Stateful)))
                .route("/me", web::get().to(ok)),
        )
        .await;

        let req = test::TestRequest::get().uri("/me").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let json: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(json["error"]["code"], "session_expired");
    }
}
