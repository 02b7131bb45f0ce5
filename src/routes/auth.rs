/// Authentication Routes
///
/// Login, refresh-token rotation and logout. The refresh token travels only
/// in the HttpOnly cookie; the access token only in the response body.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;

use crate::auth::{read_refresh_cookie, refresh_cookie, removal_cookie};
use crate::configuration::ApplicationSettings;
use crate::error::{AppError, ErrorContext, ValidationError};
use crate::logger::request_id;
use crate::response::ApiResponse;
use crate::session::{Authenticated, Authenticator};
use crate::users::UserProfile;
use crate::validators::LoginRequest;

/// Body returned by login and refresh.
#[derive(Serialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub user: UserProfile,
    pub access_token: String,
}

/// Respond with the new access token and set the rotated refresh cookie.
fn token_response(
    message: &'static str,
    authenticated: Authenticated,
    authenticator: &Authenticator,
    app: &ApplicationSettings,
) -> HttpResponse {
    let cookie = refresh_cookie(
        &authenticated.refresh_token.token,
        authenticator.issuer().refresh_token_ttl(),
        app.is_production(),
    );

    HttpResponse::Ok().cookie(cookie).json(ApiResponse::new(
        message,
        AuthResponse {
            user: authenticated.profile,
            access_token: authenticated.access_token,
        },
    ))
}

/// POST /login
///
/// # Errors
/// - 400: `validation_error`
/// - 401: `invalid_credentials` (unknown email and wrong password look the same)
/// - 500: `db_error`, `internal_error`
pub async fn login(
    req: HttpRequest,
    form: web::Json<LoginRequest>,
    authenticator: web::Data<Authenticator>,
    app: web::Data<ApplicationSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login", request_id(&req));
    let form = form.into_inner();

    form.validate()?;

    let authenticated = authenticator
        .login(&form.email, &form.password)
        .await
        .map_err(|e| {
            context.log_error(&e);
            e
        })?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = authenticated.profile.id,
        "User logged in successfully"
    );

    Ok(token_response(
        "User logged in successfully",
        authenticated,
        &authenticator,
        &app,
    ))
}

/// POST /refresh
///
/// Reads the refresh cookie, rotates it and returns a new access token.
///
/// # Errors
/// - 401: `no_refresh_token`, `invalid_refresh_token`,
///   `refresh_session_not_found`, `user_not_found`, `user_detail_not_found`
/// - 500: `db_error`, `internal_error`
pub async fn refresh(
    req: HttpRequest,
    authenticator: web::Data<Authenticator>,
    app: web::Data<ApplicationSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_refresh", request_id(&req));
    let refresh_token = read_refresh_cookie(&req);

    let authenticated = authenticator
        .refresh(refresh_token.as_deref())
        .await
        .map_err(|e| {
            context.log_error(&e);
            e
        })?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = authenticated.profile.id,
        "Token refreshed successfully"
    );

    Ok(token_response(
        "Token refreshed successfully",
        authenticated,
        &authenticator,
        &app,
    ))
}

/// POST /logout
///
/// Always succeeds and always clears the refresh cookie.
pub async fn logout(
    req: HttpRequest,
    authenticator: web::Data<Authenticator>,
    app: web::Data<ApplicationSettings>,
) -> HttpResponse {
    let refresh_token = read_refresh_cookie(&req);
    let outcome = authenticator.logout(refresh_token.as_deref()).await;

    tracing::info!(request_id = %request_id(&req), ?outcome, "User logged out");

    HttpResponse::Ok()
        .cookie(removal_cookie(app.is_production()))
        .json(ApiResponse::new("User logged out successfully", ()))
}

/// Parse failures of JSON bodies become `validation_error`.
pub fn json_error_handler(err: actix_web::error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::from(ValidationError::MalformedBody(err.to_string())).into()
}
