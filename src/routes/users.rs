use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;
use sqlx::PgPool;

use crate::auth::{hash_password, Claims};
use crate::error::{AppError, ConflictError, ErrorContext, NotFoundError};
use crate::logger::request_id;
use crate::response;
use crate::users::{self, UserProfile};
use crate::validators::RegisterRequest;

#[derive(Serialize)]
pub struct CreatedUser {
    pub id: i64,
}

/// POST /users
///
/// Register a user with a profile. Responds with the new id.
///
/// # Errors
/// - 400: `validation_error`
/// - 409: `user_exists`
/// - 500: `db_error`, `internal_error`
pub async fn register(
    req: HttpRequest,
    form: web::Json<RegisterRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration", request_id(&req));
    let form = form.into_inner();

    form.validate()?;

    if users::find_by_email(&pool, &form.email).await?.is_some() {
        return Err(ConflictError::UserExists.into());
    }

    let password_hash = hash_password(form.password).await?;
    let id = users::create_user(
        &pool,
        &form.email,
        &password_hash,
        &form.first_name,
        &form.last_name,
    )
    .await
    .map_err(|e| {
        context.log_error(&e);
        e
    })?;

    tracing::info!(request_id = %context.request_id, user_id = id, "User registered successfully");

    Ok(response::ok("User created successfully", CreatedUser { id }))
}

/// GET /users/me
///
/// Requires a valid bearer token; in stateful mode also a live session cookie.
/// Both checks run in middleware before this handler.
///
/// # Errors
/// - 401: missing, invalid or expired credentials (from middleware)
/// - 404: `not_found` when the user or profile has disappeared
pub async fn get_current_user(
    claims: web::ReqData<Claims>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user = users::find_by_id(&pool, claims.user_id)
        .await?
        .ok_or(NotFoundError::Resource)?;
    let detail = users::find_detail(&pool, user.id)
        .await?
        .ok_or(NotFoundError::Resource)?;

    Ok(response::ok(
        "User details fetched successfully",
        UserProfile::new(&user, detail),
    ))
}
