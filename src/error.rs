/// Error handling for the authentication service.
///
/// Every failure a flow can produce is one of the domain enums below, wrapped
/// in [`AppError`]. At the HTTP boundary each variant maps to a stable error
/// code, a fixed human message and a status code. Internal detail (driver or
/// token parser messages) is logged and never serialized.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

/// A single rule a request field failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub rule: &'static str,
    pub message: String,
}

/// Malformed or missing input
#[derive(Debug, Clone)]
pub enum ValidationError {
    /// Per-field failures keyed by JSON field name
    Fields(BTreeMap<&'static str, Vec<FieldIssue>>),
    /// The body could not be parsed at all
    MalformedBody(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Fields(fields) => {
                let names: Vec<&str> = fields.keys().copied().collect();
                write!(f, "invalid fields: {}", names.join(", "))
            }
            ValidationError::MalformedBody(msg) => write!(f, "malformed body: {}", msg),
        }
    }
}

impl StdError for ValidationError {}

/// Authentication failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email or wrong password; deliberately indistinguishable
    InvalidCredentials,
    /// Missing or unusable bearer credential on a protected route
    Unauthorized,
    /// Bad signature, wrong algorithm, expired or malformed claims
    InvalidToken,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::Unauthorized => write!(f, "Unauthorized"),
            AuthError::InvalidToken => write!(f, "Invalid token"),
        }
    }
}

impl StdError for AuthError {}

/// Refresh-token and server-side session failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    NoRefreshToken,
    InvalidRefreshToken,
    SessionNotFound,
    SessionExpired,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NoRefreshToken => write!(f, "No refresh token"),
            SessionError::InvalidRefreshToken => write!(f, "Invalid refresh token"),
            SessionError::SessionNotFound => write!(f, "Refresh session not found"),
            SessionError::SessionExpired => write!(f, "Session expired"),
        }
    }
}

impl StdError for SessionError {}

/// Records the flows depend on but could not find
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundError {
    /// User referenced by a refresh token is gone
    User,
    /// User has no profile row
    UserDetail,
    /// Profile missing during login
    Record,
    /// Generic resource lookup (e.g. `/users/me`, unknown routes)
    Resource,
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFoundError::User => write!(f, "User not found"),
            NotFoundError::UserDetail => write!(f, "User detail not found"),
            NotFoundError::Record => write!(f, "Record not found"),
            NotFoundError::Resource => write!(f, "Resource not found"),
        }
    }
}

impl StdError for NotFoundError {}

/// Uniqueness violations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictError {
    /// Registration with an email that is already taken
    UserExists,
    /// Any other unique constraint, carrying the constraint name if known
    Unique(String),
}

impl fmt::Display for ConflictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictError::UserExists => write!(f, "User already exists"),
            ConflictError::Unique(constraint) => {
                write!(f, "Unique constraint violated: {}", constraint)
            }
        }
    }
}

impl StdError for ConflictError {}

/// Store failures other than uniqueness
#[derive(Debug)]
pub enum DatabaseError {
    Unavailable(String),
    Query(String),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::Unavailable(msg) => write!(f, "Database unavailable: {}", msg),
            DatabaseError::Query(msg) => write!(f, "Query error: {}", msg),
        }
    }
}

impl StdError for DatabaseError {}

// ============================================================================
// UNIFIED APPLICATION ERROR
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Auth(AuthError),
    Session(SessionError),
    NotFound(NotFoundError),
    Conflict(ConflictError),
    Database(DatabaseError),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Session(e) => write!(f, "{}", e),
            AppError::NotFound(e) => write!(f, "{}", e),
            AppError::Conflict(e) => write!(f, "{}", e),
            AppError::Database(e) => write!(f, "{}", e),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        AppError::Session(err)
    }
}

impl From<NotFoundError> for AppError {
    fn from(err: NotFoundError) -> Self {
        AppError::NotFound(err)
    }
}

impl From<ConflictError> for AppError {
    fn from(err: ConflictError) -> Self {
        AppError::Conflict(err)
    }
}

/// Postgres SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                AppError::Conflict(ConflictError::Unique(constraint))
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::Database(DatabaseError::Unavailable(err.to_string()))
            }
            _ => AppError::Database(DatabaseError::Query(err.to_string())),
        }
    }
}

impl AppError {
    /// Stable machine-readable code for clients.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::Auth(AuthError::InvalidCredentials) => "invalid_credentials",
            AppError::Auth(AuthError::Unauthorized | AuthError::InvalidToken) => "unauthorized",
            AppError::Session(SessionError::NoRefreshToken) => "no_refresh_token",
            AppError::Session(SessionError::InvalidRefreshToken) => "invalid_refresh_token",
            AppError::Session(SessionError::SessionNotFound) => "refresh_session_not_found",
            AppError::Session(SessionError::SessionExpired) => "session_expired",
            AppError::NotFound(NotFoundError::User) => "user_not_found",
            AppError::NotFound(NotFoundError::UserDetail) => "user_detail_not_found",
            AppError::NotFound(NotFoundError::Record) => "record_not_found",
            AppError::NotFound(NotFoundError::Resource) => "not_found",
            AppError::Conflict(ConflictError::UserExists) => "user_exists",
            AppError::Conflict(ConflictError::Unique(_)) => "db_error",
            AppError::Database(_) => "db_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// Human message; fixed per code so no internal detail leaks.
    pub fn message(&self) -> &'static str {
        match self.code() {
            "validation_error" => "Validation error.",
            "invalid_credentials" => "Invalid email or password.",
            "unauthorized" => "Unauthorized access - invalid or missing token.",
            "no_refresh_token" => "No refresh token provided.",
            "invalid_refresh_token" => "Invalid refresh token.",
            "refresh_session_not_found" => "Refresh session not found.",
            "session_expired" => "Session has expired. Please log in again.",
            "user_not_found" => "User not found.",
            "user_detail_not_found" => "User detail not found.",
            "record_not_found" => "Record not found.",
            "not_found" => "Resource not found.",
            "user_exists" => "User already exists.",
            "db_error" => "Database error.",
            _ => "Internal server error.",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::Validation(ValidationError::Fields(fields)) => serde_json::to_value(fields).ok(),
            _ => None,
        }
    }

    fn log(&self) {
        match self {
            AppError::Validation(e) => tracing::debug!(error = %e, "Validation error"),
            AppError::Auth(AuthError::InvalidCredentials) => {
                tracing::warn!("Invalid credentials attempt")
            }
            AppError::Auth(e) => tracing::warn!(error = %e, "Authentication error"),
            AppError::Session(e) => tracing::warn!(error = %e, "Session error"),
            AppError::NotFound(e) => tracing::warn!(error = %e, "Record not found"),
            AppError::Conflict(e) => tracing::warn!(error = %e, "Conflict"),
            AppError::Database(e) => tracing::error!(error = %e, "Database error"),
            AppError::Internal(msg) => tracing::error!(error = %msg, "Internal error"),
        }
    }
}

// ============================================================================
// HTTP RESPONSE MAPPING
// ============================================================================

/// Error envelope: `{success: false, error: {code, message, details?}}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        Self {
            success: false,
            error: ErrorBody {
                code: err.code(),
                message: err.message(),
                details: err.details(),
            },
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) | AppError::Session(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(NotFoundError::Resource) => StatusCode::NOT_FOUND,
            AppError::NotFound(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(DatabaseError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        self.log();
        HttpResponse::build(self.status_code()).json(ErrorResponse::from(self))
    }
}

// ============================================================================
// ERROR CONTEXT
// ============================================================================

/// Per-operation context attached to flow logs.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub request_id: String,
    pub operation: &'static str,
}

impl ErrorContext {
    pub fn new(operation: &'static str, request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            operation,
        }
    }

    pub fn log_error(&self, error: &AppError) {
        match error {
            AppError::Database(_) | AppError::Internal(_) => tracing::error!(
                request_id = %self.request_id,
                operation = self.operation,
                code = error.code(),
                error = %error,
                "Operation failed"
            ),
            _ => tracing::info!(
                request_id = %self.request_id,
                operation = self.operation,
                code = error.code(),
                "Operation rejected"
            ),
        }
    }
}
