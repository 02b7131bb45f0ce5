/// Middleware module
///
/// Request guards for protected routes: access-token verification and the
/// server-side session check.

mod jwt_middleware;
mod session_middleware;

pub use jwt_middleware::JwtMiddleware;
pub use session_middleware::SessionCheckMiddleware;
