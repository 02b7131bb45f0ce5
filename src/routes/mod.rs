mod auth;
mod health_check;
mod users;

pub use auth::{json_error_handler, login, logout, refresh, AuthResponse};
pub use health_check::{health_check, home, not_found};
pub use users::{get_current_user, register, CreatedUser};
