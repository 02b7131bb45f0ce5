/// Session module
///
/// Server-side refresh-token sessions and the flows built on them: login,
/// refresh rotation, logout, request-time validation and expiry sweeping.

pub(crate) mod authenticator;
mod login;
mod logout;
mod rotation;
mod store;
mod sweeper;
mod validator;

pub use authenticator::{Authenticated, Authenticator};
pub use logout::LogoutOutcome;
pub use store::{NewSession, Session, SessionStore};
pub use sweeper::{spawn_session_sweeper, sweep_expired_sessions, SWEEP_INTERVAL};
