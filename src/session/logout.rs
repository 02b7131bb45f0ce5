use crate::auth::TokenKind;
use crate::session::authenticator::Authenticator;

/// What logout did with the session store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// The store was never consulted: stateless mode, or no usable refresh token.
    Untouched,
    /// The session behind the token was deleted.
    Removed,
    /// The token decoded but no session carried its id.
    Unknown,
    /// The delete failed; the error was logged.
    StoreFailed,
}

impl Authenticator {
    /// Forget the session behind `refresh_token`, if there is one.
    ///
    /// Never fails: a missing or undecodable token and store errors are
    /// only logged, so logout is idempotent from the caller's side.
    pub async fn logout(&self, refresh_token: Option<&str>) -> LogoutOutcome {
        if !self.mode.is_stateful() {
            return LogoutOutcome::Untouched;
        }

        let Some(token) = refresh_token else {
            return LogoutOutcome::Untouched;
        };

        let claims = match self.issuer.decode(token) {
            Ok(claims) if claims.typ == TokenKind::Refresh => claims,
            _ => {
                tracing::debug!("Logout without a usable refresh token");
                return LogoutOutcome::Untouched;
            }
        };

        match self.store.delete_by_token_id(&claims.jti).await {
            Ok(true) => {
                tracing::info!(user_id = claims.user_id, "Session removed on logout");
                LogoutOutcome::Removed
            }
            Ok(false) => {
                tracing::debug!(jti = %claims.jti, "Logout for unknown session");
                LogoutOutcome::Unknown
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to remove session on logout");
                LogoutOutcome::StoreFailed
            }
        }
    }
}
