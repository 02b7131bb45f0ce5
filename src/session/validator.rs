use chrono::Utc;

use crate::auth::{Claims, TokenKind};
use crate::error::{AppError, AuthError, SessionError};
use crate::session::authenticator::Authenticator;

impl Authenticator {
    /// Verify a bearer access token. Refresh tokens are refused here.
    pub fn check_access(&self, access_token: Option<&str>) -> Result<Claims, AuthError> {
        let token = access_token.ok_or(AuthError::Unauthorized)?;
        let claims = self.issuer.decode(token).map_err(|_| AuthError::Unauthorized)?;

        if claims.typ != TokenKind::Access {
            tracing::debug!(jti = %claims.jti, "Non-access token presented as bearer");
            return Err(AuthError::Unauthorized);
        }
        Ok(claims)
    }

    /// Confirm the refresh cookie still maps to a live session.
    ///
    /// Always passes in stateless mode.
    pub async fn check_session(&self, refresh_token: Option<&str>) -> Result<(), AppError> {
        if !self.mode.is_stateful() {
            return Ok(());
        }

        let token = refresh_token.ok_or(SessionError::SessionExpired)?;
        let claims = self
            .issuer
            .decode(token)
            .map_err(|_| SessionError::SessionExpired)?;
        if claims.typ != TokenKind::Refresh {
            return Err(SessionError::SessionExpired.into());
        }

        match self
            .store
            .find_valid(claims.user_id, &claims.jti, Utc::now())
            .await?
        {
            Some(_) => Ok(()),
            None => Err(SessionError::SessionExpired.into()),
        }
    }
}
