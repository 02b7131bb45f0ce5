use chrono::Utc;

use crate::auth::TokenKind;
use crate::error::{AppError, SessionError};
use crate::session::authenticator::{Authenticated, Authenticator};
use crate::session::store::{NewSession, SessionStore};

impl Authenticator {
    /// Exchange a refresh token for a new token pair.
    ///
    /// In stateful mode the presented token's session is retired and the
    /// replacement persisted in one transaction. The retirement is a
    /// conditional delete, so when the same token is presented concurrently
    /// exactly one caller gets new tokens and the rest see
    /// [`SessionError::SessionNotFound`]. User lookups run before the
    /// transaction opens so no row lock is held across them.
    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<Authenticated, AppError> {
        let token = refresh_token.ok_or(SessionError::NoRefreshToken)?;
        let claims = self
            .issuer
            .decode(token)
            .ok()
            .filter(|claims| claims.typ == TokenKind::Refresh)
            .ok_or(SessionError::InvalidRefreshToken)?;

        if self.mode.is_stateful()
            && self
                .store
                .find_valid(claims.user_id, &claims.jti, Utc::now())
                .await?
                .is_none()
        {
            tracing::warn!(user_id = claims.user_id, jti = %claims.jti, "Refresh with unknown session");
            return Err(SessionError::SessionNotFound.into());
        }

        let (user, detail) = self.load_user(claims.user_id).await?;

        if !self.mode.is_stateful() {
            let tokens = self.issuer.issue_pair(user.id, &user.email)?;
            return Ok(Authenticated::new(&user, detail, tokens));
        }

        let mut tx = self.store.begin().await?;

        if !SessionStore::consume(&mut tx, claims.user_id, &claims.jti, Utc::now()).await? {
            tracing::warn!(user_id = claims.user_id, jti = %claims.jti, "Refresh token already rotated");
            return Err(SessionError::SessionNotFound.into());
        }

        let tokens = self.issuer.issue_pair(user.id, &user.email)?;
        let session = NewSession::from_claims(&tokens.refresh.claims)?;
        SessionStore::create_in(&mut tx, &session)
            .await
            .map_err(conflict_as_internal)?;

        tx.commit().await?;

        tracing::info!(user_id = user.id, jti = %session.jti, "Refresh token rotated");
        Ok(Authenticated::new(&user, detail, tokens))
    }
}

/// During rotation a session insert conflict is an internal fault.
fn conflict_as_internal(e: AppError) -> AppError {
    match e {
        AppError::Conflict(c) => AppError::Internal(format!("Session insert conflict: {}", c)),
        other => other,
    }
}
