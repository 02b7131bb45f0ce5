use crate::auth::{verify_dummy_password, verify_password};
use crate::error::{AppError, AuthError, NotFoundError};
use crate::session::authenticator::{Authenticated, Authenticator};
use crate::session::store::NewSession;
use crate::users;

impl Authenticator {
    /// Exchange email and password for a token pair.
    ///
    /// An unknown email and a wrong password fail identically, and both pay
    /// for one bcrypt verification. In stateful mode the new refresh token
    /// replaces any session the user already had.
    pub async fn login(&self, email: &str, password: &str) -> Result<Authenticated, AppError> {
        let Some(user) = users::find_by_email(&self.pool, email).await? else {
            verify_dummy_password(password.to_string()).await?;
            return Err(AuthError::InvalidCredentials.into());
        };

        if !verify_password(password.to_string(), user.password_hash.clone()).await? {
            return Err(AuthError::InvalidCredentials.into());
        }

        let detail = users::find_detail(&self.pool, user.id)
            .await?
            .ok_or(NotFoundError::Record)?;

        let tokens = self.issuer.issue_pair(user.id, &user.email)?;

        if self.mode.is_stateful() {
            let session = NewSession::from_claims(&tokens.refresh.claims)?;
            self.store.replace_for_user(&session).await?;
            tracing::debug!(user_id = user.id, jti = %session.jti, "Session created");
        }

        tracing::info!(user_id = user.id, "User logged in");
        Ok(Authenticated::new(&user, detail, tokens))
    }
}
