/// Access / refresh token issuance
///
/// Lifetimes come from [`JwtSettings`] once, at construction. Issuing a token
/// has no side effect; persisting the refresh token's id is up to the caller.

use chrono::{Duration, Utc};

use crate::auth::claims::{Claims, TokenKind};
use crate::auth::jwt::JwtCodec;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// A signed token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Access and refresh token minted in the same operation.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

#[derive(Clone)]
pub struct TokenIssuer {
    codec: JwtCodec,
    access_ttl: Duration,
    refresh_ttl: Duration,
    issuer: String,
}

impl TokenIssuer {
    pub fn new(config: &JwtSettings) -> Self {
        Self {
            codec: JwtCodec::new(config),
            access_ttl: config.access_token_ttl(),
            refresh_ttl: config.refresh_token_ttl(),
            issuer: config.issuer.clone(),
        }
    }

    pub fn issue_access_token(&self, user_id: i64, email: &str) -> Result<IssuedToken, AppError> {
        self.issue(TokenKind::Access, user_id, email, self.access_ttl)
    }

    pub fn issue_refresh_token(&self, user_id: i64, email: &str) -> Result<IssuedToken, AppError> {
        self.issue(TokenKind::Refresh, user_id, email, self.refresh_ttl)
    }

    pub fn issue_pair(&self, user_id: i64, email: &str) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access: self.issue_access_token(user_id, email)?,
            refresh: self.issue_refresh_token(user_id, email)?,
        })
    }

    /// Verify and decode any token this issuer produced.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        self.codec.decode(token)
    }

    pub fn refresh_token_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    fn issue(
        &self,
        kind: TokenKind,
        user_id: i64,
        email: &str,
        lifetime: Duration,
    ) -> Result<IssuedToken, AppError> {
        let claims = Claims::new(kind, user_id, email, Utc::now(), lifetime, &self.issuer)?;
        let token = self.codec.encode(&claims)?;
        Ok(IssuedToken { token, claims })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer_with(access_minutes: i64, refresh_days: i64) -> TokenIssuer {
        TokenIssuer::new(&JwtSettings {
            secret: "issuer-test-secret-issuer-test-secret".to_string(),
            access_token_expiry_minutes: access_minutes,
            refresh_token_expiry_days: refresh_days,
            issuer: "test".to_string(),
        })
    }

    fn issuer() -> TokenIssuer {
        issuer_with(15, 7)
    }

    #[test]
    fn test_access_token_round_trip() {
        let issuer = issuer();
        let issued = issuer.issue_access_token(11, "a@x.com").unwrap();
        let decoded = issuer.decode(&issued.token).unwrap();

        assert_eq!(decoded, issued.claims);
        assert_eq!(decoded.user_id, 11);
        assert_eq!(decoded.email, "a@x.com");
        assert_eq!(decoded.typ, TokenKind::Access);
    }

    #[test]
    fn test_pair_carries_token_kinds() {
        let pair = issuer().issue_pair(11, "a@x.com").unwrap();

        assert_eq!(pair.access.claims.typ, TokenKind::Access);
        assert_eq!(pair.refresh.claims.typ, TokenKind::Refresh);
    }

    #[test]
    fn test_oversized_lifetime_fails_instead_of_panicking() {
        let issuer = issuer_with(15, 100_000_000);

        assert!(issuer.issue_access_token(11, "a@x.com").is_ok());
        let err = issuer.issue_refresh_token(11, "a@x.com").unwrap_err();
        assert_eq!(err.code(), "internal_error");
        assert!(issuer.issue_pair(11, "a@x.com").is_err());

        let err = issuer_with(i64::MAX, 7).issue_access_token(11, "a@x.com").unwrap_err();
        assert_eq!(err.code(), "internal_error");
    }

    #[test]
    fn test_lifetimes_follow_configuration() {
        let pair = issuer().issue_pair(11, "a@x.com").unwrap();

        assert_eq!(pair.access.claims.exp - pair.access.claims.iat, 15 * 60);
        assert_eq!(pair.refresh.claims.exp - pair.refresh.claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_pair_has_distinct_token_ids() {
        let pair = issuer().issue_pair(11, "a@x.com").unwrap();

        assert_ne!(pair.access.claims.jti, pair.refresh.claims.jti);
        assert_ne!(pair.access.token, pair.refresh.token);
    }

    #[test]
    fn test_consecutive_issues_never_collide() {
        let issuer = issuer();
        let first = issuer.issue_refresh_token(11, "a@x.com").unwrap();
        let second = issuer.issue_refresh_token(11, "a@x.com").unwrap();

        assert_ne!(first.claims.jti, second.claims.jti);
        assert_ne!(first.token, second.token);
    }
}
