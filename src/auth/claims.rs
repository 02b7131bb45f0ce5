/// JWT Claims structure
///
/// Access and refresh tokens share one payload shape and are told apart by
/// the `typ` claim. Numeric claims are
/// normalized to `i64` on decode: issuers that encode them as JSON floats
/// (e.g. `1700000000.0`) are accepted as long as the value is integral.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Which half of a token pair a JWT is.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Owning user's id
    #[serde(deserialize_with = "integral")]
    pub user_id: i64,
    /// User email at issuance time
    pub email: String,
    /// Issued at (Unix timestamp, seconds)
    #[serde(deserialize_with = "integral")]
    pub iat: i64,
    /// Expiration time (Unix timestamp, seconds)
    #[serde(deserialize_with = "integral")]
    pub exp: i64,
    /// Unique token id; only the refresh token's is ever persisted
    pub jti: String,
    /// Issuer
    pub iss: String,
    /// Token kind
    pub typ: TokenKind,
}

impl Claims {
    /// Build claims valid from `now` for `lifetime`, with a fresh token id.
    ///
    /// # Errors
    /// Returns an internal error if `now + lifetime` is not a representable time
    pub fn new(
        typ: TokenKind,
        user_id: i64,
        email: &str,
        now: chrono::DateTime<chrono::Utc>,
        lifetime: chrono::Duration,
        issuer: &str,
    ) -> Result<Self, AppError> {
        let expires_at = now
            .checked_add_signed(lifetime)
            .ok_or_else(|| AppError::Internal("Token lifetime out of range".to_string()))?;

        Ok(Self {
            user_id,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
            iss: issuer.to_string(),
            typ,
        })
    }

    pub fn issued_at(&self) -> chrono::DateTime<chrono::Utc> {
        timestamp_to_datetime(self.iat)
    }

    pub fn expires_at(&self) -> chrono::DateTime<chrono::Utc> {
        timestamp_to_datetime(self.exp)
    }

    /// A token is live only while `exp` is strictly in the future.
    pub fn is_expired_at(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        self.exp <= now.timestamp()
    }
}

fn timestamp_to_datetime(secs: i64) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::from_timestamp(secs, 0).unwrap_or(chrono::DateTime::<chrono::Utc>::MIN_UTC)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Number {
    Int(i64),
    Float(f64),
}

fn integral<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Number::deserialize(deserializer)? {
        Number::Int(v) => Ok(v),
        Number::Float(v) if v.fract() == 0.0 && v.is_finite() && v.abs() < i64::MAX as f64 => {
            Ok(v as i64)
        }
        Number::Float(v) => Err(serde::de::Error::custom(format!(
            "expected an integral number, got {}",
            v
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_claims_creation() {
        let now = Utc::now();
        let claims = Claims::new(TokenKind::Access, 42, "a@x.com", now, Duration::minutes(15), "test").unwrap();

        assert_eq!(claims.typ, TokenKind::Access);
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp - claims.iat, 900);
        assert!(!claims.is_expired_at(now));
        assert!(claims.is_expired_at(now + Duration::minutes(15)));
    }

    #[test]
    fn test_each_claims_gets_a_fresh_jti() {
        let now = Utc::now();
        let a = Claims::new(TokenKind::Refresh, 1, "a@x.com", now, Duration::minutes(1), "test").unwrap();
        let b = Claims::new(TokenKind::Refresh, 1, "a@x.com", now, Duration::minutes(1), "test").unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_unrepresentable_expiry_is_an_error() {
        let result = Claims::new(TokenKind::Refresh, 1, "a@x.com", Utc::now(), Duration::MAX, "test");
        assert!(matches!(result, Err(AppError::Internal(_))));

        let far = Duration::try_days(100_000_000).unwrap();
        assert!(Claims::new(TokenKind::Refresh, 1, "a@x.com", Utc::now(), far, "test").is_err());
    }

    #[test]
    fn test_float_numeric_claims_are_normalized() {
        let json = r#"{"user_id":7.0,"email":"a@x.com","iat":1700000000.0,"exp":1700000900,"jti":"j","iss":"t","typ":"access"}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();

        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.iat, 1_700_000_000);
        assert_eq!(claims.exp, 1_700_000_900);
        assert_eq!(claims.typ, TokenKind::Access);
    }

    #[test]
    fn test_fractional_numeric_claim_is_rejected() {
        let json = r#"{"user_id":7.5,"email":"a@x.com","iat":1,"exp":2,"jti":"j","iss":"t","typ":"access"}"#;
        assert!(serde_json::from_str::<Claims>(json).is_err());
    }

    #[test]
    fn test_missing_or_mistyped_fields_are_rejected() {
        let missing_jti = r#"{"user_id":7,"email":"a@x.com","iat":1,"exp":2,"iss":"t","typ":"access"}"#;
        assert!(serde_json::from_str::<Claims>(missing_jti).is_err());

        let missing_typ = r#"{"user_id":7,"email":"a@x.com","iat":1,"exp":2,"jti":"j","iss":"t"}"#;
        assert!(serde_json::from_str::<Claims>(missing_typ).is_err());

        let unknown_typ = r#"{"user_id":7,"email":"a@x.com","iat":1,"exp":2,"jti":"j","iss":"t","typ":"id"}"#;
        assert!(serde_json::from_str::<Claims>(unknown_typ).is_err());

        let string_user_id = r#"{"user_id":"7","email":"a@x.com","iat":1,"exp":2,"jti":"j","iss":"t","typ":"access"}"#;
        assert!(serde_json::from_str::<Claims>(string_user_id).is_err());
    }
}
