/// JWT encoding and decoding
///
/// Tokens are HMAC-signed. Decoding only accepts the HMAC family, so a token
/// whose header names another algorithm (`none`, `RS256`, ...) is rejected
/// before its payload is trusted.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::Claims;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// Signs and verifies [`Claims`] with the process-wide secret.
#[derive(Clone)]
pub struct JwtCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtCodec {
    pub fn new(config: &JwtSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.leeway = 0;
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    /// Sign claims into a compact JWT.
    ///
    /// # Errors
    /// Returns an internal error if signing fails
    pub fn encode(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
    }

    /// Verify signature, algorithm, issuer and expiry, then return the claims.
    ///
    /// # Errors
    /// Every failure collapses to [`AuthError::InvalidToken`]; the parser's
    /// reason is only logged at debug level.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(reason = %e, "JWT rejected");
                AuthError::InvalidToken
            })?;

        // jsonwebtoken treats `exp == now` as live; we require exp strictly ahead.
        if claims.is_expired_at(chrono::Utc::now()) {
            tracing::debug!(jti = %claims.jti, "JWT rejected: expired");
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }
}
