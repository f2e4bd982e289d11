//! Session token issuance and verification (HS256 JWT).
//!
//! Verification is pure: it needs only the token, the secret and the
//! current time. There is no server-side session record.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use super::AuthError;
use crate::models::auth::{Identity, IssuedToken, TokenClaims};

/// Session token lifetime: 24 hours.
pub const TOKEN_LIFETIME_SECS: i64 = 24 * 60 * 60;

/// The only accepted signing algorithm.
const ALGORITHM: Algorithm = Algorithm::HS256;

/// Signs and verifies session tokens with a server-held symmetric secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Build the service from an externally supplied secret.
    ///
    /// A blank secret is refused with [`AuthError::MissingSecret`].
    pub fn new(secret: &str) -> Result<Self, AuthError> {
        let secret = secret.trim();
        if secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }

        // Expiry is checked against the caller's clock in `verify`, and claim
        // presence is enforced by deserializing into `TokenClaims`.
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// Sign a token for `identity`, valid for [`TOKEN_LIFETIME_SECS`] from `now`.
    pub fn issue(&self, identity: &Identity, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let expires_at = now + Duration::seconds(TOKEN_LIFETIME_SECS);
        let claims = TokenClaims {
            sub: identity.user_id.to_string(),
            email: identity.email.clone(),
            user_id: identity.user_id,
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };
        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))?;
        Ok(IssuedToken { token, expires_at })
    }

    /// Verify a token and recover the identity it asserts.
    ///
    /// - bad signature, foreign algorithm or undecodable token → [`AuthError::InvalidToken`]
    /// - signature fine but claims of the wrong shape → [`AuthError::MalformedToken`]
    /// - `exp <= now` → [`AuthError::ExpiredToken`]
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, AuthError> {
        // Any header whose `alg` is not HS256 fails here with `InvalidAlgorithm`.
        let data = decode::<serde_json::Value>(token, &self.decoding, &self.validation)
            .map_err(|e| {
                if matches!(e.kind(), ErrorKind::InvalidAlgorithm) {
                    tracing::debug!("token rejected: unexpected algorithm");
                }
                AuthError::InvalidToken
            })?;

        let claims: TokenClaims = serde_json::from_value(data.claims)
            .map_err(|e| AuthError::MalformedToken(e.to_string()))?;

        if claims.sub != claims.user_id.to_string() {
            return Err(AuthError::MalformedToken("subject does not match userId".into()));
        }
        if claims.exp <= now.timestamp() {
            return Err(AuthError::ExpiredToken);
        }

        Ok(claims.into())
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &ALGORITHM)
            .finish_non_exhaustive()
    }
}
