//! JWT issuance and verification.
//!
//! Three token purposes circulate: short-lived access tokens on every
//! request, refresh tokens stored against the user for rotation, and
//! single-flow reset tokens handed out after OTP verification.

use crate::AuthError;
use bazar_commerce::ids::UserId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// What a token is good for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    /// Authenticates API requests.
    Access,
    /// Renews an expired access token.
    Refresh,
    /// Authorizes a password reset after OTP verification.
    ResetPassword,
}

impl TokenPurpose {
    /// Get the purpose as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::Access => "access",
            TokenPurpose::Refresh => "refresh",
            TokenPurpose::ResetPassword => "reset_password",
        }
    }

    /// Lifetime of a token with this purpose, in seconds.
    pub fn expiry_secs(&self) -> i64 {
        match self {
            TokenPurpose::Access => 24 * 60 * 60,       // 1 day
            TokenPurpose::Refresh => 3 * 24 * 60 * 60,  // 3 days
            TokenPurpose::ResetPassword => 5 * 60,      // 5 minutes
        }
    }
}

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: String,
    /// What this token is good for.
    pub purpose: TokenPurpose,
    /// Unix timestamp of issuance.
    pub iat: i64,
    /// Unix timestamp of expiry.
    pub exp: i64,
}

/// Signs and verifies JWTs with a shared HS256 secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenIssuer {
    /// Create an issuer from a secret.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Issue a token for a user with the given purpose.
    pub fn issue(&self, user: &UserId, purpose: TokenPurpose) -> Result<String, AuthError> {
        let now = current_timestamp();
        let claims = Claims {
            sub: user.to_string(),
            purpose,
            iat: now,
            exp: now + purpose.expiry_secs(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Verify a token and check it carries the expected purpose.
    ///
    /// A token presented for the wrong purpose (e.g. a refresh token on
    /// an API request) is rejected as invalid.
    pub fn verify(&self, token: &str, expected: TokenPurpose) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default()).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            },
        )?;
        if data.claims.purpose != expected {
            return Err(AuthError::InvalidToken);
        }
        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer").finish_non_exhaustive()
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(b"test-secret")
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = issuer();
        let token = issuer
            .issue(&UserId::new("u1"), TokenPurpose::Access)
            .unwrap();
        let claims = issuer.verify(&token, TokenPurpose::Access).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.purpose, TokenPurpose::Access);
    }

    #[test]
    fn test_wrong_purpose_rejected() {
        let issuer = issuer();
        let token = issuer
            .issue(&UserId::new("u1"), TokenPurpose::Refresh)
            .unwrap();
        assert!(matches!(
            issuer.verify(&token, TokenPurpose::Access),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issuer()
            .issue(&UserId::new("u1"), TokenPurpose::Access)
            .unwrap();
        let other = TokenIssuer::new(b"other-secret");
        assert!(matches!(
            other.verify(&token, TokenPurpose::Access),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(issuer().verify("not-a-jwt", TokenPurpose::Access).is_err());
    }

    #[test]
    fn test_expiry_windows() {
        assert_eq!(TokenPurpose::Access.expiry_secs(), 86_400);
        assert_eq!(TokenPurpose::Refresh.expiry_secs(), 259_200);
        assert_eq!(TokenPurpose::ResetPassword.expiry_secs(), 300);
    }
}
