//! One-time codes for the password reset flow.

use crate::AuthError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How long a code stays valid, in seconds.
pub const OTP_TTL_SECS: i64 = 5 * 60;

/// A single-use six-digit code, stored against the user who requested it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OtpCode {
    /// The six-digit code.
    pub code: String,
    /// Unix timestamp of expiry.
    pub expires_at: i64,
    /// Whether the code has been consumed.
    pub used: bool,
}

impl OtpCode {
    /// Generate a fresh code expiring [`OTP_TTL_SECS`] from `now`.
    pub fn generate(now: i64) -> Self {
        let code: u32 = rand::thread_rng().gen_range(0..1_000_000);
        Self {
            code: format!("{:06}", code),
            expires_at: now + OTP_TTL_SECS,
            used: false,
        }
    }

    /// Consume the code if the candidate matches and it is still live.
    pub fn consume(&mut self, candidate: &str, now: i64) -> Result<(), AuthError> {
        if self.used {
            return Err(AuthError::InvalidOtp);
        }
        if now >= self.expires_at {
            return Err(AuthError::OtpExpired);
        }
        if self.code != candidate {
            return Err(AuthError::InvalidOtp);
        }
        self.used = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_is_six_digits() {
        let otp = OtpCode::generate(1_000);
        assert_eq!(otp.code.len(), 6);
        assert!(otp.code.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(otp.expires_at, 1_000 + OTP_TTL_SECS);
    }

    #[test]
    fn test_consume_once() {
        let mut otp = OtpCode::generate(1_000);
        let code = otp.code.clone();

        otp.consume(&code, 1_001).unwrap();
        assert!(matches!(
            otp.consume(&code, 1_002),
            Err(AuthError::InvalidOtp)
        ));
    }

    #[test]
    fn test_wrong_code_rejected() {
        let mut otp = OtpCode::generate(1_000);
        otp.code = "123456".to_string();
        assert!(matches!(
            otp.consume("654321", 1_001),
            Err(AuthError::InvalidOtp)
        ));
        // A failed attempt does not burn the code.
        assert!(otp.consume("123456", 1_001).is_ok());
    }

    #[test]
    fn test_expired_rejected() {
        let mut otp = OtpCode::generate(1_000);
        let code = otp.code.clone();
        assert!(matches!(
            otp.consume(&code, 1_000 + OTP_TTL_SECS),
            Err(AuthError::OtpExpired)
        ));
    }
}
