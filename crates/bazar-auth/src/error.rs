//! Auth error types.

use thiserror::Error;

/// Errors that can occur in authentication operations.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Email and password do not match a user.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No user with this identifier.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// A user with this email already exists.
    #[error("Email already registered: {0}")]
    EmailTaken(String),

    /// Account is blocked by an administrator.
    #[error("Account is blocked")]
    AccountBlocked,

    /// Token is malformed, has a wrong purpose, or fails verification.
    #[error("Invalid token")]
    InvalidToken,

    /// Token is past its expiry.
    #[error("Token expired")]
    TokenExpired,

    /// OTP code is wrong, already used, or was never requested.
    #[error("Invalid OTP code")]
    InvalidOtp,

    /// OTP code is past its expiry.
    #[error("OTP expired")]
    OtpExpired,

    /// Password does not meet the strength policy.
    #[error("Weak password: {0}")]
    WeakPassword(String),

    /// Caller lacks the required role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Storage error.
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Internal error.
    #[error("Internal auth error: {0}")]
    Internal(String),
}

impl From<bazar_store::StoreError> for AuthError {
    fn from(e: bazar_store::StoreError) -> Self {
        AuthError::StorageError(e.to_string())
    }
}
