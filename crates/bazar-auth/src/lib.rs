//! Authentication for the bazar backend.
//!
//! Covers user accounts and roles, Argon2 password hashing with a
//! strength policy, HS256 JWTs for access/refresh/reset flows, and
//! six-digit OTP codes for password recovery.

pub mod error;
pub mod otp;
pub mod password;
pub mod token;
pub mod user;

pub use error::AuthError;
pub use otp::{OtpCode, OTP_TTL_SECS};
pub use password::{hash_password, validate_strength, verify_password};
pub use token::{Claims, TokenIssuer, TokenPurpose};
pub use user::{RefreshSession, Role, User};
