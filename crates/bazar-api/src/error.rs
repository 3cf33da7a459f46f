//! API error types and their HTTP mapping.

use bazar_auth::AuthError;
use bazar_commerce::CommerceError;
use bazar_store::StoreError;
use thiserror::Error;

/// Errors surfaced to API clients.
///
/// Every variant maps to one HTTP status; the display string becomes
/// the `message` field of the error envelope.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request payload failed validation.
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    #[error("{0}")]
    Forbidden(String),

    /// Resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Request conflicts with current state (duplicates, stock, transitions).
    #[error("{0}")]
    Conflict(String),

    /// Unexpected server-side failure.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation(_) => 422,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::Internal(_) => 500,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateId { .. } => ApiError::Conflict(e.to_string()),
            _ => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<CommerceError> for ApiError {
    fn from(e: CommerceError) -> Self {
        match e {
            CommerceError::ProductNotFound(_)
            | CommerceError::CategoryNotFound(_)
            | CommerceError::BrandNotFound(_)
            | CommerceError::CartNotFound(_)
            | CommerceError::OrderNotFound(_)
            | CommerceError::ItemNotInCart(_) => ApiError::NotFound(e.to_string()),

            CommerceError::InsufficientStock { .. }
            | CommerceError::InvalidOrderTransition { .. }
            | CommerceError::CouponUsageLimitReached(_)
            | CommerceError::CouponAlreadyUsed(_) => ApiError::Conflict(e.to_string()),

            CommerceError::EmptyCart
            | CommerceError::InvalidQuantity(_)
            | CommerceError::QuantityExceedsLimit(_, _)
            | CommerceError::InvalidCoupon(_)
            | CommerceError::CouponExpired(_)
            | CommerceError::CategoryKindMismatch { .. }
            | CommerceError::ValidationError(_) => ApiError::Validation(e.to_string()),

            CommerceError::CorruptHierarchy(_)
            | CommerceError::CurrencyMismatch { .. }
            | CommerceError::Overflow
            | CommerceError::StorageError(_)
            | CommerceError::SerializationError(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::TokenExpired => ApiError::Unauthorized(e.to_string()),

            AuthError::UserNotFound(_) => ApiError::NotFound(e.to_string()),
            AuthError::EmailTaken(_) => ApiError::Conflict(e.to_string()),
            AuthError::AccountBlocked | AuthError::Forbidden(_) => {
                ApiError::Forbidden(e.to_string())
            }

            AuthError::InvalidOtp | AuthError::OtpExpired | AuthError::WeakPassword(_) => {
                ApiError::Validation(e.to_string())
            }

            AuthError::StorageError(_) | AuthError::Internal(_) => {
                ApiError::Internal(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::Validation("x".into()).status_code(), 422);
        assert_eq!(ApiError::Unauthorized("x".into()).status_code(), 401);
        assert_eq!(ApiError::Forbidden("x".into()).status_code(), 403);
        assert_eq!(ApiError::NotFound("x".into()).status_code(), 404);
        assert_eq!(ApiError::Conflict("x".into()).status_code(), 409);
        assert_eq!(ApiError::Internal("x".into()).status_code(), 500);
    }

    #[test]
    fn test_commerce_error_mapping() {
        let e: ApiError = CommerceError::ProductNotFound("p1".into()).into();
        assert_eq!(e.status_code(), 404);

        let e: ApiError = CommerceError::InsufficientStock {
            product_id: "p1".into(),
            requested: 5,
            available: 2,
        }
        .into();
        assert_eq!(e.status_code(), 409);

        let e: ApiError = CommerceError::CouponExpired("SAVE".into()).into();
        assert_eq!(e.status_code(), 422);
    }

    #[test]
    fn test_auth_error_mapping() {
        let e: ApiError = AuthError::InvalidCredentials.into();
        assert_eq!(e.status_code(), 401);

        let e: ApiError = AuthError::EmailTaken("a@b.c".into()).into();
        assert_eq!(e.status_code(), 409);

        let e: ApiError = AuthError::AccountBlocked.into();
        assert_eq!(e.status_code(), 403);
    }
}
