//! Application configuration.

use crate::ApiError;
use bazar_commerce::Currency;

/// Runtime configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Secret used to sign JWTs.
    pub jwt_secret: String,
    /// Currency all prices are quoted in.
    pub currency: Currency,
    /// Sender address for outbound mail.
    pub mail_from: String,
    /// Default page size for list endpoints.
    pub page_size: usize,
}

impl AppConfig {
    /// Load configuration from `BAZAR_*` environment variables.
    ///
    /// `BAZAR_JWT_SECRET` is required; everything else has a default.
    pub fn from_env() -> Result<Self, ApiError> {
        let jwt_secret = std::env::var("BAZAR_JWT_SECRET")
            .map_err(|_| ApiError::Internal("BAZAR_JWT_SECRET is not set".to_string()))?;

        let currency = match std::env::var("BAZAR_CURRENCY") {
            Ok(code) => Currency::from_code(&code).ok_or_else(|| {
                ApiError::Internal(format!("Unknown currency code: {}", code))
            })?,
            Err(_) => Currency::default(),
        };

        let mail_from = std::env::var("BAZAR_MAIL_FROM")
            .unwrap_or_else(|_| "no-reply@bazar.example".to_string());

        let page_size = std::env::var("BAZAR_PAGE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(20);

        Ok(Self {
            jwt_secret,
            currency,
            mail_from,
            page_size,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "dev-secret".to_string(),
            currency: Currency::default(),
            mail_from: "no-reply@bazar.example".to_string(),
            page_size: 20,
        }
    }
}
