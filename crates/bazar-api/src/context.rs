//! Shared application state handed to every service call.

use crate::config::AppConfig;
use crate::mail::{LogMailer, Mailer};
use bazar_auth::TokenIssuer;
use bazar_store::Store;
use std::sync::Arc;

/// Everything a service needs: the store, the token issuer, the mailer,
/// and configuration.
pub struct AppContext {
    /// Document store.
    pub store: Store,
    /// JWT issuer keyed with the configured secret.
    pub tokens: TokenIssuer,
    /// Outbound mail seam.
    pub mailer: Arc<dyn Mailer>,
    /// Runtime configuration.
    pub config: AppConfig,
}

impl AppContext {
    /// Build a context with a custom mailer.
    pub fn new(config: AppConfig, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            store: Store::new(),
            tokens: TokenIssuer::new(config.jwt_secret.as_bytes()),
            mailer,
            config,
        }
    }

    /// Build a context that logs mail instead of sending it.
    pub fn with_log_mailer(config: AppConfig) -> Self {
        Self::new(config, Arc::new(LogMailer))
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
