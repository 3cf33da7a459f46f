//! Outbound mail.
//!
//! The services only need a send seam: OTP codes for password resets
//! and staff replies to contact messages go out through it.

use crate::ApiError;
use std::sync::Mutex;

/// An email waiting to leave the system.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivers email on behalf of the services.
pub trait Mailer: Send + Sync {
    /// Send one message.
    fn send(&self, mail: OutboundMail) -> Result<(), ApiError>;
}

/// Mailer that only logs, for environments without a mail relay.
#[derive(Debug, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, mail: OutboundMail) -> Result<(), ApiError> {
        tracing::info!(to = %mail.to, subject = %mail.subject, "outbound mail");
        Ok(())
    }
}

/// Mailer that captures messages in memory, for tests.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<OutboundMail>>,
}

impl MemoryMailer {
    /// Create an empty capture mailer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy out everything sent so far.
    pub fn sent(&self) -> Vec<OutboundMail> {
        self.sent.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Mailer for MemoryMailer {
    fn send(&self, mail: OutboundMail) -> Result<(), ApiError> {
        self.sent
            .lock()
            .map_err(|_| ApiError::Internal("mailer lock poisoned".to_string()))?
            .push(mail);
        Ok(())
    }
}
