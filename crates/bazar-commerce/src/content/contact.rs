//! Contact form messages.

use crate::ids::{ContactId, UserId};
use bazar_store::Document;
use serde::{Deserialize, Serialize};

/// Lifecycle of a contact message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    /// Submitted, not yet opened by staff.
    Pending,
    /// Opened by staff.
    Seen,
    /// Answered by staff.
    Replied,
}

impl ContactStatus {
    /// Get the status as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::Pending => "pending",
            ContactStatus::Seen => "seen",
            ContactStatus::Replied => "replied",
        }
    }
}

/// A message submitted through the contact form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contact {
    /// Unique message identifier.
    pub id: ContactId,
    /// Sender full name.
    pub full_name: String,
    /// Sender email, used for the reply.
    pub email: String,
    /// Message subject.
    pub subject: String,
    /// Message body.
    pub message: String,
    /// Lifecycle status.
    pub status: ContactStatus,
    /// Staff answer, once replied.
    pub answer: Option<String>,
    /// Staff member who answered.
    pub answered_by: Option<UserId>,
    /// Unix timestamp of the reply.
    pub replied_at: Option<i64>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Document for Contact {
    const COLLECTION: &'static str = "contacts";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Contact {
    /// Create a new pending message.
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let now = current_timestamp();
        Self {
            id: ContactId::generate(),
            full_name: full_name.into(),
            email: email.into(),
            subject: subject.into(),
            message: message.into(),
            status: ContactStatus::Pending,
            answer: None,
            answered_by: None,
            replied_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark the message as seen. Replied messages stay replied.
    pub fn mark_seen(&mut self) {
        if self.status == ContactStatus::Pending {
            self.status = ContactStatus::Seen;
            self.updated_at = current_timestamp();
        }
    }

    /// Record a staff answer, stamping the reply time.
    pub fn reply(&mut self, answer: impl Into<String>, answered_by: UserId) {
        let now = current_timestamp();
        self.answer = Some(answer.into());
        self.answered_by = Some(answered_by);
        self.replied_at = Some(now);
        self.status = ContactStatus::Replied;
        self.updated_at = now;
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

    #[test]
    fn test_new_message_is_pending() {
        let msg = Contact::new("Ali", "ali@example.com", "Order issue", "Where is it?");
        assert_eq!(msg.status, ContactStatus::Pending);
        assert!(msg.answer.is_none());
    }

    #[test]
    fn test_mark_seen() {
        let mut msg = Contact::new("Ali", "ali@example.com", "Hi", "Hello");
        msg.mark_seen();
        assert_eq!(msg.status, ContactStatus::Seen);
    }

    #[test]
    fn test_reply() {
        let mut msg = Contact::new("Ali", "ali@example.com", "Hi", "Hello");
        msg.reply("We shipped it.", UserId::new("admin-1"));
        assert_eq!(msg.status, ContactStatus::Replied);
        assert_eq!(msg.answer.as_deref(), Some("We shipped it."));
        assert!(msg.replied_at.is_some());

        // Seen after replied is a no-op.
        msg.mark_seen();
        assert_eq!(msg.status, ContactStatus::Replied);
    }
}
