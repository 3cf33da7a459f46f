//! Contact form intake and staff replies.

use crate::context::AppContext;
use crate::mail::OutboundMail;
use crate::services::{require_admin, validate_email, Pagination};
use crate::ApiError;
use bazar_auth::User;
use bazar_commerce::{Contact, ContactStatus};
use bazar_store::{Filter, FindOptions};
use serde::Deserialize;

/// Input for [`submit_contact`]. No account is needed to write in.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitContactInput {
    pub full_name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Accept a message from the contact form.
pub fn submit_contact(ctx: &AppContext, input: SubmitContactInput) -> Result<Contact, ApiError> {
    validate_email(&input.email)?;
    for (field, value) in [
        ("full_name", &input.full_name),
        ("subject", &input.subject),
        ("message", &input.message),
    ] {
        if value.trim().is_empty() {
            return Err(ApiError::Validation(format!("{} is required", field)));
        }
    }

    let contact = Contact::new(
        input.full_name,
        input.email.trim().to_lowercase(),
        input.subject,
        input.message,
    );
    ctx.store.insert(&contact)?;

    tracing::info!(contact = %contact.id, "contact message received");
    Ok(contact)
}

/// Filters for [`list_contacts`]. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct ContactQuery {
    pub status: Option<ContactStatus>,
    pub answered_by: Option<String>,
}

impl ContactQuery {
    fn to_filter(&self) -> Filter {
        let mut filter = Filter::new();
        if let Some(status) = self.status {
            filter = filter.eq("status", status.as_str());
        }
        if let Some(answered_by) = &self.answered_by {
            filter = filter.eq("answered_by", answered_by.as_str());
        }
        filter
    }
}

/// List messages, newest first, with optional filters. Admin only.
pub fn list_contacts(
    ctx: &AppContext,
    actor: &User,
    query: ContactQuery,
    page: Pagination,
) -> Result<Vec<Contact>, ApiError> {
    require_admin(actor)?;
    Ok(ctx.store.find(
        &query.to_filter(),
        &page.apply(FindOptions::new().sort_desc("created_at")),
    )?)
}

/// Fetch one message, marking it as seen. Admin only.
pub fn get_contact(ctx: &AppContext, actor: &User, id: &str) -> Result<Contact, ApiError> {
    require_admin(actor)?;
    let mut contact = load(ctx, id)?;
    contact.mark_seen();
    ctx.store.save(&contact)?;
    Ok(contact)
}

/// Answer a message. Admin only. The answer is mailed to the sender.
pub fn reply_contact(
    ctx: &AppContext,
    actor: &User,
    id: &str,
    answer: &str,
) -> Result<Contact, ApiError> {
    require_admin(actor)?;
    if answer.trim().is_empty() {
        return Err(ApiError::Validation("Answer is required".to_string()));
    }

    let mut contact = load(ctx, id)?;
    contact.reply(answer, actor.id.clone());
    ctx.store.save(&contact)?;

    ctx.mailer.send(OutboundMail {
        to: contact.email.clone(),
        subject: format!("Re: {}", contact.subject),
        body: answer.to_string(),
    })?;

    tracing::info!(contact = %id, "contact message answered");
    Ok(contact)
}

/// Delete a message. Admin only.
pub fn delete_contact(ctx: &AppContext, actor: &User, id: &str) -> Result<(), ApiError> {
    require_admin(actor)?;
    if !ctx.store.delete::<Contact>(id)? {
        return Err(ApiError::NotFound(format!("Contact message not found: {}", id)));
    }
    Ok(())
}

fn load(ctx: &AppContext, id: &str) -> Result<Contact, ApiError> {
    ctx.store
        .get(id)?
        .ok_or_else(|| ApiError::NotFound(format!("Contact message not found: {}", id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testutil::{seed_admin, seed_user, test_ctx};

    fn message(email: &str) -> SubmitContactInput {
        SubmitContactInput {
            full_name: "Ali Karimi".into(),
            email: email.into(),
            subject: "Order issue".into(),
            message: "Where is my order?".into(),
        }
    }

    #[test]
    fn test_submit_validates_email() {
        let (ctx, _) = test_ctx();
        assert!(matches!(
            submit_contact(&ctx, message("not-an-email")),
            Err(ApiError::Validation(_))
        ));

        let contact = submit_contact(&ctx, message("Ali@Example.COM")).unwrap();
        assert_eq!(contact.email, "ali@example.com");
        assert_eq!(contact.status, ContactStatus::Pending);
    }

    #[test]
    fn test_listing_is_admin_only() {
        let (ctx, _) = test_ctx();
        let user = seed_user(&ctx, "a@example.com");
        assert!(matches!(
            list_contacts(&ctx, &user, ContactQuery::default(), Pagination::first(20)),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[test]
    fn test_get_marks_seen_and_filters_apply() {
        let (ctx, _) = test_ctx();
        let admin = seed_admin(&ctx);
        let first = submit_contact(&ctx, message("a@example.com")).unwrap();
        submit_contact(&ctx, message("b@example.com")).unwrap();

        let seen = get_contact(&ctx, &admin, first.id.as_str()).unwrap();
        assert_eq!(seen.status, ContactStatus::Seen);

        let pending = list_contacts(
            &ctx,
            &admin,
            ContactQuery {
                status: Some(ContactStatus::Pending),
                ..Default::default()
            },
            Pagination::first(20),
        )
        .unwrap();
        assert_eq!(pending.len(), 1);

        reply_contact(&ctx, &admin, first.id.as_str(), "Hello.").unwrap();
        let answered = list_contacts(
            &ctx,
            &admin,
            ContactQuery {
                answered_by: Some(admin.id.to_string()),
                ..Default::default()
            },
            Pagination::first(20),
        )
        .unwrap();
        assert_eq!(answered.len(), 1);
        assert_eq!(answered[0].id, first.id);
    }

    #[test]
    fn test_reply_mails_the_sender() {
        let (ctx, mailer) = test_ctx();
        let admin = seed_admin(&ctx);
        let contact = submit_contact(&ctx, message("ali@example.com")).unwrap();

        let replied =
            reply_contact(&ctx, &admin, contact.id.as_str(), "It ships tomorrow.").unwrap();
        assert_eq!(replied.status, ContactStatus::Replied);
        assert_eq!(replied.answered_by.as_ref(), Some(&admin.id));

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ali@example.com");
        assert_eq!(sent[0].subject, "Re: Order issue");
        assert_eq!(sent[0].body, "It ships tomorrow.");
    }

    #[test]
    fn test_empty_answer_rejected() {
        let (ctx, _) = test_ctx();
        let admin = seed_admin(&ctx);
        let contact = submit_contact(&ctx, message("ali@example.com")).unwrap();
        assert!(matches!(
            reply_contact(&ctx, &admin, contact.id.as_str(), "  "),
            Err(ApiError::Validation(_))
        ));
    }
}
