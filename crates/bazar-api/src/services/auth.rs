//! Registration, login, token rotation, and password recovery.

use crate::context::AppContext;
use crate::mail::OutboundMail;
use crate::services::{current_timestamp, validate_email};
use crate::ApiError;
use bazar_auth::{
    hash_password, validate_strength, verify_password, AuthError, OtpCode, TokenPurpose, User,
};
use bazar_store::filter;
use serde::{Deserialize, Serialize};

/// Input for [`register`].
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// A logged-in session: both tokens plus the user they belong to.
#[derive(Debug, Clone, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(skip)]
    pub user: User,
}

/// Create a new account.
///
/// Emails are unique; the password must pass the strength policy.
pub fn register(ctx: &AppContext, input: RegisterInput) -> Result<User, ApiError> {
    validate_email(&input.email)?;
    validate_strength(&input.password)?;

    let email = input.email.trim().to_lowercase();
    if find_by_email(ctx, &email)?.is_some() {
        return Err(AuthError::EmailTaken(email).into());
    }

    let hash = hash_password(&input.password)?;
    let user = User::new(input.first_name, input.last_name, email, hash);
    ctx.store.insert(&user)?;

    tracing::info!(user = %user.id, "user registered");
    Ok(user)
}

/// Log in with email and password, issuing a fresh token pair.
///
/// The refresh token is stored against the user; any earlier session
/// stops being honored.
pub fn login(ctx: &AppContext, email: &str, password: &str) -> Result<AuthTokens, ApiError> {
    let email = email.trim().to_lowercase();
    let user = find_by_email(ctx, &email)?.ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(password, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials.into());
    }
    if user.is_block {
        tracing::warn!(user = %user.id, "blocked account attempted login");
        return Err(AuthError::AccountBlocked.into());
    }

    let tokens = issue_session(ctx, user)?;
    tracing::info!(user = %tokens.user.id, "user logged in");
    Ok(tokens)
}

/// Resolve an access token to its user.
///
/// Rejects blocked accounts even if their token is still live.
pub fn authenticate(ctx: &AppContext, access_token: &str) -> Result<User, ApiError> {
    let claims = ctx.tokens.verify(access_token, TokenPurpose::Access)?;
    let user: User = ctx
        .store
        .get(&claims.sub)?
        .ok_or_else(|| AuthError::UserNotFound(claims.sub.clone()))?;
    if user.is_block {
        return Err(AuthError::AccountBlocked.into());
    }
    Ok(user)
}

/// Trade a refresh token for a new token pair.
///
/// Only the most recently issued refresh token is accepted; using it
/// rotates the session.
pub fn refresh(ctx: &AppContext, refresh_token: &str) -> Result<AuthTokens, ApiError> {
    let claims = ctx.tokens.verify(refresh_token, TokenPurpose::Refresh)?;
    let user: User = ctx
        .store
        .get(&claims.sub)?
        .ok_or(AuthError::InvalidToken)?;

    if !user.refresh_session_matches(refresh_token, current_timestamp()) {
        return Err(AuthError::InvalidToken.into());
    }
    if user.is_block {
        return Err(AuthError::AccountBlocked.into());
    }

    issue_session(ctx, user)
}

/// End the session belonging to a refresh token.
///
/// Logging out twice is fine; the second call is a no-op.
pub fn logout(ctx: &AppContext, refresh_token: &str) -> Result<(), ApiError> {
    let claims = ctx.tokens.verify(refresh_token, TokenPurpose::Refresh)?;
    ctx.store.update::<User, _>(&claims.sub, |user| {
        if user
            .refresh_session
            .as_ref()
            .is_some_and(|s| s.token == refresh_token)
        {
            user.clear_refresh_session();
        }
    })?;
    Ok(())
}

/// Start a password reset: generate an OTP and email it to the user.
pub fn forgot_password(ctx: &AppContext, email: &str) -> Result<(), ApiError> {
    let email = email.trim().to_lowercase();
    let mut user = find_by_email(ctx, &email)?
        .ok_or_else(|| AuthError::UserNotFound(email.clone()))?;

    let otp = OtpCode::generate(current_timestamp());
    let code = otp.code.clone();
    user.reset_otp = Some(otp);
    ctx.store.save(&user)?;

    ctx.mailer.send(OutboundMail {
        to: user.email.clone(),
        subject: "Your password reset code".to_string(),
        body: format!("Your verification code is {}. It expires in 5 minutes.", code),
    })?;

    tracing::info!(user = %user.id, "password reset requested");
    Ok(())
}

/// Verify the emailed OTP, returning a short-lived reset token.
pub fn verify_otp(ctx: &AppContext, email: &str, code: &str) -> Result<String, ApiError> {
    let email = email.trim().to_lowercase();
    let mut user = find_by_email(ctx, &email)?
        .ok_or_else(|| AuthError::UserNotFound(email.clone()))?;

    let otp = user.reset_otp.as_mut().ok_or(AuthError::InvalidOtp)?;
    otp.consume(code, current_timestamp())?;
    ctx.store.save(&user)?;

    let reset_token = ctx.tokens.issue(&user.id, TokenPurpose::ResetPassword)?;
    Ok(reset_token)
}

/// Set a new password using a reset token from [`verify_otp`].
///
/// Drops the active refresh session so stolen sessions die with the
/// old password.
pub fn reset_password(
    ctx: &AppContext,
    reset_token: &str,
    new_password: &str,
) -> Result<(), ApiError> {
    let claims = ctx.tokens.verify(reset_token, TokenPurpose::ResetPassword)?;
    validate_strength(new_password)?;

    let hash = hash_password(new_password)?;
    let changed = ctx.store.update::<User, _>(&claims.sub, |user| {
        user.set_password_hash(hash.clone());
        user.clear_refresh_session();
    })?;
    if !changed {
        return Err(AuthError::UserNotFound(claims.sub).into());
    }

    tracing::info!(user = %claims.sub, "password reset completed");
    Ok(())
}

fn issue_session(ctx: &AppContext, mut user: User) -> Result<AuthTokens, ApiError> {
    let access_token = ctx.tokens.issue(&user.id, TokenPurpose::Access)?;
    let refresh_token = ctx.tokens.issue(&user.id, TokenPurpose::Refresh)?;

    let expires_at = current_timestamp() + TokenPurpose::Refresh.expiry_secs();
    user.set_refresh_session(refresh_token.clone(), expires_at);
    ctx.store.save(&user)?;

    Ok(AuthTokens {
        access_token,
        refresh_token,
        user,
    })
}

pub(crate) fn find_by_email(ctx: &AppContext, email: &str) -> Result<Option<User>, ApiError> {
    Ok(ctx.store.find_one(&filter! {"email" => email})?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testutil::test_ctx;

    fn input(email: &str) -> RegisterInput {
        RegisterInput {
            first_name: "Sara".into(),
            last_name: "Ahmadi".into(),
            email: email.into(),
            password: "SecurePass1!".into(),
        }
    }

    #[test]
    fn test_register_and_login() {
        let (ctx, _) = test_ctx();
        let user = register(&ctx, input("sara@example.com")).unwrap();
        assert_eq!(user.email, "sara@example.com");

        let tokens = login(&ctx, "Sara@Example.com", "SecurePass1!").unwrap();
        assert_eq!(tokens.user.id, user.id);

        let me = authenticate(&ctx, &tokens.access_token).unwrap();
        assert_eq!(me.id, user.id);
    }

    #[test]
    fn test_register_duplicate_email() {
        let (ctx, _) = test_ctx();
        register(&ctx, input("sara@example.com")).unwrap();
        let result = register(&ctx, input("sara@example.com"));
        assert!(matches!(result, Err(ApiError::Conflict(_))));
    }

    #[test]
    fn test_register_weak_password() {
        let (ctx, _) = test_ctx();
        let mut weak = input("sara@example.com");
        weak.password = "weakpass".into();
        assert!(matches!(
            register(&ctx, weak),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_login_wrong_password() {
        let (ctx, _) = test_ctx();
        register(&ctx, input("sara@example.com")).unwrap();
        assert!(matches!(
            login(&ctx, "sara@example.com", "WrongPass1!"),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_blocked_user_cannot_login() {
        let (ctx, _) = test_ctx();
        let user = register(&ctx, input("sara@example.com")).unwrap();
        ctx.store
            .update::<User, _>(user.id.as_str(), |u| u.is_block = true)
            .unwrap();

        assert!(matches!(
            login(&ctx, "sara@example.com", "SecurePass1!"),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[test]
    fn test_refresh_rotates_session() {
        let (ctx, _) = test_ctx();
        register(&ctx, input("sara@example.com")).unwrap();
        let first = login(&ctx, "sara@example.com", "SecurePass1!").unwrap();

        let second = refresh(&ctx, &first.refresh_token).unwrap();
        assert!(authenticate(&ctx, &second.access_token).is_ok());
    }

    #[test]
    fn test_access_token_cannot_refresh() {
        let (ctx, _) = test_ctx();
        register(&ctx, input("sara@example.com")).unwrap();
        let tokens = login(&ctx, "sara@example.com", "SecurePass1!").unwrap();

        assert!(matches!(
            refresh(&ctx, &tokens.access_token),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_logout_invalidates_refresh() {
        let (ctx, _) = test_ctx();
        register(&ctx, input("sara@example.com")).unwrap();
        let tokens = login(&ctx, "sara@example.com", "SecurePass1!").unwrap();

        logout(&ctx, &tokens.refresh_token).unwrap();
        assert!(refresh(&ctx, &tokens.refresh_token).is_err());
        // Idempotent.
        assert!(logout(&ctx, &tokens.refresh_token).is_ok());
    }

    #[test]
    fn test_full_password_reset_flow() {
        let (ctx, mailer) = test_ctx();
        register(&ctx, input("sara@example.com")).unwrap();

        forgot_password(&ctx, "sara@example.com").unwrap();
        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);

        // The stored code is what was mailed.
        let user = find_by_email(&ctx, "sara@example.com").unwrap().unwrap();
        let code = user.reset_otp.unwrap().code;
        assert!(sent[0].body.contains(&code));

        let reset_token = verify_otp(&ctx, "sara@example.com", &code).unwrap();
        reset_password(&ctx, &reset_token, "NewSecure1!").unwrap();

        assert!(login(&ctx, "sara@example.com", "SecurePass1!").is_err());
        assert!(login(&ctx, "sara@example.com", "NewSecure1!").is_ok());
    }

    #[test]
    fn test_otp_single_use() {
        let (ctx, _) = test_ctx();
        register(&ctx, input("sara@example.com")).unwrap();
        forgot_password(&ctx, "sara@example.com").unwrap();

        let user = find_by_email(&ctx, "sara@example.com").unwrap().unwrap();
        let code = user.reset_otp.unwrap().code;

        verify_otp(&ctx, "sara@example.com", &code).unwrap();
        assert!(matches!(
            verify_otp(&ctx, "sara@example.com", &code),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_wrong_otp_rejected() {
        let (ctx, _) = test_ctx();
        register(&ctx, input("sara@example.com")).unwrap();
        forgot_password(&ctx, "sara@example.com").unwrap();

        assert!(verify_otp(&ctx, "sara@example.com", "000000").is_err() || {
            // One-in-a-million collision with the generated code.
            let user = find_by_email(&ctx, "sara@example.com").unwrap().unwrap();
            user.reset_otp.map(|o| o.code) == Some("000000".to_string())
        });
    }
}
