//! OtpService - Orchestrates the one-time code flows.
//!
//! Composes the OTP store, the user directory, the mailer and the real-time
//! notifier. Issuance persists first; delivery comes after, so a code that
//! was stored but could not be pushed is still verifiable. Push failures
//! never surface (the notifier is infallible by contract); mail failures do,
//! since without the email the user never sees the code.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, Platform, Timestamp, UserId};
use crate::domain::otp::{
    OneTimeCode, OtpCode, OtpPurpose, REGISTRATION_TTL_MINUTES, STANDARD_TTL_MINUTES,
};
use crate::ports::{Mailer, Notification, Notifier, OtpStore, UserDirectory};

/// Orchestrator for issuing, verifying and resending one-time codes.
pub struct OtpService {
    store: Arc<dyn OtpStore>,
    users: Arc<dyn UserDirectory>,
    mailer: Arc<dyn Mailer>,
    notifier: Arc<dyn Notifier>,
}

impl OtpService {
    pub fn new(
        store: Arc<dyn OtpStore>,
        users: Arc<dyn UserDirectory>,
        mailer: Arc<dyn Mailer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            users,
            mailer,
            notifier,
        }
    }

    /// Issues an email-verification code and delivers it.
    ///
    /// Fails for unknown emails and for emails that are already verified.
    pub async fn request_email_verification(
        &self,
        email: &str,
        platform: Platform,
    ) -> Result<(), DomainError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(DomainError::user_not_found)?;

        if user.is_email_verified {
            return Err(DomainError::new(
                ErrorCode::EmailAlreadyVerified,
                "Email is already verified",
            ));
        }

        let otp = self
            .issue(email, OtpPurpose::EmailVerification, user.id.clone(), platform)
            .await?;

        self.mailer
            .send_verification_code(email, otp.code().as_str())
            .await?;

        self.push_code_notification(
            &user.id,
            "Email Verification",
            format!("Your email verification code is: {}", otp.code()),
            OtpPurpose::EmailVerification,
            email,
            platform,
        )
        .await;

        Ok(())
    }

    /// Issues a password-reset code and delivers it.
    ///
    /// Mobile clients get the code by email plus a push; web clients get a
    /// reset link by email (the code doubles as the link token).
    pub async fn request_password_reset(
        &self,
        email: &str,
        platform: Platform,
    ) -> Result<(), DomainError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(DomainError::user_not_found)?;

        let otp = self
            .issue(email, OtpPurpose::PasswordReset, user.id.clone(), platform)
            .await?;

        match platform {
            Platform::Mobile => {
                self.mailer
                    .send_password_reset_code(email, otp.code().as_str())
                    .await?;

                self.push_code_notification(
                    &user.id,
                    "Password Reset",
                    format!("Your password reset code is: {}", otp.code()),
                    OtpPurpose::PasswordReset,
                    email,
                    Platform::Mobile,
                )
                .await;
            }
            Platform::Web => {
                self.mailer
                    .send_password_reset_link(email, otp.code().as_str())
                    .await?;
            }
        }

        Ok(())
    }

    /// Verifies a code. Single-use: success consumes the row.
    ///
    /// Any mismatch - unknown email, wrong code, wrong purpose, expired or
    /// already-used row, even a malformed code string - reports the same
    /// generic invalid-or-expired condition.
    pub async fn verify(
        &self,
        email: &str,
        code: &str,
        purpose: OtpPurpose,
    ) -> Result<(), DomainError> {
        let code = OtpCode::new(code).map_err(|_| DomainError::invalid_or_expired_code())?;

        let consumed = self
            .store
            .consume(email, &code, purpose, Timestamp::now())
            .await?;

        match consumed {
            Some(_) => {
                tracing::info!(email = %email, purpose = %purpose, "One-time code verified");
                Ok(())
            }
            None => Err(DomainError::invalid_or_expired_code()),
        }
    }

    /// Verifies an email-verification code and marks the account verified.
    pub async fn verify_email(&self, email: &str, code: &str) -> Result<(), DomainError> {
        self.verify(email, code, OtpPurpose::EmailVerification).await?;
        self.users.mark_email_verified(email).await?;
        Ok(())
    }

    /// Re-issues a code, superseding whatever was active, and redelivers it.
    pub async fn resend(
        &self,
        email: &str,
        purpose: OtpPurpose,
        platform: Platform,
    ) -> Result<(), DomainError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(DomainError::user_not_found)?;

        let otp = self.issue(email, purpose, user.id.clone(), platform).await?;

        match purpose {
            OtpPurpose::EmailVerification => {
                self.mailer
                    .send_verification_code(email, otp.code().as_str())
                    .await?;

                self.push_code_notification(
                    &user.id,
                    "Email Verification",
                    format!("Your new email verification code is: {}", otp.code()),
                    OtpPurpose::EmailVerification,
                    email,
                    platform,
                )
                .await;
            }
            OtpPurpose::PasswordReset if platform == Platform::Mobile => {
                self.mailer
                    .send_password_reset_code(email, otp.code().as_str())
                    .await?;

                self.push_code_notification(
                    &user.id,
                    "Password Reset",
                    format!("Your new password reset code is: {}", otp.code()),
                    OtpPurpose::PasswordReset,
                    email,
                    Platform::Mobile,
                )
                .await;
            }
            OtpPurpose::PasswordReset => {
                self.mailer
                    .send_password_reset_link(email, otp.code().as_str())
                    .await?;
            }
        }

        Ok(())
    }

    /// Issues the registration-flow verification code (shorter expiry) and
    /// emails it. Used by the registration orchestrator right after account
    /// creation, when the user cannot be connected yet, so there is no push.
    pub async fn issue_registration_code(
        &self,
        email: &str,
        user_id: UserId,
        platform: Platform,
    ) -> Result<(), DomainError> {
        let otp = OneTimeCode::issue(
            email,
            OtpPurpose::EmailVerification,
            user_id,
            platform,
            REGISTRATION_TTL_MINUTES,
        );
        self.store.supersede_and_insert(&otp).await?;

        self.mailer
            .send_verification_code(email, otp.code().as_str())
            .await?;

        Ok(())
    }

    /// Persists a fresh standard-expiry code, superseding prior active ones.
    async fn issue(
        &self,
        email: &str,
        purpose: OtpPurpose,
        user_id: UserId,
        platform: Platform,
    ) -> Result<OneTimeCode, DomainError> {
        let otp = OneTimeCode::issue(email, purpose, user_id, platform, STANDARD_TTL_MINUTES);
        self.store.supersede_and_insert(&otp).await?;
        tracing::info!(email = %email, purpose = %purpose, "One-time code issued");
        Ok(otp)
    }

    /// Best-effort push of the code to the user's live connection.
    async fn push_code_notification(
        &self,
        user_id: &UserId,
        title: &str,
        message: String,
        purpose: OtpPurpose,
        email: &str,
        platform: Platform,
    ) {
        let notification = Notification::new(title, message)
            .with_kind(purpose.as_str())
            .for_platform(platform)
            .with_data(serde_json::json!({ "email": email }));
        self.notifier.notify(user_id, notification).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::email::{MockMailer, SentMail};
    use crate::adapters::memory::{InMemoryOtpStore, InMemoryUserDirectory};
    use crate::domain::foundation::Role;
    use crate::ports::{BroadcastEvent, UserRecord};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Mutex;

    /// Recording notifier; delivery itself is covered by the router tests.
    #[derive(Default)]
    struct RecordingNotifier {
        notifications: Mutex<Vec<(UserId, Notification)>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, user_id: &UserId, notification: Notification) {
            self.notifications
                .lock()
                .unwrap()
                .push((user_id.clone(), notification));
        }

        async fn broadcast(&self, _: BroadcastEvent, _: Value, _: Option<Platform>) {}
    }

    struct Fixture {
        store: Arc<InMemoryOtpStore>,
        users: Arc<InMemoryUserDirectory>,
        mailer: MockMailer,
        notifier: Arc<RecordingNotifier>,
        service: OtpService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryOtpStore::new());
        let users = Arc::new(InMemoryUserDirectory::new());
        let mailer = MockMailer::new();
        let notifier = Arc::new(RecordingNotifier::default());
        let service = OtpService::new(
            Arc::clone(&store) as Arc<dyn OtpStore>,
            Arc::clone(&users) as Arc<dyn UserDirectory>,
            Arc::new(mailer.clone()),
            Arc::clone(&notifier) as Arc<dyn Notifier>,
        );
        Fixture {
            store,
            users,
            mailer,
            notifier,
            service,
        }
    }

    fn seed_user(fixture: &Fixture, email: &str, verified: bool) -> UserId {
        let id = UserId::new(format!("id-{}", email)).unwrap();
        fixture.users.seed(UserRecord {
            id: id.clone(),
            email: email.to_string(),
            role: Role::User,
            is_email_verified: verified,
        });
        id
    }

    fn mailed_code(fixture: &Fixture) -> String {
        match fixture.mailer.sent().last().unwrap() {
            SentMail::VerificationCode { code, .. } => code.clone(),
            SentMail::PasswordResetCode { code, .. } => code.clone(),
            SentMail::PasswordResetLink { token, .. } => token.clone(),
            other => panic!("unexpected mail: {:?}", other),
        }
    }

    #[tokio::test]
    async fn request_verification_issues_mails_and_pushes() {
        let fixture = fixture();
        let user_id = seed_user(&fixture, "a@x.com", false);

        fixture
            .service
            .request_email_verification("a@x.com", Platform::Mobile)
            .await
            .unwrap();

        // Stored and active.
        assert_eq!(
            fixture
                .store
                .count_active("a@x.com", OtpPurpose::EmailVerification, Timestamp::now())
                .await
                .unwrap(),
            1
        );

        // Mailed.
        assert!(matches!(
            fixture.mailer.sent().as_slice(),
            [SentMail::VerificationCode { to, .. }] if to == "a@x.com"
        ));

        // Pushed with the declared platform as filter.
        let pushed = fixture.notifier.notifications.lock().unwrap();
        assert_eq!(pushed.len(), 1);
        assert_eq!(pushed[0].0, user_id);
        assert_eq!(pushed[0].1.platform_filter, Some(Platform::Mobile));
        assert_eq!(pushed[0].1.kind.as_deref(), Some("EMAIL_VERIFICATION"));
    }

    #[tokio::test]
    async fn request_verification_rejects_unknown_email() {
        let fixture = fixture();
        let err = fixture
            .service
            .request_email_verification("ghost@x.com", Platform::Web)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::UserNotFound);
    }

    #[tokio::test]
    async fn request_verification_rejects_already_verified() {
        let fixture = fixture();
        seed_user(&fixture, "a@x.com", true);

        let err = fixture
            .service
            .request_email_verification("a@x.com", Platform::Web)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::EmailAlreadyVerified);
    }

    #[tokio::test]
    async fn web_password_reset_sends_link_and_no_push() {
        let fixture = fixture();
        seed_user(&fixture, "a@x.com", true);

        fixture
            .service
            .request_password_reset("a@x.com", Platform::Web)
            .await
            .unwrap();

        assert!(matches!(
            fixture.mailer.sent().as_slice(),
            [SentMail::PasswordResetLink { .. }]
        ));
        assert!(fixture.notifier.notifications.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn mobile_password_reset_sends_code_and_push() {
        let fixture = fixture();
        seed_user(&fixture, "a@x.com", true);

        fixture
            .service
            .request_password_reset("a@x.com", Platform::Mobile)
            .await
            .unwrap();

        assert!(matches!(
            fixture.mailer.sent().as_slice(),
            [SentMail::PasswordResetCode { .. }]
        ));
        let pushed = fixture.notifier.notifications.lock().unwrap();
        assert_eq!(pushed[0].1.platform_filter, Some(Platform::Mobile));
    }

    #[tokio::test]
    async fn verify_consumes_the_code_once() {
        let fixture = fixture();
        seed_user(&fixture, "a@x.com", true);
        fixture
            .service
            .request_password_reset("a@x.com", Platform::Mobile)
            .await
            .unwrap();
        let code = mailed_code(&fixture);

        fixture
            .service
            .verify("a@x.com", &code, OtpPurpose::PasswordReset)
            .await
            .unwrap();

        // Second verification with the same code must fail.
        let err = fixture
            .service
            .verify("a@x.com", &code, OtpPurpose::PasswordReset)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidOrExpiredCode);
    }

    #[tokio::test]
    async fn verify_rejects_wrong_purpose_with_generic_error() {
        let fixture = fixture();
        seed_user(&fixture, "a@x.com", false);
        fixture
            .service
            .request_email_verification("a@x.com", Platform::Web)
            .await
            .unwrap();
        let code = mailed_code(&fixture);

        let err = fixture
            .service
            .verify("a@x.com", &code, OtpPurpose::PasswordReset)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidOrExpiredCode);
        assert_eq!(err.message(), "Invalid or expired code");
    }

    #[tokio::test]
    async fn verify_rejects_malformed_code_with_generic_error() {
        let fixture = fixture();
        let err = fixture
            .service
            .verify("a@x.com", "not-a-code", OtpPurpose::PasswordReset)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidOrExpiredCode);
    }

    #[tokio::test]
    async fn reissue_supersedes_previous_code() {
        let fixture = fixture();
        seed_user(&fixture, "a@x.com", false);

        fixture
            .service
            .request_email_verification("a@x.com", Platform::Web)
            .await
            .unwrap();
        let first_code = mailed_code(&fixture);

        fixture
            .service
            .resend("a@x.com", OtpPurpose::EmailVerification, Platform::Web)
            .await
            .unwrap();
        let second_code = mailed_code(&fixture);

        // Only one active row remains.
        assert_eq!(
            fixture
                .store
                .count_active("a@x.com", OtpPurpose::EmailVerification, Timestamp::now())
                .await
                .unwrap(),
            1
        );

        // The superseded code no longer verifies (unless the RNG repeated it).
        if first_code != second_code {
            assert!(fixture
                .service
                .verify("a@x.com", &first_code, OtpPurpose::EmailVerification)
                .await
                .is_err());
        }
        fixture
            .service
            .verify("a@x.com", &second_code, OtpPurpose::EmailVerification)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn verify_email_marks_account_verified() {
        let fixture = fixture();
        seed_user(&fixture, "a@x.com", false);
        fixture
            .service
            .request_email_verification("a@x.com", Platform::Web)
            .await
            .unwrap();
        let code = mailed_code(&fixture);

        fixture.service.verify_email("a@x.com", &code).await.unwrap();

        let user = fixture.users.find_by_email("a@x.com").await.unwrap().unwrap();
        assert!(user.is_email_verified);
    }

    #[tokio::test]
    async fn mail_failure_surfaces_but_code_is_stored() {
        let store = Arc::new(InMemoryOtpStore::new());
        let users = Arc::new(InMemoryUserDirectory::new());
        let service = OtpService::new(
            Arc::clone(&store) as Arc<dyn OtpStore>,
            Arc::clone(&users) as Arc<dyn UserDirectory>,
            Arc::new(MockMailer::new().failing()),
            Arc::new(RecordingNotifier::default()),
        );
        users.seed(UserRecord {
            id: UserId::new("id-1").unwrap(),
            email: "a@x.com".to_string(),
            role: Role::User,
            is_email_verified: false,
        });

        let err = service
            .request_email_verification("a@x.com", Platform::Web)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::EmailDeliveryError);

        // Issuance happened before delivery; the code is persisted.
        assert_eq!(
            store
                .count_active("a@x.com", OtpPurpose::EmailVerification, Timestamp::now())
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn registration_code_uses_short_expiry() {
        let fixture = fixture();
        let user_id = seed_user(&fixture, "a@x.com", false);

        fixture
            .service
            .issue_registration_code("a@x.com", user_id, Platform::Mobile)
            .await
            .unwrap();

        let rows = fixture.store.rows();
        assert_eq!(rows.len(), 1);
        let at_twelve_minutes = rows[0].created_at().plus_minutes(12);
        assert!(rows[0].is_expired(&at_twelve_minutes));

        // No push for registration issuance.
        assert!(fixture.notifier.notifications.lock().unwrap().is_empty());
    }
}
