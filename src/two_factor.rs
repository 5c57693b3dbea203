//! Route verification to the second factor a subject has enabled.
//!
//! The orchestrator implements no cryptography or storage of its own: it
//! selects the engine (TOTP against the stored secret, or an emailed
//! one-time code) and hands over the subject's secret or delivery address.

use std::sync::Arc;

use crate::clock::Clock;
use crate::error::{Result, ServerError};
use crate::otp::{OneTimeCodeService, OtpPurpose};
use crate::secret::{self, SharedSecret};
use crate::totp;

/// Second factor in force for a subject.
#[derive(Debug, Clone)]
pub enum Enrollment {
    /// Codes come from an authenticator app seeded with the stored secret
    /// (canonical Base32 text form).
    AuthenticatorApp { secret: Option<String> },
    /// Codes are issued on demand and delivered to the verified address.
    Email,
}

/// Everything the orchestrator needs to know about a subject.
#[derive(Debug, Clone)]
pub struct Subject {
    pub id: i64,
    pub email: Option<String>,
    pub enrollment: Enrollment,
}

/// Handed back to the caller at the start of authenticator setup.
///
/// The caller stores the pending secret; two-factor is not enabled until
/// [`TwoFactor::confirm_authenticator_setup`] succeeds.
#[derive(Debug)]
pub struct AuthenticatorSetup {
    pub secret: SharedSecret,
    /// `otpauth://` URI to render as a QR image.
    pub provisioning_uri: String,
    /// Secret in 4-symbol groups for typing the key by hand.
    pub manual_entry: String,
}

/// Two-factor coordination layer invoked by login and settings flows.
pub struct TwoFactor {
    issuer: String,
    codes: OneTimeCodeService,
    clock: Arc<dyn Clock>,
}

impl TwoFactor {
    /// Create a new [`TwoFactor`].
    pub fn new(
        issuer: impl Into<String>,
        codes: OneTimeCodeService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            codes,
            clock,
        }
    }

    /// Start authenticator enrollment for an account.
    pub fn begin_authenticator_setup(&self, account: &str) -> AuthenticatorSetup {
        let secret = SharedSecret::generate();
        AuthenticatorSetup {
            provisioning_uri: secret::provisioning_uri(
                &self.issuer,
                account,
                &secret,
            ),
            manual_entry: secret::manual_entry_format(&secret),
            secret,
        }
    }

    /// Prove the app was seeded before the caller flips two-factor on.
    ///
    /// Only a success here may enable the authenticator method; a subject
    /// with an unset secret must never be marked enabled, since an absent
    /// secret rejects every code.
    pub fn confirm_authenticator_setup(
        &self,
        pending_secret: &SharedSecret,
        submitted: &str,
    ) -> Result<()> {
        if totp::validate(
            pending_secret.as_bytes(),
            submitted,
            self.clock.now(),
        ) {
            Ok(())
        } else {
            Err(ServerError::InvalidCode)
        }
    }

    /// Ask for a challenge ahead of a sensitive action.
    ///
    /// Email enrollment dispatches a fresh code and returns it; for the
    /// authenticator method nothing is sent (`None`), the subject reads
    /// their app.
    pub async fn challenge(
        &self,
        subject: &Subject,
        purpose: OtpPurpose,
    ) -> Result<Option<String>> {
        match &subject.enrollment {
            Enrollment::AuthenticatorApp { .. } => Ok(None),
            Enrollment::Email => self
                .request_email_code(subject, purpose)
                .await
                .map(Some),
        }
    }

    /// Issue a transient emailed code regardless of standing enrollment,
    /// e.g. the change-password confirmation.
    pub async fn request_email_code(
        &self,
        subject: &Subject,
        purpose: OtpPurpose,
    ) -> Result<String> {
        self.codes
            .issue(subject.id, subject.email.as_deref(), purpose)
            .await
    }

    /// Verify a submitted code against the subject's second factor.
    ///
    /// Failure is uniform [`ServerError::InvalidCode`] whatever the cause;
    /// emailed codes are consumed on success.
    pub async fn verify(
        &self,
        subject: &Subject,
        purpose: OtpPurpose,
        submitted: &str,
    ) -> Result<()> {
        let valid = match &subject.enrollment {
            Enrollment::AuthenticatorApp { secret } => match secret {
                Some(stored) => totp::validate(
                    SharedSecret::from_base32(stored).as_bytes(),
                    submitted,
                    self.clock.now(),
                ),
                None => false,
            },
            Enrollment::Email => {
                self.codes.validate(subject.id, purpose, submitted).await?
            },
        };

        if valid { Ok(()) } else { Err(ServerError::InvalidCode) }
    }

    /// Tear-down after a verified disable: the caller clears the stored
    /// secret, and no stale code survives the downgrade.
    pub async fn invalidate_outstanding(
        &self,
        subject_id: i64,
        purpose: OtpPurpose,
    ) -> Result<()> {
        self.codes.invalidate_outstanding(subject_id, purpose).await
    }
}
