//! Issue, validate and invalidate one-time codes.

use std::sync::Arc;

use chrono::Duration;
use rand::Rng;
use rand::rngs::OsRng;

use crate::clock::Clock;
use crate::error::{Result, ServerError};
use crate::mail::Mailer;
use crate::otp::{OneTimeCodeStore, OtpPurpose, template};

/// Codes expire this long after issuance.
pub const CODE_TTL_MINUTES: i64 = 5;
const CODE_SPACE: u32 = 1_000_000;

/// One-time code manager.
pub struct OneTimeCodeService {
    issuer: String,
    store: Arc<dyn OneTimeCodeStore>,
    mailer: Arc<dyn Mailer>,
    clock: Arc<dyn Clock>,
}

impl OneTimeCodeService {
    /// Create a new [`OneTimeCodeService`].
    pub fn new(
        issuer: impl Into<String>,
        store: Arc<dyn OneTimeCodeStore>,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            store,
            mailer,
            clock,
        }
    }

    /// Generate, persist and dispatch a fresh code for the purpose.
    ///
    /// The mail send happens after the row is committed and outside any
    /// store lock. When the send fails the row is burned before the error
    /// propagates, so a code the subject never received cannot be guessed
    /// later.
    pub async fn issue(
        &self,
        subject_id: i64,
        email: Option<&str>,
        purpose: OtpPurpose,
    ) -> Result<String> {
        let Some(email) = email.filter(|address| !address.trim().is_empty())
        else {
            return Err(ServerError::MissingDeliveryAddress);
        };

        let code = generate_code();
        let expires_at =
            self.clock.now() + Duration::minutes(CODE_TTL_MINUTES);
        let id = self
            .store
            .insert(subject_id, &code, purpose, expires_at)
            .await?;

        tracing::debug!(subject_id, ?purpose, "one-time code issued");

        let mail = template::render(&self.issuer, purpose, &code);
        if let Err(err) =
            self.mailer.send(email, &mail.subject, &mail.html_body).await
        {
            tracing::warn!(subject_id, ?purpose, "code dispatch failed");
            self.store.mark_used(id).await?;
            return Err(err);
        }

        Ok(code)
    }

    /// Consuming validation: a matching code is burned.
    ///
    /// Concurrent duplicate submissions race on the `used` flag; the store
    /// compare-and-set guarantees exactly one of them observes `true`.
    pub async fn validate(
        &self,
        subject_id: i64,
        purpose: OtpPurpose,
        submitted: &str,
    ) -> Result<bool> {
        self.validate_inner(subject_id, purpose, submitted, true).await
    }

    /// Check a code without consuming it.
    pub async fn validate_keep(
        &self,
        subject_id: i64,
        purpose: OtpPurpose,
        submitted: &str,
    ) -> Result<bool> {
        self.validate_inner(subject_id, purpose, submitted, false).await
    }

    async fn validate_inner(
        &self,
        subject_id: i64,
        purpose: OtpPurpose,
        submitted: &str,
        consume: bool,
    ) -> Result<bool> {
        let Some(row) = self
            .store
            .find_latest_live(subject_id, purpose, self.clock.now())
            .await?
        else {
            return Ok(false);
        };

        // Exact text equality keeps leading zeros significant.
        if row.code != submitted {
            return Ok(false);
        }

        if consume {
            return self.store.mark_used(row.id).await;
        }

        Ok(true)
    }

    /// Burn every outstanding code for the pair, so a stale earlier code
    /// cannot be replayed once a newer one exists.
    pub async fn invalidate_outstanding(
        &self,
        subject_id: i64,
        purpose: OtpPurpose,
    ) -> Result<()> {
        tracing::debug!(subject_id, ?purpose, "outstanding codes invalidated");
        self.store.mark_all_used(subject_id, purpose).await
    }
}

/// Uniform draw from `[0, 10^6)`, zero-padded. Codes stay text from here
/// on; an integer round trip would lose leading zeros.
fn generate_code() -> String {
    let value = OsRng.gen_range(0..CODE_SPACE);
    format!("{value:06}")
}
