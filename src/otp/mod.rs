//! Purpose-scoped single-use codes delivered by email.

mod service;
pub(crate) mod store;
mod template;

pub use service::*;
pub use store::*;
pub use template::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authorization context a code is bound to.
///
/// A code issued for one purpose never validates against another, even for
/// the same subject and digits. Discriminants are stable because they are
/// stored.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum OtpPurpose {
    Login = 0,
    EnableTwoFactor = 1,
    DisableTwoFactor = 2,
    ChangePassword = 3,
    EmailVerification = 4,
}

/// One-time code as saved on database.
///
/// Rows are never deleted; `used` flips to `true` exactly once, either by a
/// consuming validation or by explicit invalidation.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct OneTimeCode {
    pub id: i64,
    pub subject_id: i64,
    /// Six digits, zero-padded, compared as text.
    pub code: String,
    pub purpose: OtpPurpose,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
}

impl OneTimeCode {
    /// Expiry is a time-derived predicate, not a stored state.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.used && self.expires_at >= now
    }
}
