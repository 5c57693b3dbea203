//! Two-factor authentication core for the VzOverFlow community platform.
//!
//! Authenticator-app TOTP codes and purpose-scoped one-time codes
//! delivered by email, behind a single orchestrator the login and
//! settings flows talk to. Routing, page rendering and the rest of the
//! platform live elsewhere; this crate owns the codec, the code
//! derivation and the single-use state machine.

#![forbid(unsafe_code)]

pub mod base32;
pub mod clock;
pub mod config;
pub mod database;
pub mod error;
pub mod mail;
pub mod otp;
pub mod secret;
pub mod totp;
pub mod two_factor;

pub use clock::{Clock, SystemClock};
pub use error::{Result, ServerError};
pub use mail::{MailManager, Mailer};
pub use otp::{
    OneTimeCode, OneTimeCodeService, OneTimeCodeStore, OtpPurpose,
    PgOneTimeCodeStore,
};
pub use secret::SharedSecret;
pub use two_factor::{AuthenticatorSetup, Enrollment, Subject, TwoFactor};
