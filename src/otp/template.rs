//! Per-purpose mail subject and body rendering.
//!
//! A pure lookup from purpose to `(subject line, HTML body)`; registration
//! and sign-in get dedicated bodies, the remaining purposes share a generic
//! one.

use crate::otp::{CODE_TTL_MINUTES, OtpPurpose};

/// Rendered message handed to the mailer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMail {
    pub subject: String,
    pub html_body: String,
}

/// Build the message carrying `code` for the purpose.
pub fn render(issuer: &str, purpose: OtpPurpose, code: &str) -> RenderedMail {
    let subject = match purpose {
        OtpPurpose::Login => format!("[{issuer}] Sign-in verification code"),
        OtpPurpose::EnableTwoFactor => {
            format!("[{issuer}] Two-factor activation code")
        },
        OtpPurpose::DisableTwoFactor => {
            format!("[{issuer}] Two-factor deactivation code")
        },
        OtpPurpose::ChangePassword => {
            format!("[{issuer}] Password change confirmation code")
        },
        OtpPurpose::EmailVerification => {
            format!("[{issuer}] Verify your email address")
        },
    };

    let html_body = match purpose {
        OtpPurpose::EmailVerification => format!(
            "<h2>Welcome to {issuer}!</h2>\
             <p>Thanks for signing up. To finish creating your account, \
             enter this code:</p>\
             <div style='background-color:#f0f9ff;border-left:4px solid #3b82f6;padding:15px;margin:20px 0;'>\
             <p style='font-size:24px;font-weight:bold;margin:0;color:#1e40af;'>{code}</p>\
             </div>\
             <p>The code expires in <strong>{CODE_TTL_MINUTES} minutes</strong>.</p>\
             <p>If you did not create this account, you can ignore this email.</p>"
        ),
        OtpPurpose::Login => format!(
            "<h2>{issuer} sign-in verification</h2>\
             <p>We received a request to sign in to your account. To \
             continue, enter this code:</p>\
             <div style='background-color:#f0fdf4;border-left:4px solid #10b981;padding:15px;margin:20px 0;'>\
             <p style='font-size:28px;font-weight:bold;margin:0;color:#047857;letter-spacing:4px;'>{code}</p>\
             </div>\
             <p>The code expires in <strong>{CODE_TTL_MINUTES} minutes</strong>.</p>\
             <p style='color:#dc2626;'><strong>Warning:</strong> if this \
             sign-in was not you, ignore this email and consider changing \
             your password. Never share this code with anyone.</p>"
        ),
        _ => format!(
            "<p>Your verification code is: <strong>{code}</strong></p>\
             <p>The code expires in {CODE_TTL_MINUTES} minutes.</p>\
             <p>If you did not request it, you can ignore this email.</p>"
        ),
    };

    RenderedMail { subject, html_body }
}
