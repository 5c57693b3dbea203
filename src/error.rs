//! Error handler for the two-factor core.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

/// Enum representing server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Uniform rejection. Callers must not tell the subject whether the
    /// code was wrong, already used or expired.
    #[error("invalid or expired code")]
    InvalidCode,

    /// Issuance cannot proceed without a verified delivery address.
    #[error("subject has no verified email address")]
    MissingDeliveryAddress,

    /// Mail dispatch failed after the code row was persisted.
    #[error("mail dispatch failed: {0}")]
    Transport(String),

    #[error("SQL request failed: {0}")]
    Sql(#[from] sqlx::Error),

    #[error(transparent)]
    Amqp(#[from] lapin::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error("invalid AMQP scheme")]
    InvalidScheme,

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}
