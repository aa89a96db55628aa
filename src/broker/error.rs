//! Error definitions for the broker module.

use thiserror::Error;

/// Failure modes of session setup and command composition.
///
/// Transport failures are absent on purpose: they are contained inside the
/// session task and converted into connection-state transitions, never
/// propagated as errors.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// Broker settings cannot produce a connection URL.
    #[error("broker host must not be empty")]
    EmptyHost,

    /// Reading or writing the broker settings file failed.
    #[error("broker settings I/O failed: {0}")]
    SettingsIo(#[from] std::io::Error),

    /// The broker settings file exists but does not parse.
    #[error("broker settings are corrupt: {0}")]
    SettingsCorrupt(#[from] toml::de::Error),

    /// Serializing broker settings for persistence failed.
    #[error("failed to serialize broker settings: {0}")]
    SettingsSerialize(#[from] toml::ser::Error),

    /// Serializing a command payload failed.
    #[error("failed to serialize command payload: {0}")]
    Payload(#[from] serde_json::Error),
}
