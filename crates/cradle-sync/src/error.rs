//! Error types for Cradle Sync
//!
//! Provides error handling for:
//! - Initial record reads
//! - Backend writes of optimistic edits
//! - Change feed subscriptions and disconnects
//! - Feed lifecycle violations
//! - Configuration loading

use crate::state::FeedState;
use crate::types::EntityId;
use cradle_record::{PatchError, RecordError};
use std::path::PathBuf;

/// Main sync error type
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Edit could not be turned into a patch
    #[error("invalid edit: {0}")]
    Patch(#[from] PatchError),

    /// Initial read failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Backend write failed
    #[error("write failed: {0}")]
    Write(#[from] WriteError),

    /// Change feed failed
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),

    /// Feed lifecycle violation
    #[error("illegal feed transition: {from:?} -> {to:?}")]
    IllegalTransition { from: FeedState, to: FeedState },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Edit made outside a tokio runtime; the write could not be started
    #[error("no async runtime to send the write")]
    NoRuntime,
}

impl SyncError {
    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Write(e) => e.is_retryable(),
            Self::Feed(e) => e.is_retryable(),
            Self::Store(StoreError::Unavailable(_)) => true,
            _ => false,
        }
    }
}

/// Read errors from the persistence collaborator
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No row with this id
    #[error("profile not found: {0}")]
    NotFound(EntityId),

    /// Backend unreachable or erroring
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Row was not a usable record
    #[error("malformed record: {0}")]
    Malformed(#[from] RecordError),
}

/// Write errors from the persistence collaborator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WriteError {
    /// Backend refused the update (permissions, constraint)
    #[error("update rejected: {0}")]
    Rejected(String),

    /// Backend unreachable
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Write task ended before reporting
    #[error("write cancelled")]
    Cancelled,
}

impl WriteError {
    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Change feed errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    /// Subscription could not be opened
    #[error("subscription failed: {0}")]
    SubscribeFailed(String),

    /// Open subscription dropped
    #[error("feed disconnected: {0}")]
    Disconnected(String),

    /// Notification could not be decoded into a record
    #[error("malformed change event: {0}")]
    Malformed(String),
}

impl FeedError {
    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Malformed(_))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file unreadable
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML did not match the config schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be rendered
    #[error("cannot render config: {0}")]
    Render(#[from] toml::ser::Error),

    /// Values parse but make no sense together
    #[error("invalid config value: {0}")]
    Invalid(String),
}
