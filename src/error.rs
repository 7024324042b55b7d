//! Error types for the messaging core and its ambient stack.

use crate::api::models::ConversationId;
use thiserror::Error;

/// Failure talking to the remote messaging API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Request never got an answer (DNS, connect, timeout).
    #[error("remote API unreachable: {0}")]
    Unreachable(String),

    /// Remote answered with a non-success status.
    #[error("remote API answered HTTP {0}")]
    Status(u16),

    /// Response body could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Failure refreshing the conversation snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("failed to fetch conversations")]
    Transport(#[from] TransportError),

    #[error("duplicate conversation id {0} in snapshot")]
    DuplicateConversation(ConversationId),

    #[error("conversation {0} has a passenger without a name")]
    BlankCounterparty(ConversationId),
}

/// Message text rejected before any network call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("message text is empty")]
    EmptyText,
}

/// Caller tried to focus a conversation that cannot be focused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("conversation {0} is not in the current snapshot")]
    NotInSnapshot(ConversationId),

    #[error("no conversation is selected")]
    NothingSelected,
}

/// Broadcast authoring transition that is not allowed from the current state.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerError {
    #[error("broadcast composer is closed")]
    Closed,

    #[error("a broadcast is already being sent")]
    AlreadySending,
}

/// Configuration file could not be read or written.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no configuration directory available")]
    NoConfigDir,

    #[error("config IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid base URL {url:?}: {reason}")]
    BaseUrl { url: String, reason: String },

    #[error("no driver id configured")]
    MissingDriver,
}

/// Snapshot cache failure.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("no data directory available")]
    NoDataDir,

    #[error("cache IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("cached conversation JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Main error type for the messaging core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Composer(#[from] ComposerError),
}

/// Result type alias for the messaging core.
pub type Result<T> = std::result::Result<T, Error>;
