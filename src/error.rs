//! Error taxonomy for bardle.
//!
//! A `thiserror` enum following the reference pack's convention (wkmp-ap's
//! `error.rs`). Every external call is caught at its boundary and surfaces as a
//! recoverable UI state; nothing here is fatal or retried automatically.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    /// A requested entity (track, catalog entry, …) was not present.
    #[error("not found: {0}")]
    NotFound(String),

    /// An action required an authenticated profile but none was active.
    #[error("not authenticated")]
    Unauthenticated,

    /// A transient I/O failure from the filesystem or environment.
    #[error("i/o error: {0}")]
    TransientIo(#[from] std::io::Error),

    /// Audio playback / decoding failure.
    #[error("playback error: {0}")]
    Playback(String),

    /// Configuration or manifest loading/parsing failure.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience alias for results carrying the crate [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
