use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A mutation was rejected before it touched the log.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("magnitude {value} is outside {min}..={max}")]
    MagnitudeOutOfRange { value: u32, min: u32, max: u32 },

    #[error("relationship coefficient {value} is outside {min}..={max}")]
    CoefficientOutOfRange { value: f64, min: f64, max: f64 },

    #[error("event description must not be empty")]
    EmptyDescription,

    #[error("friend name must not be empty")]
    EmptyName,

    #[error("events and friends cannot share the slot key '{0}'")]
    SharedSlotKey(String),
}

/// A key-value backend failed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on slot '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("{}: another ledger holds the lock", .path.display())]
    Locked { path: PathBuf },

    #[error("invalid slot key '{0}'")]
    InvalidKey(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Loading or saving a slot failed.
///
/// The ledger never returns these from a mutation. It logs them and keeps
/// the latest in [`Ledger::last_persist_error`](crate::Ledger::last_persist_error).
#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("slot '{key}' holds malformed data: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode slot '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
