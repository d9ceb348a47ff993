use thiserror::Error;

#[derive(Error, Debug)]
pub enum VkeError {
    #[error("Unable to allocate {what}")]
    Allocation { what: String },

    #[error("I/O failure on {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Passphrase and confirmation for key {index} do not match")]
    PassphraseMismatch { index: usize },

    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Key {name} has no bytes to combine with")]
    EmptyKey { name: String },

    #[error("Source {name} ended at byte {offset}, expected {expected} bytes")]
    SourceTruncated {
        name: String,
        offset: u64,
        expected: u64,
    },

    #[error("Pass over {name} stalled at byte {offset}")]
    Stalled { name: String, offset: u64 },

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

/// Coarse failure classes reported to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AllocationFailure,
    IoFailure,
    PassphraseMismatch,
    UsageError,
}

impl VkeError {
    /// Wrap an I/O error with the name of the object it happened on
    pub fn io(name: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            name: name.into(),
            source,
        }
    }

    pub fn allocation(what: impl Into<String>) -> Self {
        Self::Allocation { what: what.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Allocation { .. } => ErrorKind::AllocationFailure,
            Self::Io { .. }
            | Self::EmptyKey { .. }
            | Self::SourceTruncated { .. }
            | Self::Stalled { .. } => ErrorKind::IoFailure,
            Self::PassphraseMismatch { .. } => ErrorKind::PassphraseMismatch,
            Self::Usage(_) | Self::UnsupportedAlgorithm(_) => ErrorKind::UsageError,
        }
    }
}

pub type Result<T> = std::result::Result<T, VkeError>;

/// Allocate a zeroed scratch buffer without aborting on allocation failure
///
/// A zero capacity is refused: nothing could ever be streamed through it.
pub fn scratch_buffer(capacity: usize, owner: &str) -> Result<Vec<u8>> {
    if capacity == 0 {
        return Err(VkeError::Usage(format!(
            "scratch buffer for {} must hold at least one byte",
            owner
        )));
    }
    let mut buf = Vec::new();
    buf.try_reserve_exact(capacity)
        .map_err(|_| VkeError::allocation(format!("{} byte buffer for {}", capacity, owner)))?;
    buf.resize(capacity, 0u8);
    Ok(buf)
}
