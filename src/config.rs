use crate::error::{Result, VkeError};
use std::time::{Duration, Instant};

/// Chunk size for all streaming I/O (100 KiB)
pub const CHUNK_SIZE: usize = 102_400;

/// Text keys shorter than this many bytes are amplified through hashing
pub const DEFAULT_HASH_THRESHOLD: usize = 200;

/// Key spec that requests an interactive passphrase
pub const PROMPT_SENTINEL: &str = "prompt";

/// Hash used to amplify short text keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    /// SHA3-512
    #[default]
    Sha3,
    /// SHA-512
    Sha512,
    /// BLAKE3 with 64 bytes of XOF output
    Blake3,
}

impl std::str::FromStr for HashAlgorithm {
    type Err = VkeError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sha3" | "sha3-512" => Ok(Self::Sha3),
            "sha512" | "sha2" | "sha-512" => Ok(Self::Sha512),
            "blake3" => Ok(Self::Blake3),
            _ => Err(VkeError::UnsupportedAlgorithm(format!("hash: {}", s))),
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Sha3 => "sha3",
            Self::Sha512 => "sha512",
            Self::Blake3 => "blake3",
        };
        f.write_str(name)
    }
}

/// How key specs that do not open as files are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyPolicy {
    /// Fall back to literal text (or the prompt sentinel)
    #[default]
    Auto,
    /// Every key must be an openable file
    FilesOnly,
}

/// Settings for one run, handed explicitly to every component
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub dry_run: bool,
    pub hash_threshold: usize,
    pub chunk_size: usize,
    pub hash: HashAlgorithm,
    pub key_policy: KeyPolicy,
    pub start: Instant,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            hash_threshold: DEFAULT_HASH_THRESHOLD,
            chunk_size: CHUNK_SIZE,
            hash: HashAlgorithm::default(),
            key_policy: KeyPolicy::default(),
            start: Instant::now(),
        }
    }
}

impl RunConfig {
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Reject settings the engine cannot stream with
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(VkeError::Usage("chunk size must be at least one byte".into()));
        }
        Ok(())
    }
}
