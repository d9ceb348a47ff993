use crate::config::{KeyPolicy, RunConfig, PROMPT_SENTINEL};
use crate::error::{Result, VkeError};
use crate::key::amplify::{amplify, Amplification};
use crate::key::prompt::PassphrasePrompt;
use crate::key::stream::{CyclicKeyStream, FileKeyStream, MemoryKeyStream};
use log::{debug, info};
use std::ffi::OsStr;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use zeroize::Zeroizing;

/// How a named object is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    ReadWrite,
}

impl AccessMode {
    /// Open `path` as a regular file; directories and other non-files are refused
    pub fn open(self, path: &Path) -> io::Result<File> {
        let file = match self {
            Self::Read => File::open(path)?,
            Self::ReadWrite => OpenOptions::new().read(true).write(true).open(path)?,
        };
        if !file.metadata()?.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            ));
        }
        Ok(file)
    }
}

/// Backing of a resolved key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    File,
    Text,
}

/// Resolved key material for one layer
///
/// Content and length are fixed once resolved.
#[derive(Debug)]
pub struct Key {
    name: String,
    index: usize,
    kind: KeyKind,
    stream: Box<dyn CyclicKeyStream>,
    amplification: Option<Amplification>,
}

impl Key {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    /// Effective key length in bytes
    pub fn len(&self) -> u64 {
        self.stream.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stream.is_empty()
    }

    pub fn is_amplified(&self) -> bool {
        self.amplification.is_some()
    }

    pub fn amplification(&self) -> Option<&Amplification> {
        self.amplification.as_ref()
    }

    pub fn stream_mut(&mut self) -> &mut dyn CyclicKeyStream {
        self.stream.as_mut()
    }

    /// Wipe scratch and derived hashes, close the handle
    pub fn release(mut self) -> Result<()> {
        info!("Finalizing session for key {}", self.name);
        self.amplification = None;
        self.stream.release()
    }
}

/// Resolve one key spec into a cyclic key stream
///
/// The key spec is opened as a file when possible. Otherwise its raw bytes are
/// literal text, or a prompted passphrase when it equals `prompt`. Text
/// shorter than the configured threshold is amplified through hashing.
pub fn resolve_key(
    cfg: &RunConfig,
    spec: impl AsRef<OsStr>,
    index: usize,
    prompt: &mut dyn PassphrasePrompt,
) -> Result<Key> {
    let spec = spec.as_ref();
    let name = spec.to_string_lossy().into_owned();
    info!("Initializing: {} [ {} ]", name, index);

    match AccessMode::Read.open(Path::new(spec)) {
        Ok(file) => {
            let stream = FileKeyStream::new(&name, file, cfg.chunk_size)?;
            debug!("Key {} is file backed ({} bytes)", name, stream.len());
            Ok(Key {
                name,
                index,
                kind: KeyKind::File,
                stream: Box::new(stream),
                amplification: None,
            })
        }
        Err(e) if cfg.key_policy == KeyPolicy::FilesOnly => Err(VkeError::io(name, e)),
        Err(_) => resolve_text(cfg, spec, name, index, prompt),
    }
}

fn resolve_text(
    cfg: &RunConfig,
    spec: &OsStr,
    name: String,
    index: usize,
    prompt: &mut dyn PassphrasePrompt,
) -> Result<Key> {
    let text = if spec == OsStr::new(PROMPT_SENTINEL) {
        read_confirmed_passphrase(&name, index, prompt)?
    } else {
        Zeroizing::new(spec.as_encoded_bytes().to_vec())
    };

    let (bytes, amplification) = if text.len() < cfg.hash_threshold {
        let amp = amplify(&text, cfg.hash);
        debug!(
            "Key {} amplified with {} ({} -> {} bytes)",
            name,
            cfg.hash,
            text.len(),
            amp.len()
        );
        (amp.effective.clone(), Some(amp))
    } else {
        (text, None)
    };

    let stream = MemoryKeyStream::new(&name, bytes, cfg.chunk_size)?;
    Ok(Key {
        name,
        index,
        kind: KeyKind::Text,
        stream: Box::new(stream),
        amplification,
    })
}

fn read_confirmed_passphrase(
    name: &str,
    index: usize,
    prompt: &mut dyn PassphrasePrompt,
) -> Result<Zeroizing<Vec<u8>>> {
    let pass = prompt
        .read_passphrase(&format!("Enter passphrase for key {}: ", index))
        .map_err(|e| VkeError::io(name, e))?;
    let confirm = prompt
        .read_passphrase(&format!("Confirm passphrase for key {}: ", index))
        .map_err(|e| VkeError::io(name, e))?;

    if *pass != *confirm {
        return Err(VkeError::PassphraseMismatch { index });
    }
    Ok(Zeroizing::new(pass.as_bytes().to_vec()))
}
