use crate::config::{HashAlgorithm, KeyPolicy, RunConfig, DEFAULT_HASH_THRESHOLD};
use crate::error::{Result, VkeError};
use crate::layer::LayerRegistry;
use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Instant;

const ABOUT: &str = "VKE - Variable Key Encryption";

const DESCRIPTION: &str = "\
Simple utility for encrypting source files based on combinations of file
based, parameter, and prompted passphrases.

Typing the word <prompt> will cause the program to prompt you for a
passphrase before encryption and decryption can begin. Multiple prompted
passphrases may be used by specifying <prompt> multiple times.

The same keys must be used to encrypt and decrypt files but the ordering
of the keys has no effect on the result.

This utility performs destructive operations on the source file and may in
extreme circumstances cause data loss. Always have backups handy.";

#[derive(Parser, Debug)]
#[command(name = "vke")]
#[command(about = ABOUT, after_help = DESCRIPTION)]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Display this help information
    #[arg(short = 'h', long = "help")]
    pub help: bool,

    /// Test encryption / decryption without editing the source file
    #[arg(short = 'd', long = "dry_run")]
    pub dry_run: bool,

    /// Suppress progress and timing messages
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Require every key to be an existing file
    #[arg(short = 'f', long = "files_only")]
    pub files_only: bool,

    /// Text keys shorter than this many bytes are amplified by hashing
    #[arg(short = 't', long = "threshold", default_value_t = DEFAULT_HASH_THRESHOLD)]
    pub threshold: usize,

    /// Hash used for amplification (sha3, sha512, blake3)
    #[arg(long, default_value = "sha3", value_parser = parse_hash)]
    pub hash: HashAlgorithm,

    /// Print version
    #[arg(short = 'V', long)]
    pub version: bool,

    /// <source.file> followed by <key.file | key text | 'prompt'> ...
    #[arg(value_name = "ARGS")]
    pub args: Vec<OsString>,
}

fn parse_hash(s: &str) -> std::result::Result<HashAlgorithm, String> {
    s.parse().map_err(|e| format!("{}", e))
}

/// What the binary should do after parsing
#[derive(Debug)]
pub enum Invocation {
    Help,
    Version,
    Run {
        config: RunConfig,
        source: PathBuf,
        layers: LayerRegistry,
    },
}

impl Cli {
    /// Turn parsed flags into a run; the first positional is the source
    pub fn into_invocation(self, start: Instant) -> Result<Invocation> {
        if self.help {
            return Ok(Invocation::Help);
        }
        if self.version {
            return Ok(Invocation::Version);
        }

        let mut layers = LayerRegistry::from_specs(&self.args[..])?;
        let source = layers
            .split_source()
            .map(PathBuf::from)
            .ok_or_else(|| VkeError::Usage("missing <source.file>".into()))?;
        if layers.is_empty() {
            return Err(VkeError::Usage(format!(
                "no keys given for {}",
                source.display()
            )));
        }

        let config = RunConfig {
            dry_run: self.dry_run,
            hash_threshold: self.threshold,
            hash: self.hash,
            key_policy: if self.files_only {
                KeyPolicy::FilesOnly
            } else {
                KeyPolicy::Auto
            },
            start,
            ..Default::default()
        };

        Ok(Invocation::Run {
            config,
            source,
            layers,
        })
    }
}

/// Full help text, as printed for `-h` and usage errors
pub fn help_text() -> String {
    Cli::command().render_help().to_string()
}
