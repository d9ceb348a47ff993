//! VKE - Variable Key Encryption
//!
//! Destructively XORs a source file, layer by layer, against a chain of
//! keys. Each key is a file, literal text, or an interactively prompted
//! passphrase. Text keys shorter than a threshold are amplified into
//! `H(text) || H(reverse(text))` so they do not repeat with a tiny period.
//!
//! ## Run protocol
//!
//! ```text
//! Registry → Resolve (per layer) → Verify (every layer) → Combine (per layer) → Finalize
//! ```
//!
//! - **Resolve**: turn a key spec into a [`CyclicKeyStream`](key::CyclicKeyStream)
//! - **Verify**: read-only pass over the source for every key; any failure
//!   stops all combining so the source is never half transformed by a bad key
//! - **Combine**: XOR the source in place (or into a discard sink on dry runs)
//! - **Finalize**: wipe scratch memory, close handles, count failures
//!
//! XOR is self-inverse and commutative, so running the same key set again in
//! any order restores the source.
//!
//! This is not a secure cipher. There is no authentication, no header and
//! no atomic rewrite: a run killed mid-pass leaves the file partially
//! combined, so keep a backup.
//!
//! ## Example
//!
//! ```no_run
//! use vke::{run, LayerRegistry, RunConfig, TerminalPrompt};
//!
//! let cfg = RunConfig::default();
//! let mut layers = LayerRegistry::from_specs(&["notes.txt", "secret.key", "prompt"]).unwrap();
//! let source = layers.split_source().unwrap();
//! let report = run(&cfg, source, &mut layers, &mut TerminalPrompt).unwrap();
//! assert!(report.is_success());
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod finalize;
pub mod key;
pub mod layer;
pub mod session;
pub mod source;

pub use config::{HashAlgorithm, KeyPolicy, RunConfig};
pub use engine::Output;
pub use error::{Result, VkeError};
pub use key::{Key, KeyKind, PassphrasePrompt, ScriptedPrompt, TerminalPrompt};
pub use layer::{Layer, LayerRegistry};
pub use session::{execute, run, RunReport};
pub use source::{open_source, Source};
