use crate::config::RunConfig;
use crate::engine::{combine_layer, verify_layer, Output};
use crate::error::Result;
use crate::finalize::finalize;
use crate::key::{resolve_key, PassphrasePrompt};
use crate::layer::LayerRegistry;
use crate::source::{open_source, Source};
use log::{error, info, warn};
use std::io::{Read, Seek, Write};
use std::path::Path;

/// Outcome of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Failed layer operations across resolve, verify, combine and finalize
    pub errors: usize,
    pub resolved_layers: usize,
    pub verified_layers: usize,
    pub combined_layers: usize,
    pub bytes_combined: u64,
    pub dry_run: bool,
    /// Set when a failed verification kept every combine pass from running
    pub combine_skipped: bool,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.errors == 0
    }

    /// 0 on success, otherwise `errors + 1`, capped to fit an exit status
    pub fn exit_code(&self) -> u8 {
        if self.errors == 0 {
            0
        } else {
            self.errors.saturating_add(1).min(u8::MAX as usize) as u8
        }
    }
}

/// Open `source_path` and run every layer against it
///
/// Fails only when the configuration is unusable or the source cannot be
/// opened; per-layer failures are counted in the report.
pub fn run(
    cfg: &RunConfig,
    source_path: impl AsRef<Path>,
    layers: &mut LayerRegistry,
    prompt: &mut dyn PassphrasePrompt,
) -> Result<RunReport> {
    cfg.validate()?;
    let mut source = open_source(cfg, source_path)?;
    execute(cfg, &mut source, layers, prompt)
}

/// Resolve, verify, combine and finalize against an already opened source
///
/// Every layer is resolved and verified before any layer may write. If any
/// of them fails, no combine pass runs and the source is left untouched.
/// A combine failure only stops that layer; later layers still run.
/// Fails up front, touching nothing, when the configuration is unusable.
pub fn execute<F: Read + Write + Seek>(
    cfg: &RunConfig,
    source: &mut Source<F>,
    layers: &mut LayerRegistry,
    prompt: &mut dyn PassphrasePrompt,
) -> Result<RunReport> {
    cfg.validate()?;

    let mut report = RunReport {
        dry_run: cfg.dry_run,
        ..Default::default()
    };

    for layer in layers.iter_mut() {
        let mut key = match resolve_key(cfg, &layer.name, layer.index, prompt) {
            Ok(key) => key,
            Err(e) => {
                error!("{}", e);
                report.errors += 1;
                continue;
            }
        };
        report.resolved_layers += 1;

        match verify_layer(source, &mut key) {
            Ok(_) => report.verified_layers += 1,
            Err(e) => {
                error!("Verification of key {} failed: {}", layer.display_name(), e);
                report.errors += 1;
            }
        }
        layer.key = Some(key);
    }

    if report.errors == 0 {
        let output = if cfg.dry_run {
            Output::Discard
        } else {
            Output::InPlace
        };

        for layer in layers.iter_mut() {
            let Some(key) = layer.key.as_mut() else {
                continue;
            };
            match combine_layer(source, key, output) {
                Ok(bytes) => {
                    report.combined_layers += 1;
                    report.bytes_combined += bytes;
                }
                Err(e) => {
                    error!("Combining with key {} failed: {}", layer.display_name(), e);
                    report.errors += 1;
                }
            }
        }
    } else if !layers.is_empty() {
        report.combine_skipped = true;
        warn!(
            "{} layer(s) failed before combining; {} left untouched",
            report.errors,
            source.name()
        );
    }

    report.errors += finalize(source, layers);

    if report.is_success() {
        let elapsed = cfg.elapsed();
        info!(
            "Done in {}sec & {}ms",
            elapsed.as_secs(),
            elapsed.subsec_millis()
        );
    }
    Ok(report)
}
