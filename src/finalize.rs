use crate::layer::LayerRegistry;
use crate::source::Source;
use log::error;
use std::io::{Read, Seek, Write};

/// Release the source and every layer's key
///
/// Every object gets its chance to release even after an earlier failure.
/// Returns the number of failed releases.
pub fn finalize<F: Read + Write + Seek>(source: &mut Source<F>, layers: &mut LayerRegistry) -> usize {
    let mut failures = 0;

    if let Err(e) = source.release() {
        error!("Unable to finalize source {}: {}", source.name(), e);
        failures += 1;
    }
    failures += layers.release_all();

    failures
}
