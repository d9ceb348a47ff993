use super::{stream_layer, Pass};
use crate::error::Result;
use crate::key::Key;
use crate::source::Source;
use log::info;
use std::io::{Read, Seek, Write};

/// Dry-execute the combine logic for one layer without writing anything
///
/// Leaves the source rewound to byte 0. Returns the number of bytes that
/// would be combined.
pub fn verify_layer<F: Read + Write + Seek>(source: &mut Source<F>, key: &mut Key) -> Result<u64> {
    info!("Verifying success of key {} [ {} ]", key.name(), key.len());
    let verified = stream_layer(source, key.stream_mut(), Pass::Verify)?;
    source.rewind()?;
    Ok(verified)
}
