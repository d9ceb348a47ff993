//! Streaming XOR of the source against one layer's key stream.
//!
//! Both passes read the source in fixed-size chunks, pull an equal-length
//! chunk from the key's [`CyclicKeyStream`](crate::key::CyclicKeyStream) and
//! XOR the two. Verification stops there; combining also writes the result
//! to an [`Output`].

pub mod combine;
pub mod verify;

pub use combine::*;
pub use verify::*;

use crate::error::{Result, VkeError};
use crate::key::CyclicKeyStream;
use crate::source::Source;
use std::io::{self, Read, Seek, Write};

/// Where combined chunks go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Output {
    /// Overwrite the source in place
    #[default]
    InPlace,
    /// Do the work, persist nothing
    Discard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Verify,
    Combine(Output),
}

/// XOR `key` into `data` over their common length
pub fn xor_into(data: &mut [u8], key: &[u8]) -> usize {
    let overlap = data.len().min(key.len());
    for (byte, k) in data[..overlap].iter_mut().zip(&key[..overlap]) {
        *byte ^= k;
    }
    overlap
}

/// Run one full pass over the source, returning the bytes combined
fn stream_layer<F: Read + Write + Seek>(
    source: &mut Source<F>,
    key: &mut dyn CyclicKeyStream,
    pass: Pass,
) -> Result<u64> {
    source.rewind()?;
    key.rewind()?;

    let mut total = 0u64;
    loop {
        let read = source.read_chunk()?;
        if read == 0 {
            break;
        }

        let key_chunk = key.next_chunk(read)?;
        let combined = xor_into(source.chunk_mut(read), key_chunk);
        if combined == 0 {
            return Err(VkeError::Stalled {
                name: source.name().to_string(),
                offset: source.offset(),
            });
        }

        match pass {
            Pass::Verify => {}
            Pass::Combine(Output::InPlace) => source.write_back(combined)?,
            Pass::Combine(Output::Discard) => {
                let mut sink = io::sink();
                sink.write_all(source.chunk_mut(combined))
                    .and_then(|_| sink.flush())
                    .map_err(|e| VkeError::io(source.name().to_string(), e))?;
            }
        }

        source.advance(combined);
        total += combined as u64;
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_xor_into_stops_at_shorter_side() {
        let mut data = vec![0xFFu8; 4];
        assert_eq!(xor_into(&mut data, &[0x0F, 0xF0]), 2);
        assert_eq!(data, vec![0xF0, 0x0F, 0xFF, 0xFF]);
    }

    /// Stream that hands out nothing, however much is asked for
    #[derive(Debug)]
    struct Starved;

    impl CyclicKeyStream for Starved {
        fn len(&self) -> u64 {
            1
        }

        fn offset(&self) -> u64 {
            0
        }

        fn rewind(&mut self) -> Result<()> {
            Ok(())
        }

        fn next_chunk(&mut self, _len: usize) -> Result<&[u8]> {
            Ok(&[])
        }

        fn release(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_pass_without_progress_is_an_error() {
        let mut source = Source::new("mem", Cursor::new(vec![3u8; 10]), 4).unwrap();
        let err = stream_layer(&mut source, &mut Starved, Pass::Verify).unwrap_err();
        assert!(matches!(err, VkeError::Stalled { offset: 0, .. }));

        let err = stream_layer(&mut source, &mut Starved, Pass::Combine(Output::InPlace)).unwrap_err();
        assert!(matches!(err, VkeError::Stalled { .. }));
        assert_eq!(source.into_inner().unwrap().into_inner(), vec![3u8; 10]);
    }

    #[test]
    fn test_xor_into_is_self_inverse() {
        let original: Vec<u8> = (0..64).collect();
        let key: Vec<u8> = (0..64).map(|i| (i * 7 + 3) as u8).collect();
        let mut data = original.clone();
        xor_into(&mut data, &key);
        assert_ne!(data, original);
        xor_into(&mut data, &key);
        assert_eq!(data, original);
    }
}
