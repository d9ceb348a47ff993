use crate::error::{scratch_buffer, Result, VkeError};
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use zeroize::{Zeroize, Zeroizing};

/// Key bytes that repeat from the start once exhausted
///
/// Both backings must yield byte-identical output for the same
/// (key, offset, length), since verification relies on it.
pub trait CyclicKeyStream: std::fmt::Debug {
    /// Effective key length in bytes
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current position within one key period
    fn offset(&self) -> u64;

    /// Reset the stream to byte 0
    fn rewind(&mut self) -> Result<()>;

    /// Return the next `len` key bytes, wrapping as often as needed
    ///
    /// `len` must not exceed the stream's scratch capacity.
    fn next_chunk(&mut self, len: usize) -> Result<&[u8]>;

    /// Wipe scratch memory and close any handle
    fn release(&mut self) -> Result<()>;
}

/// Key stream read from a seekable handle
#[derive(Debug)]
pub struct FileKeyStream<R> {
    name: String,
    reader: Option<R>,
    len: u64,
    offset: u64,
    buf: Zeroizing<Vec<u8>>,
}

impl<R: Read + Seek> FileKeyStream<R> {
    /// Measure the handle (seek to end, then rewind) and allocate scratch
    pub fn new(name: &str, mut reader: R, capacity: usize) -> Result<Self> {
        let buf = Zeroizing::new(scratch_buffer(capacity, name)?);
        let len = reader
            .seek(SeekFrom::End(0))
            .map_err(|e| VkeError::io(name, e))?;
        reader
            .seek(SeekFrom::Start(0))
            .map_err(|e| VkeError::io(name, e))?;

        Ok(Self {
            name: name.to_string(),
            reader: Some(reader),
            len,
            offset: 0,
            buf,
        })
    }
}

fn released(name: &str) -> VkeError {
    VkeError::io(name, std::io::Error::other("key handle already released"))
}

impl<R: Read + Seek + std::fmt::Debug> CyclicKeyStream for FileKeyStream<R> {
    fn len(&self) -> u64 {
        self.len
    }

    fn offset(&self) -> u64 {
        self.offset
    }

    fn rewind(&mut self) -> Result<()> {
        let reader = self.reader.as_mut().ok_or_else(|| released(&self.name))?;
        reader
            .seek(SeekFrom::Start(0))
            .map_err(|e| VkeError::io(self.name.as_str(), e))?;
        self.offset = 0;
        Ok(())
    }

    fn next_chunk(&mut self, len: usize) -> Result<&[u8]> {
        if self.reader.is_none() {
            return Err(released(&self.name));
        }
        let len = len.min(self.buf.len());
        let mut filled = 0;

        while filled < len {
            let reader = self.reader.as_mut().ok_or_else(|| released(&self.name))?;
            match reader.read(&mut self.buf[filled..len]) {
                Ok(0) if self.offset == 0 => {
                    return Err(VkeError::EmptyKey {
                        name: self.name.clone(),
                    })
                }
                // Short read: the key wrapped, continue from byte 0
                Ok(0) => self.rewind()?,
                Ok(n) => {
                    filled += n;
                    self.offset += n as u64;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(VkeError::io(self.name.as_str(), e)),
            }
        }

        Ok(&self.buf[..len])
    }

    fn release(&mut self) -> Result<()> {
        self.buf.zeroize();
        self.reader = None;
        Ok(())
    }
}

/// Key stream over bytes already resident in memory
#[derive(Debug)]
pub struct MemoryKeyStream {
    name: String,
    bytes: Zeroizing<Vec<u8>>,
    offset: usize,
    buf: Zeroizing<Vec<u8>>,
}

impl MemoryKeyStream {
    pub fn new(name: &str, bytes: Zeroizing<Vec<u8>>, capacity: usize) -> Result<Self> {
        let buf = Zeroizing::new(scratch_buffer(capacity, name)?);
        Ok(Self {
            name: name.to_string(),
            bytes,
            offset: 0,
            buf,
        })
    }

    /// The effective key bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl CyclicKeyStream for MemoryKeyStream {
    fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn offset(&self) -> u64 {
        self.offset as u64
    }

    fn rewind(&mut self) -> Result<()> {
        self.offset = 0;
        Ok(())
    }

    fn next_chunk(&mut self, len: usize) -> Result<&[u8]> {
        if self.bytes.is_empty() {
            return Err(VkeError::EmptyKey {
                name: self.name.clone(),
            });
        }
        let len = len.min(self.buf.len());
        let period = self.bytes.len();

        for slot in self.buf[..len].iter_mut() {
            *slot = self.bytes[self.offset];
            self.offset = (self.offset + 1) % period;
        }

        Ok(&self.buf[..len])
    }

    fn release(&mut self) -> Result<()> {
        self.buf.zeroize();
        self.bytes.zeroize();
        self.offset = 0;
        Ok(())
    }
}
