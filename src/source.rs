use crate::config::RunConfig;
use crate::error::{scratch_buffer, Result, VkeError};
use crate::key::AccessMode;
use log::info;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;
use zeroize::Zeroize;

/// The object being transformed in place
///
/// Length is measured once at open time. The scratch buffer is reused for
/// every chunk of every pass.
#[derive(Debug)]
pub struct Source<F = File> {
    name: String,
    handle: Option<F>,
    len: u64,
    offset: u64,
    buf: Vec<u8>,
}

/// Open the source read-write; it must already exist as a file
pub fn open_source(cfg: &RunConfig, path: impl AsRef<Path>) -> Result<Source<File>> {
    let path = path.as_ref();
    let name = path.display().to_string();
    info!("Initializing: {} [ 0 ]", name);
    let file = AccessMode::ReadWrite
        .open(path)
        .map_err(|e| VkeError::io(name.as_str(), e))?;
    Source::new(&name, file, cfg.chunk_size)
}

impl<F: Read + Write + Seek> Source<F> {
    pub fn new(name: &str, mut handle: F, capacity: usize) -> Result<Self> {
        let buf = scratch_buffer(capacity, name)?;
        let len = handle
            .seek(SeekFrom::End(0))
            .map_err(|e| VkeError::io(name, e))?;
        handle
            .seek(SeekFrom::Start(0))
            .map_err(|e| VkeError::io(name, e))?;

        Ok(Self {
            name: name.to_string(),
            handle: Some(handle),
            len,
            offset: 0,
            buf,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Logical position of the current pass
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn is_done(&self) -> bool {
        self.offset >= self.len
    }

    /// Start a new pass at byte 0
    pub fn rewind(&mut self) -> Result<()> {
        self.offset = 0;
        let handle = self.handle.as_mut().ok_or_else(|| released(&self.name))?;
        handle
            .seek(SeekFrom::Start(0))
            .map_err(|e| VkeError::io(self.name.as_str(), e))?;
        Ok(())
    }

    /// Read the chunk starting at the current offset into scratch
    ///
    /// Returns the chunk length; zero once the pass is complete.
    pub fn read_chunk(&mut self) -> Result<usize> {
        let remaining = self.len.saturating_sub(self.offset);
        let want = (self.buf.len() as u64).min(remaining) as usize;

        let handle = self.handle.as_mut().ok_or_else(|| released(&self.name))?;
        if want == 0 {
            return Ok(0);
        }
        handle
            .seek(SeekFrom::Start(self.offset))
            .map_err(|e| VkeError::io(self.name.as_str(), e))?;

        match handle.read_exact(&mut self.buf[..want]) {
            Ok(()) => Ok(want),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(VkeError::SourceTruncated {
                name: self.name.clone(),
                offset: self.offset,
                expected: self.len,
            }),
            Err(e) => Err(VkeError::io(self.name.as_str(), e)),
        }
    }

    /// Scratch bytes of the chunk last read
    pub fn chunk_mut(&mut self, len: usize) -> &mut [u8] {
        &mut self.buf[..len]
    }

    /// Seek back to the start of the current chunk and overwrite it
    pub fn write_back(&mut self, len: usize) -> Result<()> {
        let handle = self.handle.as_mut().ok_or_else(|| released(&self.name))?;
        handle
            .seek(SeekFrom::Start(self.offset))
            .map_err(|e| VkeError::io(self.name.as_str(), e))?;
        handle
            .write_all(&self.buf[..len])
            .map_err(|e| VkeError::io(self.name.as_str(), e))?;
        handle
            .flush()
            .map_err(|e| VkeError::io(self.name.as_str(), e))
    }

    /// Move the logical offset past a processed chunk
    pub fn advance(&mut self, len: usize) {
        self.offset += len as u64;
    }

    /// Flush and close the handle, wipe scratch
    pub fn release(&mut self) -> Result<()> {
        info!("Finalizing session for source {}", self.name);
        self.buf.zeroize();
        match self.handle.take() {
            Some(mut handle) => handle
                .flush()
                .map_err(|e| VkeError::io(self.name.as_str(), e)),
            None => Ok(()),
        }
    }

    /// Give back the handle, for callers that want to inspect the result
    pub fn into_inner(mut self) -> Option<F> {
        self.handle.take()
    }
}

fn released(name: &str) -> VkeError {
    VkeError::io(name, std::io::Error::other("source handle already released"))
}
