use crate::error::CorruptorError;
use crate::sampler::AddressSet;
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Upper bound on the number of bytes held in memory while copying an unchanged span.
pub const MAX_CHUNK_SIZE: usize = 1 << 20;

/// One corrupted byte: where it was and what it became.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeRecord {
    pub address: u64,
    pub old_byte: u8,
    pub new_byte: u8,
}

/// Where a [`StreamCorruptor`] is in its pass over the file.
///
/// A run moves `Init -> (CopyUnchanged -> CorruptOne)* -> CopyFinalUnchanged -> Done`.
/// Any I/O error moves it to `Failed` from whichever stage was active. Both end
/// stages are final: a corruptor runs once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStage {
    Init,
    CopyUnchanged,
    CorruptOne,
    CopyFinalUnchanged,
    Done,
    Failed,
}

impl fmt::Display for StreamStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            StreamStage::Init => "rewinding streams",
            StreamStage::CopyUnchanged => "copying unchanged bytes",
            StreamStage::CorruptOne => "corrupting a byte",
            StreamStage::CopyFinalUnchanged => "copying trailing bytes",
            StreamStage::Done => "starting a finished run",
            StreamStage::Failed => "starting after an earlier failure",
        };
        f.write_str(description)
    }
}

/// Counters gathered over one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub file_size: u64,
    pub bytes_copied: u64,
    pub bytes_corrupted: u64,
    pub chunk_reads: u64,
}

/// Copies a source stream to a destination stream, transforming the bytes at a
/// given set of addresses on the way.
///
/// The file is treated as alternating unchanged spans and single corrupted bytes.
/// Unchanged spans are copied in chunks of at most `chunk_size` bytes, so memory
/// use does not depend on the file size. The corruptor owns both streams and drops
/// them with itself; [`StreamCorruptor::stage`] tells how the run ended.
pub struct StreamCorruptor<R, W> {
    source: R,
    destination: W,
    file_size: u64,
    cursor: u64,
    chunk_size: usize,
    buffer: Vec<u8>,
    stage: StreamStage,
    summary: RunSummary,
}

impl<R, W> StreamCorruptor<R, W>
where
    R: Read + Seek,
    W: Write + Seek,
{
    pub fn new(source: R, destination: W, file_size: u64) -> Self {
        Self {
            source,
            destination,
            file_size,
            cursor: 0,
            chunk_size: MAX_CHUNK_SIZE,
            buffer: Vec::new(),
            stage: StreamStage::Init,
            summary: RunSummary {
                file_size,
                ..RunSummary::default()
            },
        }
    }

    /// Lowers the copy chunk size. Values are clamped to `1..=MAX_CHUNK_SIZE`.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.clamp(1, MAX_CHUNK_SIZE);
        self
    }

    pub fn stage(&self) -> StreamStage {
        self.stage
    }

    /// Performs the copy-and-corrupt pass.
    ///
    /// For each address in ascending order the bytes before it are copied verbatim,
    /// the byte itself is passed through `transform`, written, and reported to
    /// `on_change`. Whatever follows the last address is copied verbatim.
    ///
    /// Any read, write or seek failure aborts immediately. The destination is left
    /// as far as it got; removing it is up to the caller. Running a corruptor that
    /// has already finished or failed is an I/O error tagged with that stage.
    pub fn run<T, F>(
        &mut self,
        addresses: &AddressSet,
        mut transform: T,
        mut on_change: F,
    ) -> Result<RunSummary, CorruptorError>
    where
        T: FnMut(u8) -> u8,
        F: FnMut(ChangeRecord),
    {
        if self.stage != StreamStage::Init {
            return Err(self.fail(io::Error::other("stream corruptor has already run")));
        }
        if let Some(last) = addresses.last() {
            if last >= self.file_size {
                return Err(CorruptorError::InvalidAddresses(format!(
                    "{last:#x} is past the end of a {}-byte file",
                    self.file_size
                )));
            }
        }

        self.rewind()?;

        for address in addresses.iter() {
            self.enter(StreamStage::CopyUnchanged);
            self.copy_unchanged(address - self.cursor)?;

            self.enter(StreamStage::CorruptOne);
            let record = self.corrupt_one(&mut transform)?;
            on_change(record);
        }

        self.enter(StreamStage::CopyFinalUnchanged);
        self.copy_unchanged(self.file_size - self.cursor)?;

        if let Err(e) = self.destination.flush() {
            return Err(self.fail(e));
        }
        self.enter(StreamStage::Done);
        Ok(self.summary)
    }

    fn enter(&mut self, stage: StreamStage) {
        log::trace!("{:?} -> {:?} at {:#x}", self.stage, stage, self.cursor);
        self.stage = stage;
    }

    /// Records the failure and tags the error with the stage and offset it happened at.
    fn fail(&mut self, source: io::Error) -> CorruptorError {
        let stage = self.stage;
        self.stage = StreamStage::Failed;
        CorruptorError::Io {
            stage,
            offset: self.cursor,
            source,
        }
    }

    fn rewind(&mut self) -> Result<(), CorruptorError> {
        if let Err(e) = self.source.seek(SeekFrom::Start(0)) {
            return Err(self.fail(e));
        }
        if let Err(e) = self.destination.seek(SeekFrom::Start(0)) {
            return Err(self.fail(e));
        }
        self.cursor = 0;
        Ok(())
    }

    /// Copies `span` bytes from the current cursor, one bounded chunk at a time.
    /// A zero-length span is a no-op.
    fn copy_unchanged(&mut self, span: u64) -> Result<(), CorruptorError> {
        if span == 0 {
            return Ok(());
        }
        let wanted = chunk_len(span, self.chunk_size);
        if self.buffer.len() < wanted {
            self.buffer.resize(wanted, 0);
        }
        let mut remaining = span;
        while remaining > 0 {
            let len = chunk_len(remaining, self.chunk_size);
            if let Err(e) = self.source.read_exact(&mut self.buffer[..len]) {
                return Err(self.fail(e));
            }
            if let Err(e) = self.destination.write_all(&self.buffer[..len]) {
                return Err(self.fail(e));
            }
            self.summary.chunk_reads += 1;
            self.summary.bytes_copied += len as u64;
            self.cursor += len as u64;
            remaining -= len as u64;
        }
        log::debug!("Copied {span} unchanged bytes up to {:#x}", self.cursor);
        Ok(())
    }

    fn corrupt_one<T>(&mut self, transform: &mut T) -> Result<ChangeRecord, CorruptorError>
    where
        T: FnMut(u8) -> u8,
    {
        let mut byte = [0u8; 1];
        if let Err(e) = self.source.read_exact(&mut byte) {
            return Err(self.fail(e));
        }
        let old_byte = byte[0];
        let new_byte = transform(old_byte);
        if let Err(e) = self.destination.write_all(&[new_byte]) {
            return Err(self.fail(e));
        }
        let record = ChangeRecord {
            address: self.cursor,
            old_byte,
            new_byte,
        };
        self.cursor += 1;
        self.summary.bytes_corrupted += 1;
        Ok(record)
    }
}

fn chunk_len(remaining: u64, chunk_size: usize) -> usize {
    usize::try_from(remaining).map_or(chunk_size, |remaining| remaining.min(chunk_size))
}
