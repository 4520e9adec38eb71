use crate::error::CorruptorError;
use crate::method::Method;

/// The half-open interval `[start, start + length)` of addresses eligible for corruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorruptionRange {
    start: u64,
    length: u64,
}

impl CorruptionRange {
    /// Builds a range that fits inside a file of `file_size` bytes.
    ///
    /// `length` must be at least 1 and `start + length` must not exceed `file_size`.
    pub fn new(start: u64, length: u64, file_size: u64) -> Result<Self, CorruptorError> {
        if start >= file_size {
            return Err(CorruptorError::config(
                "start address",
                format!("{start:#x} is not below the file size {file_size:#x}"),
            ));
        }
        let max_length = file_size - start;
        if length == 0 || length > max_length {
            return Err(CorruptorError::config(
                "length",
                format!("{length} is outside 1..={max_length}"),
            ));
        }
        Ok(Self { start, length })
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    /// One past the last eligible address.
    pub fn end(&self) -> u64 {
        self.start + self.length
    }

    pub fn contains(&self, address: u64) -> bool {
        address >= self.start && address < self.end()
    }
}

/// What to corrupt: where, how many bytes, and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorruptionRequest {
    range: CorruptionRange,
    count: u64,
    method: Method,
}

impl CorruptionRequest {
    /// `count` must lie in `1..=range.length()`.
    pub fn new(range: CorruptionRange, count: u64, method: Method) -> Result<Self, CorruptorError> {
        if count == 0 || count > range.length() {
            return Err(CorruptorError::config(
                "byte count",
                format!("{count} is outside 1..={}", range.length()),
            ));
        }
        Ok(Self {
            range,
            count,
            method,
        })
    }

    pub fn range(&self) -> CorruptionRange {
        self.range
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn method(&self) -> Method {
        self.method
    }
}
