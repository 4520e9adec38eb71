use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::stream::StreamStage;

/// Broad class of a [`CorruptorError`], telling the caller how far a run got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Rejected arguments. Nothing was opened or written.
    Configuration,
    /// Source or destination failed the filesystem checks. The destination was not created.
    Preflight,
    /// The streaming pass failed. The destination may exist and be partially written.
    Io,
}

/// Problems found while checking the source and destination paths.
#[derive(Error, Debug)]
pub enum PreflightError {
    #[error("Input file not found or not a regular file: {0:?}")]
    SourceNotFound(PathBuf),

    #[error("Input file is empty: {0:?}")]
    SourceEmpty(PathBuf),

    #[error("Failed to read input file {path:?}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Output file already exists: {0:?}")]
    DestinationExists(PathBuf),

    #[error("Output directory not found: {0:?}")]
    DestinationDirMissing(PathBuf),

    #[error("Failed to create output file {path:?}: {source}")]
    DestinationUncreatable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Every failure the corruptor can surface. None of them are retried.
#[derive(Error, Debug)]
pub enum CorruptorError {
    /// A settings value is malformed or out of its allowed range.
    #[error("Invalid {parameter}: {reason}")]
    Configuration {
        parameter: &'static str,
        reason: String,
    },

    /// The sampler was asked for more addresses than the range holds, for none at all,
    /// or for a range this platform cannot index.
    #[error("Invalid corruption range: start {start}, length {length}, count {count}")]
    InvalidRange { start: u64, length: u64, count: u64 },

    /// Addresses handed to the stream are unsorted, repeated or past the end of file.
    #[error("Invalid address list: {0}")]
    InvalidAddresses(String),

    #[error(transparent)]
    Preflight(#[from] PreflightError),

    /// A read, write or seek failed mid-run.
    #[error("I/O error while {stage} at offset {offset:#x}: {source}")]
    Io {
        stage: StreamStage,
        offset: u64,
        #[source]
        source: io::Error,
    },

    /// The change report could not be written.
    #[error("Failed to write change report: {0}")]
    Report(#[source] io::Error),
}

impl CorruptorError {
    pub(crate) fn config(parameter: &'static str, reason: impl Into<String>) -> Self {
        CorruptorError::Configuration {
            parameter,
            reason: reason.into(),
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            CorruptorError::Configuration { .. }
            | CorruptorError::InvalidRange { .. }
            | CorruptorError::InvalidAddresses(_) => ErrorClass::Configuration,
            CorruptorError::Preflight(_) => ErrorClass::Preflight,
            CorruptorError::Io { .. } | CorruptorError::Report(_) => ErrorClass::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_class_matches_taxonomy() {
        assert_eq!(
            CorruptorError::config("count", "too large").class(),
            ErrorClass::Configuration
        );
        assert_eq!(
            CorruptorError::InvalidRange {
                start: 0,
                length: 1,
                count: 2
            }
            .class(),
            ErrorClass::Configuration
        );
        assert_eq!(
            CorruptorError::from(PreflightError::SourceEmpty(PathBuf::from("a.bin"))).class(),
            ErrorClass::Preflight
        );
        let io_err = CorruptorError::Io {
            stage: StreamStage::CorruptOne,
            offset: 0x10,
            source: io::Error::other("disk full"),
        };
        assert_eq!(io_err.class(), ErrorClass::Io);
        assert!(io_err.to_string().contains("0x10"));
    }

    #[test]
    fn configuration_error_names_parameter() {
        let err = CorruptorError::config("start address", "must be below 16");
        assert_eq!(err.to_string(), "Invalid start address: must be below 16");
    }
}
