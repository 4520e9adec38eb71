use crate::error::CorruptorError;
use crate::method::{DEFAULT_XOR_VALUE, Method, MethodKind, xor_constant};
use crate::preflight;
use crate::range::{CorruptionRange, CorruptionRequest};
use crate::stream::MAX_CHUNK_SIZE;
use std::path::{Path, PathBuf};

/// Parses an unsigned integer written in decimal or with a `0x`, `0o` or `0b` prefix.
pub fn parse_number(text: &str) -> Result<u64, String> {
    let trimmed = text.trim();
    let lower = trimmed.to_ascii_lowercase();
    let (digits, radix) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (rest, 8)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (rest, 2)
    } else {
        (lower.as_str(), 10)
    };
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err(format!("{trimmed:?} is not a valid integer"));
    }
    u64::from_str_radix(digits, radix).map_err(|e| format!("{trimmed:?}: {e}"))
}

/// Unvalidated settings as collected from the command line and config file.
#[derive(Debug, Clone, Default)]
pub struct RawSettings {
    pub source: PathBuf,
    pub destination: Option<PathBuf>,
    pub start: Option<u64>,
    pub length: Option<u64>,
    pub count: Option<u64>,
    pub method: Option<MethodKind>,
    pub xor_value: Option<u64>,
    pub chunk_size: Option<u64>,
    pub seed: Option<u64>,
    pub verbose: bool,
}

/// Validated, immutable settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    source: PathBuf,
    destination: PathBuf,
    file_size: u64,
    request: CorruptionRequest,
    chunk_size: usize,
    seed: Option<u64>,
    verbose: bool,
}

impl Settings {
    /// Checks every field and fills in defaults.
    ///
    /// Defaults: `start` 0, `length` the rest of the file, `count` 1, method `flip`,
    /// XOR value `0xff`, chunk size 1 MiB. Fails on the first bad value without
    /// touching the destination.
    pub fn resolve(raw: RawSettings) -> Result<Self, CorruptorError> {
        let xor_value = xor_constant(raw.xor_value.unwrap_or(u64::from(DEFAULT_XOR_VALUE)))?;
        let method =
            Method::from_kind(raw.method.unwrap_or_default(), u64::from(xor_value.get()))?;

        let file_size = preflight::source_size(&raw.source)?;

        let start = raw.start.unwrap_or(0);
        let length = raw.length.unwrap_or(file_size.saturating_sub(start));
        let range = CorruptionRange::new(start, length, file_size)?;
        let request = CorruptionRequest::new(range, raw.count.unwrap_or(1), method)?;

        let chunk_size = match raw.chunk_size {
            None => MAX_CHUNK_SIZE,
            Some(size) if (1..=MAX_CHUNK_SIZE as u64).contains(&size) => size as usize,
            Some(size) => {
                return Err(CorruptorError::config(
                    "chunk size",
                    format!("{size} is outside 1..={MAX_CHUNK_SIZE}"),
                ));
            }
        };

        let destination = preflight::derive_destination(&raw.source, raw.destination.as_deref());
        preflight::validate_destination(&destination)?;

        let settings = Self {
            source: raw.source,
            destination,
            file_size,
            request,
            chunk_size,
            seed: raw.seed,
            verbose: raw.verbose,
        };
        log::debug!("Resolved settings: {settings:?}");
        Ok(settings)
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn request(&self) -> &CorruptionRequest {
        &self.request
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorClass, PreflightError};
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn source_of(len: usize) -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("input.bin");
        fs::write(&path, vec![0xaa; len]).unwrap();
        (dir, path)
    }

    fn raw(source: &Path) -> RawSettings {
        RawSettings {
            source: source.to_path_buf(),
            ..RawSettings::default()
        }
    }

    #[test]
    fn parse_number_accepts_prefixes() {
        assert_eq!(parse_number("42"), Ok(42));
        assert_eq!(parse_number("0x8000"), Ok(0x8000));
        assert_eq!(parse_number("0XfF"), Ok(0xff));
        assert_eq!(parse_number("0o17"), Ok(0o17));
        assert_eq!(parse_number("0b101"), Ok(5));
        assert_eq!(parse_number(" 7 "), Ok(7));
    }

    #[test]
    fn parse_number_rejects_garbage() {
        for text in ["", "0x", "-1", "+1", "ten", "0x1g", "99999999999999999999"] {
            assert!(parse_number(text).is_err(), "{text:?} should be rejected");
        }
    }

    #[test]
    fn defaults_cover_whole_file() {
        let (dir, source) = source_of(32);
        let settings = Settings::resolve(raw(&source)).unwrap();
        let request = settings.request();
        assert_eq!(request.range().start(), 0);
        assert_eq!(request.range().length(), 32);
        assert_eq!(request.count(), 1);
        assert_eq!(request.method(), Method::FlipBit);
        assert_eq!(settings.file_size(), 32);
        assert_eq!(settings.chunk_size(), MAX_CHUNK_SIZE);
        assert_eq!(settings.destination(), dir.path().join("input-corrupt1.bin"));
    }

    #[test]
    fn length_defaults_to_remainder_after_start() {
        let (_dir, source) = source_of(32);
        let settings = Settings::resolve(RawSettings {
            start: Some(10),
            ..raw(&source)
        })
        .unwrap();
        assert_eq!(settings.request().range().length(), 22);
    }

    #[test]
    fn out_of_range_numbers_are_configuration_errors() {
        let (_dir, source) = source_of(16);
        let cases = [
            RawSettings {
                start: Some(16),
                ..raw(&source)
            },
            RawSettings {
                start: Some(4),
                length: Some(13),
                ..raw(&source)
            },
            RawSettings {
                length: Some(0),
                ..raw(&source)
            },
            RawSettings {
                count: Some(0),
                ..raw(&source)
            },
            RawSettings {
                start: Some(4),
                length: Some(4),
                count: Some(5),
                ..raw(&source)
            },
            RawSettings {
                xor_value: Some(0),
                ..raw(&source)
            },
            RawSettings {
                xor_value: Some(0x100),
                method: Some(MethodKind::Xor),
                ..raw(&source)
            },
            RawSettings {
                chunk_size: Some(0),
                ..raw(&source)
            },
        ];
        for case in cases {
            let err = Settings::resolve(case.clone()).unwrap_err();
            assert_eq!(err.class(), ErrorClass::Configuration, "{case:?} -> {err}");
        }
    }

    #[test]
    fn count_equal_to_length_equal_to_one_is_valid() {
        let (_dir, source) = source_of(16);
        let settings = Settings::resolve(RawSettings {
            start: Some(15),
            length: Some(1),
            count: Some(1),
            ..raw(&source)
        })
        .unwrap();
        assert_eq!(settings.request().range().start(), 15);
        assert_eq!(settings.request().count(), 1);
    }

    #[test]
    fn xor_method_carries_constant() {
        let (_dir, source) = source_of(16);
        let settings = Settings::resolve(RawSettings {
            method: Some(MethodKind::Xor),
            xor_value: Some(0x5a),
            ..raw(&source)
        })
        .unwrap();
        match settings.request().method() {
            Method::Xor(constant) => assert_eq!(constant.get(), 0x5a),
            other => panic!("expected xor, got {other:?}"),
        }
    }

    #[test]
    fn missing_or_empty_source_is_a_preflight_error() {
        let dir = tempdir().unwrap();
        let err = Settings::resolve(raw(&dir.path().join("nope.bin"))).unwrap_err();
        assert!(matches!(
            err,
            CorruptorError::Preflight(PreflightError::SourceNotFound(_))
        ));

        let (_dir, empty) = source_of(0);
        let err = Settings::resolve(raw(&empty)).unwrap_err();
        assert!(matches!(
            err,
            CorruptorError::Preflight(PreflightError::SourceEmpty(_))
        ));
    }

    #[test]
    fn existing_destination_is_rejected_and_left_alone() {
        let (dir, source) = source_of(16);
        let taken = dir.path().join("taken.bin");
        fs::write(&taken, b"keep me").unwrap();

        let err = Settings::resolve(RawSettings {
            destination: Some(taken.clone()),
            ..raw(&source)
        })
        .unwrap_err();
        assert!(matches!(
            err,
            CorruptorError::Preflight(PreflightError::DestinationExists(_))
        ));
        assert_eq!(fs::read(&taken).unwrap(), b"keep me");
        assert_eq!(fs::read(&source).unwrap(), vec![0xaa; 16]);
    }

    #[test]
    fn destination_directory_receives_source_name() {
        let (_dir, source) = source_of(16);
        let out_dir = tempdir().unwrap();
        let settings = Settings::resolve(RawSettings {
            destination: Some(out_dir.path().to_path_buf()),
            ..raw(&source)
        })
        .unwrap();
        assert_eq!(settings.destination(), out_dir.path().join("input.bin"));
    }
}
