use crate::error::PreflightError;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Highest numbered suffix tried when naming an output file automatically.
pub const MAX_DERIVED_NAME_ATTEMPTS: u32 = 1000;

/// Returns the size of `source`, which must be an existing, non-empty regular file.
pub fn source_size(source: &Path) -> Result<u64, PreflightError> {
    if !source.is_file() {
        return Err(PreflightError::SourceNotFound(source.to_path_buf()));
    }
    let size = fs::metadata(source)
        .map_err(|e| PreflightError::SourceUnreadable {
            path: source.to_path_buf(),
            source: e,
        })?
        .len();
    if size == 0 {
        return Err(PreflightError::SourceEmpty(source.to_path_buf()));
    }
    Ok(size)
}

/// Picks the output path.
///
/// * No destination: `<stem>-corrupt<N><.ext>` next to the source, for the first
///   unused `N` in `1..=1000`. If every candidate is taken the last one is
///   returned and later rejected by [`validate_destination`].
/// * An existing directory: the source's file name inside that directory.
/// * Anything else is used as is.
pub fn derive_destination(source: &Path, destination: Option<&Path>) -> PathBuf {
    match destination {
        None => numbered_sibling(source),
        Some(dir) if dir.is_dir() => match source.file_name() {
            Some(name) => dir.join(name),
            None => dir.to_path_buf(),
        },
        Some(path) => path.to_path_buf(),
    }
}

fn numbered_sibling(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut candidate = PathBuf::new();
    for n in 1..=MAX_DERIVED_NAME_ATTEMPTS {
        candidate = source.with_file_name(format!("{stem}-corrupt{n}{extension}"));
        if !candidate.exists() {
            return candidate;
        }
    }
    log::warn!(
        "All {MAX_DERIVED_NAME_ATTEMPTS} derived output names are taken, last tried {candidate:?}"
    );
    candidate
}

/// The destination must not exist and its parent directory must.
pub fn validate_destination(destination: &Path) -> Result<(), PreflightError> {
    if destination.exists() {
        return Err(PreflightError::DestinationExists(destination.to_path_buf()));
    }
    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            return Err(PreflightError::DestinationDirMissing(parent.to_path_buf()));
        }
    }
    Ok(())
}

pub fn open_source(source: &Path) -> Result<File, PreflightError> {
    File::open(source).map_err(|e| PreflightError::SourceUnreadable {
        path: source.to_path_buf(),
        source: e,
    })
}

/// Creates the destination, refusing to replace a file that appeared after validation.
pub fn create_destination(destination: &Path) -> Result<File, PreflightError> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => {
                PreflightError::DestinationExists(destination.to_path_buf())
            }
            io::ErrorKind::NotFound => PreflightError::DestinationDirMissing(
                destination
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_default(),
            ),
            _ => PreflightError::DestinationUncreatable {
                path: destination.to_path_buf(),
                source: e,
            },
        })
}
