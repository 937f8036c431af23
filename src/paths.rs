//! Validation of the user-supplied project path.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::project::{is_source_file, MANIFEST};

/// A path that cannot be scanned. The messages are shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathValidationError {
    #[error("No such file or directory exists!\n Please check the file path and then re-run the command.")]
    NotFound(PathBuf),
    #[error("Invalid file format received!\n File format should be of type '.bal'")]
    InvalidFileFormat(PathBuf),
    #[error("ballerina: Invalid Ballerina package directory: {}, cannot find 'Ballerina.toml' file.", .0.display())]
    InvalidPackageDirectory(PathBuf),
}

/// Resolve the path to scan.
///
/// `None` means the current working directory. Files must carry the
/// Ballerina source extension; directories must hold a package manifest.
pub fn check_path(arg: Option<&Path>) -> Result<PathBuf, PathValidationError> {
    let path = match arg {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir()
            .map_err(|_| PathValidationError::NotFound(PathBuf::from(".")))?,
    };

    if !path.exists() {
        return Err(PathValidationError::NotFound(path));
    }

    if path.is_file() {
        if !is_source_file(&path) {
            return Err(PathValidationError::InvalidFileFormat(path));
        }
        return Ok(strip_current_dir(path));
    }

    if !path.join(MANIFEST).is_file() {
        return Err(PathValidationError::InvalidPackageDirectory(path));
    }
    Ok(path)
}

/// Drop a leading `./` or `.\` from a file path.
fn strip_current_dir(path: PathBuf) -> PathBuf {
    let stripped = {
        let text = path.to_string_lossy();
        text.strip_prefix("./")
            .or_else(|| text.strip_prefix(".\\"))
            .map(PathBuf::from)
    };
    stripped.unwrap_or(path)
}
