//! Directory creation and verification utilities.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use super::error::PathError;

/// Strategy for how to handle missing directories when ensuring they exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectoryCreationStrategy {
    /// Create directories automatically if they are missing.
    #[default]
    AutoCreate,
    /// Do not create directories; return an error if missing.
    Disallow,
}

/// Ensure the provided directory exists and is writable according to the chosen strategy.
pub fn ensure_directory(path: &Path, strategy: DirectoryCreationStrategy) -> Result<(), PathError> {
    if path.as_os_str().is_empty() {
        return Err(PathError::EmptyPath);
    }

    if path.exists() {
        if !path.is_dir() {
            return Err(PathError::NotADirectory(path.to_path_buf()));
        }
    } else {
        match strategy {
            DirectoryCreationStrategy::AutoCreate => {
                fs::create_dir_all(path).map_err(|e| PathError::CreateFailed {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
            }
            DirectoryCreationStrategy::Disallow => {
                return Err(PathError::DirectoryNotFound(path.to_path_buf()));
            }
        }
    }

    verify_writable(path)
}

/// Verify a directory is writable by attempting to create a test file.
pub fn verify_writable(path: &Path) -> Result<(), PathError> {
    let test_file = path.join(".prochub_write_test");
    let not_writable = |e: std::io::Error| PathError::NotWritable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&test_file)
        .map_err(not_writable)?;
    file.write_all(b"test").map_err(not_writable)?;
    drop(file);
    let _ = fs::remove_file(&test_file);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_auto_create_nested() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a").join("b");
        ensure_directory(&nested, DirectoryCreationStrategy::AutoCreate).unwrap();
        assert!(nested.is_dir());
        assert!(!nested.join(".prochub_write_test").exists());
    }

    #[test]
    fn test_disallow_missing() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing");
        assert!(matches!(
            ensure_directory(&missing, DirectoryCreationStrategy::Disallow),
            Err(PathError::DirectoryNotFound(_))
        ));
    }

    #[test]
    fn test_file_is_not_a_directory() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("file");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(
            ensure_directory(&file, DirectoryCreationStrategy::AutoCreate),
            Err(PathError::NotADirectory(_))
        ));
    }
}
