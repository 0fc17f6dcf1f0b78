use std::fs;
use std::path::Path;

use crate::error::{AppError, Result};

/// True when both paths name the same file on disk. A missing `dest` is never
/// the same file.
fn same_file(src: &Path, dest: &Path) -> bool {
    match (fs::canonicalize(src), fs::canonicalize(dest)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn ensure_distinct(src: &Path, dest: &Path) -> Result<()> {
    if same_file(src, dest) {
        return Err(AppError::InvalidPath(format!(
            "source and destination are the same file: {}",
            dest.display()
        )));
    }
    Ok(())
}

/// Copy a single file to `dest`, overwriting it if present.
///
/// `fs::copy` truncates `dest` before reading, so copying a file onto itself is
/// refused up front.
pub fn copy_file(src: &Path, dest: &Path) -> Result<()> {
    ensure_distinct(src, dest)?;
    fs::copy(src, dest)?;
    Ok(())
}

/// Move a file to `dest`.
///
/// Uses `fs::rename` first (fast, same-device). Falls back to copy+delete
/// if rename fails (cross-device).
pub fn move_file(src: &Path, dest: &Path) -> Result<()> {
    ensure_distinct(src, dest)?;
    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(src, dest)?;
            fs::remove_file(src)?;
            Ok(())
        }
    }
}

/// Rename a file in place. Unlike `move_file` there is no cross-device fallback.
pub fn rename_file(from: &Path, to: &Path) -> Result<()> {
    fs::rename(from, to)?;
    Ok(())
}

/// Delete a single file.
pub fn delete_file(path: &Path) -> Result<()> {
    fs::remove_file(path)?;
    Ok(())
}
