//! Atomic file writes so a crash never leaves a half-written settings file

use appenv_core::{Error, IoResultExt, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write data to a file atomically by writing to a temporary sibling and renaming
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        Some(_) => Path::new("."),
        None => {
            return Err(Error::configuration(format!(
                "invalid file path '{}': no parent directory",
                path.display()
            )))
        }
    };

    fs::create_dir_all(parent).fs_context(parent, "create parent directory")?;

    // Same directory so the rename cannot cross filesystems
    let mut temp = NamedTempFile::new_in(parent).fs_context(parent, "create temporary file")?;
    temp.write_all(content)
        .fs_context(temp.path(), "write to temporary file")?;
    temp.as_file()
        .sync_all()
        .fs_context(temp.path(), "sync temporary file")?;

    temp.persist(path)
        .map_err(|e| Error::file_system(path, "atomic rename", e.error))?;

    Ok(())
}

/// Write string content to a file atomically
pub fn write_atomic_string(path: &Path, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}
