//! Atomic file replacement.

use std::io::Write;
use std::path::Path;

use crate::error::RatResult;

/// Write `bytes` to `path` through a temporary file in the same directory.
///
/// The destination is only replaced once the whole content has been written
/// and synced; on any error it is left untouched.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> RatResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path)?;

    log::debug!("Wrote {} bytes to {:?}", bytes.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.dbf");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("table.dbf");
        assert!(write_atomic(&path, b"data").is_err());
        assert!(!path.exists());
    }
}
