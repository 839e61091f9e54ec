//! Where persisted records live.

use std::io;
use std::path::Path;

/// Byte storage addressed by path.
pub trait RecordStore {
    /// Read the bytes at `path`, or `None` if nothing exists there.
    fn read(&self, path: &Path) -> io::Result<Option<Vec<u8>>>;

    /// Overwrite `path` with `bytes`, creating parent directories as needed.
    fn write_creating_dirs(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

/// [`RecordStore`] on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl RecordStore for FsStore {
    fn read(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write_creating_dirs(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)
    }
}
