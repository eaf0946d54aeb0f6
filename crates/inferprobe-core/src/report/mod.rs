pub mod console;
pub mod csv;
pub mod json;
pub mod progress;
pub mod summary;

use std::fs::Permissions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{ProbeError, ProbeResult};

/// Directory the temporary file is created in (same filesystem as `path`).
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Temp file next to `path` with the mode the final file should have: the
/// mode of the file being replaced, or 0644 for a new one.
pub(crate) fn temp_file_for(path: &Path) -> ProbeResult<NamedTempFile> {
    let dir = parent_dir(path);
    std::fs::create_dir_all(&dir).map_err(|e| ProbeError::output(path, e))?;
    let tmp = NamedTempFile::new_in(&dir).map_err(|e| ProbeError::output(path, e))?;
    if let Some(perms) = target_permissions(path) {
        tmp.as_file()
            .set_permissions(perms)
            .map_err(|e| ProbeError::output(path, e))?;
    }
    Ok(tmp)
}

#[cfg(unix)]
fn target_permissions(path: &Path) -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    match std::fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(_) => Some(Permissions::from_mode(0o644)),
    }
}

#[cfg(not(unix))]
fn target_permissions(path: &Path) -> Option<Permissions> {
    std::fs::metadata(path).ok().map(|meta| meta.permissions())
}

/// Write `bytes` to a temp file next to `path`, then rename over `path`.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> ProbeResult<()> {
    let mut tmp = temp_file_for(path)?;
    tmp.write_all(bytes).map_err(|e| ProbeError::output(path, e))?;
    tmp.flush().map_err(|e| ProbeError::output(path, e))?;
    tmp.persist(path).map_err(|e| ProbeError::output(path, e.error))?;
    Ok(())
}
