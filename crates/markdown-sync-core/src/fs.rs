use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::Builder;

use crate::error::{SyncError, SyncResult};

/// Read `path` fresh from disk, mapping a missing file to `Ok(None)`.
pub fn read_document(path: &Path) -> SyncResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(SyncError::io(path, err)),
    }
}

/// Replace the contents of `path` via a sibling temp file and rename, so a
/// crash mid-write never leaves a truncated document behind.
///
/// Symlinks are resolved first: the file the link points at is replaced and
/// the link itself stays in place.
pub fn write_atomic(path: &Path, content: &str, backup: bool) -> SyncResult<()> {
    let destination = resolve_destination(path)?;
    let parent = destination
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = Builder::new()
        .prefix(".markdown-sync")
        .tempfile_in(parent)
        .map_err(|err| SyncError::io(parent, err))?;

    let tmp_path = tmp.path().to_path_buf();
    let file = tmp.as_file_mut();
    file.write_all(content.as_bytes())
        .and_then(|_| file.sync_all())
        .map_err(|err| SyncError::io(&tmp_path, err))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = fs::metadata(&destination) {
            let mode = metadata.permissions().mode();
            if let Err(err) = fs::set_permissions(tmp.path(), fs::Permissions::from_mode(mode)) {
                tracing::debug!(path = %destination.display(), error = %err, "permissions not carried over");
            }
        }
    }

    if backup {
        let backup_path = backup_path(path);
        fs::copy(&destination, &backup_path).map_err(|err| SyncError::io(&backup_path, err))?;
    }

    tmp.persist(&destination)
        .map(|_| ())
        .map_err(|err| SyncError::io(&destination, err.error))
}

fn resolve_destination(path: &Path) -> SyncResult<PathBuf> {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.file_type().is_symlink() => {
            fs::canonicalize(path).map_err(|err| SyncError::io(path, err))
        }
        _ => Ok(path.to_path_buf()),
    }
}

/// `guide.md` backs up to `guide.md.bak`.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".bak");
    path.with_file_name(name)
}
