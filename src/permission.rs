// Permission service: may we write the exported picture right now?
// The core only ever sees a yes/no; denial means "export unavailable now".

use std::fs;
use std::path::PathBuf;

pub trait PermissionService {
    fn has_write_permission(&self) -> bool;
    /// Ask for write access (may prompt or prepare the target). Returns the new state.
    fn request_write_permission(&mut self) -> bool;
}

/// Desktop stand-in: "permission" is whether the output directory exists and is writable.
/// Requesting it creates the directory.
pub struct DirectoryPermission {
    dir: PathBuf,
}

impl DirectoryPermission {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl PermissionService for DirectoryPermission {
    fn has_write_permission(&self) -> bool {
        fs::metadata(&self.dir)
            .map(|m| m.is_dir() && !m.permissions().readonly())
            .unwrap_or(false)
    }

    fn request_write_permission(&mut self) -> bool {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            log::warn!("cannot create {}: {e}", self.dir.display());
            return false;
        }
        self.has_write_permission()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn request_creates_missing_dir() {
        let dir = std::env::temp_dir().join(format!("fingerpaint-perm-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        let mut perm = DirectoryPermission::new(&dir);
        assert!(!perm.has_write_permission());
        assert!(perm.request_write_permission());
        assert!(perm.has_write_permission());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn file_in_the_way_is_denied() {
        let file = std::env::temp_dir().join(format!("fingerpaint-perm-file-{}", std::process::id()));
        fs::write(&file, b"x").unwrap();

        let mut perm = DirectoryPermission::new(&file);
        assert!(!perm.has_write_permission());
        assert!(!perm.request_write_permission());

        let _ = fs::remove_file(&file);
    }
}
