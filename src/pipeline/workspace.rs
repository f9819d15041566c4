use crate::error::Result;
use log::{debug, warn};
use std::path::Path;
use tempfile::TempDir;

/// Scoped temporary working directory for one rendering job.
///
/// The directory is removed when the guard is dropped; [`Workspace::close`]
/// removes it eagerly and logs a cleanup failure instead of raising it over
/// a rendering result.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Creates a uniquely named directory, under `root` when given, otherwise
    /// under the system temporary directory.
    pub fn create(root: Option<&Path>) -> Result<Workspace> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("papermap-");
        let dir = match root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        debug!("Rendering in temporary directory {}.", dir.path().display());
        Ok(Workspace { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            warn!(
                "Could not clean up the temporary directory {}: {}.",
                path.display(),
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_removes_the_directory() {
        let workspace = Workspace::create(None).unwrap();
        let path = workspace.path().to_path_buf();
        assert!(path.is_dir());
        workspace.close();
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_removes_the_directory() {
        let path = {
            let workspace = Workspace::create(None).unwrap();
            workspace.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_root_override_and_prefix() {
        let root = tempfile::tempdir().unwrap();
        let workspace = Workspace::create(Some(root.path())).unwrap();
        assert_eq!(workspace.path().parent(), Some(root.path()));
        let name = workspace.path().file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("papermap-"));
    }
}
