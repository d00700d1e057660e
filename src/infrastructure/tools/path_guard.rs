//! # Path Guard
//!
//! Confines every path argument to the workspace root.
//! Paths are resolved component by component: existing prefixes are canonicalized
//! (resolving symlinks), the non-existing tail is applied lexically. Nothing is created here.

use std::io;
use std::path::{Component, Path, PathBuf};

use crate::domain::error::PathViolation;

/// The workspace root plus the validation rules around it.
#[derive(Debug, Clone)]
pub struct PathGuard {
    root: PathBuf,
}

impl PathGuard {
    /// Create the workspace directory if needed and pin its canonical path.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref();
        std::fs::create_dir_all(root)?;
        Ok(Self {
            root: std::fs::canonicalize(root)?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `relative` against the root.
    ///
    /// Fails with `AbsoluteNotAllowed` for absolute input and with `Escape` when the
    /// resolved path is not the root or one of its descendants, or cannot be verified.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, PathViolation> {
        let requested = Path::new(relative);
        if requested.is_absolute() || requested.has_root() {
            return Err(PathViolation::AbsoluteNotAllowed);
        }

        let mut resolved = self.root.clone();
        for component in requested.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    resolved.pop();
                }
                Component::Normal(name) => {
                    resolved.push(name);
                    resolved = canonical_if_present(resolved)?;
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(PathViolation::AbsoluteNotAllowed);
                }
            }
        }

        if resolved.starts_with(&self.root) {
            Ok(resolved)
        } else {
            tracing::warn!(requested = relative, "path escapes workspace root");
            Err(PathViolation::Escape)
        }
    }

    /// Path relative to the root, for display.
    pub fn display_relative(&self, absolute: &Path) -> String {
        match absolute.strip_prefix(&self.root) {
            Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
            Ok(rel) => rel.to_string_lossy().to_string(),
            Err(_) => absolute.to_string_lossy().to_string(),
        }
    }
}

/// Canonicalize an existing entry; leave a missing one untouched.
/// A dangling symlink cannot be verified and counts as an escape.
fn canonical_if_present(path: PathBuf) -> Result<PathBuf, PathViolation> {
    match std::fs::symlink_metadata(&path) {
        Ok(_) => std::fs::canonicalize(&path).map_err(|_| PathViolation::Escape),
        Err(e) if is_missing(&e) => Ok(path),
        Err(_) => Err(PathViolation::Escape),
    }
}

/// A path below a regular file fails with ENOTDIR; it is just as absent as a
/// missing one.
pub(crate) fn is_missing(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn guard() -> (TempDir, PathGuard) {
        let dir = TempDir::new().unwrap();
        let guard = PathGuard::new(dir.path().join("workspace")).unwrap();
        (dir, guard)
    }

    #[test]
    fn test_absolute_paths_rejected() {
        let (_dir, guard) = guard();
        assert_eq!(
            guard.resolve("/etc/passwd"),
            Err(PathViolation::AbsoluteNotAllowed)
        );
        let inside = guard.root().join("a.txt");
        assert_eq!(
            guard.resolve(inside.to_str().unwrap()),
            Err(PathViolation::AbsoluteNotAllowed)
        );
    }

    #[test]
    fn test_traversal_rejected() {
        let (_dir, guard) = guard();
        for path in ["..", "../secret.txt", "a/../../x", "a/b/../../../x", "./../workspace2"] {
            assert_eq!(guard.resolve(path), Err(PathViolation::Escape), "{path}");
        }
    }

    #[test]
    fn test_sibling_with_shared_prefix_rejected() {
        let (dir, guard) = guard();
        std::fs::create_dir(dir.path().join("workspace-other")).unwrap();
        assert_eq!(
            guard.resolve("../workspace-other/file"),
            Err(PathViolation::Escape)
        );
    }

    #[test]
    fn test_inside_paths_resolve_under_root() {
        let (_dir, guard) = guard();
        std::fs::create_dir_all(guard.root().join("docs")).unwrap();
        for path in ["", ".", "notes.txt", "docs", "docs/new/deep.txt", "docs/../notes.txt", "./a/./b"] {
            let resolved = guard.resolve(path).unwrap();
            assert!(resolved.starts_with(guard.root()), "{path}");
        }
        assert_eq!(guard.resolve(".").unwrap(), guard.root());
        assert_eq!(
            guard.resolve("docs/../notes.txt").unwrap(),
            guard.root().join("notes.txt")
        );
    }

    #[test]
    fn test_resolve_does_not_create() {
        let (_dir, guard) = guard();
        let resolved = guard.resolve("missing/dir/file.txt").unwrap();
        assert!(!resolved.exists());
        assert!(!guard.root().join("missing").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_rejected() {
        let (dir, guard) = guard();
        let outside = dir.path().join("outside");
        std::fs::create_dir(&outside).unwrap();
        std::os::unix::fs::symlink(&outside, guard.root().join("link")).unwrap();
        assert_eq!(guard.resolve("link/file.txt"), Err(PathViolation::Escape));

        std::os::unix::fs::symlink(outside.join("nowhere"), guard.root().join("dangling"))
            .unwrap();
        assert_eq!(guard.resolve("dangling"), Err(PathViolation::Escape));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_inside_root_allowed() {
        let (_dir, guard) = guard();
        std::fs::create_dir(guard.root().join("real")).unwrap();
        std::os::unix::fs::symlink(guard.root().join("real"), guard.root().join("alias")).unwrap();
        assert_eq!(
            guard.resolve("alias/x.txt").unwrap(),
            guard.root().join("real").join("x.txt")
        );
    }

    #[test]
    fn test_path_below_a_file_is_not_an_escape() {
        let (_dir, guard) = guard();
        std::fs::write(guard.root().join("notes.txt"), "x").unwrap();
        assert_eq!(
            guard.resolve("notes.txt/child").unwrap(),
            guard.root().join("notes.txt").join("child")
        );
        assert_eq!(
            guard.resolve("notes.txt/child/deeper.txt").unwrap(),
            guard.root().join("notes.txt/child/deeper.txt")
        );
        assert_eq!(
            guard.resolve("notes.txt/../../x"),
            Err(PathViolation::Escape)
        );
    }

    #[test]
    fn test_display_relative() {
        let (_dir, guard) = guard();
        assert_eq!(guard.display_relative(guard.root()), ".");
        assert_eq!(guard.display_relative(&guard.root().join("a").join("b")), "a/b");
    }
}
