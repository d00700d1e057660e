//! # File Operations
//!
//! Handlers behind the eight file tools. Each one routes every path argument
//! through the `PathGuard`, performs a single storage operation and reports
//! either a result description or a typed `FsError`.

use std::fs::Metadata;
use std::io;
use std::path::Path;
use std::time::SystemTime;

use globset::GlobBuilder;
use tokio::io::AsyncWriteExt;

use crate::domain::error::{EntryKind, FsError};
use crate::infrastructure::tools::path_guard::{PathGuard, is_missing};
use crate::strings::tools as out;

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEntry {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
}

/// File handlers bound to one workspace root.
#[derive(Debug, Clone)]
pub struct FileOps {
    guard: PathGuard,
}

impl FileOps {
    pub fn new(guard: PathGuard) -> Self {
        Self { guard }
    }

    /// Full contents of a file; binary content is summarized by size.
    pub async fn read(&self, path: &str) -> Result<String, FsError> {
        let full = self.guard.resolve(path)?;
        expect_kind(&full, path, EntryKind::File).await?;

        let bytes = tokio::fs::read(&full).await.map_err(FsError::io("read"))?;
        match String::from_utf8(bytes) {
            Ok(text) => Ok(out::file_contents(path, &text)),
            Err(e) => Ok(out::binary_file(path, e.as_bytes().len())),
        }
    }

    /// Create or overwrite a file, creating missing parent directories.
    pub async fn write(&self, path: &str, content: &str) -> Result<String, FsError> {
        let full = self.guard.resolve(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(FsError::io("create parent directories"))?;
        }
        tokio::fs::write(&full, content)
            .await
            .map_err(FsError::io("write"))?;
        Ok(out::file_written(path, content.chars().count()))
    }

    pub async fn append(&self, path: &str, content: &str) -> Result<String, FsError> {
        let full = self.guard.resolve(path)?;
        expect_kind(&full, path, EntryKind::File).await?;

        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .open(&full)
            .await
            .map_err(FsError::io("append"))?;
        file.write_all(content.as_bytes())
            .await
            .map_err(FsError::io("append"))?;
        file.flush().await.map_err(FsError::io("append"))?;
        Ok(out::content_appended(path, content.chars().count()))
    }

    pub async fn delete(&self, path: &str) -> Result<String, FsError> {
        let full = self.guard.resolve(path)?;
        expect_kind(&full, path, EntryKind::File).await?;

        tokio::fs::remove_file(&full)
            .await
            .map_err(FsError::io("delete"))?;
        Ok(out::file_deleted(path))
    }

    /// Directory entries, directories first, then by name.
    ///
    /// A pattern with a `/` or `**` is matched against paths relative to the listed
    /// directory, walking into subdirectories; entry names are then relative paths.
    /// Symlinked directories are not descended into.
    pub async fn list_entries(
        &self,
        path: &str,
        pattern: Option<&str>,
    ) -> Result<Vec<ListedEntry>, FsError> {
        let full = self.guard.resolve(path)?;
        expect_kind(&full, path, EntryKind::Directory).await?;

        let matcher = match pattern {
            Some(pattern) => Some(
                GlobBuilder::new(pattern)
                    .literal_separator(true)
                    .build()
                    .map_err(|e| FsError::InvalidPattern {
                        pattern: pattern.to_string(),
                        message: e.to_string(),
                    })?
                    .compile_matcher(),
            ),
            None => None,
        };
        let recursive = pattern.is_some_and(|p| p.contains('/') || p.contains("**"));

        let mut entries = Vec::new();
        let mut pending = vec![full.clone()];
        while let Some(dir) = pending.pop() {
            let mut reader = tokio::fs::read_dir(&dir)
                .await
                .map_err(FsError::io("list"))?;
            while let Some(entry) = reader.next_entry().await.map_err(FsError::io("list"))? {
                let entry_path = entry.path();
                if recursive
                    && entry
                        .file_type()
                        .await
                        .map_err(FsError::io("list"))?
                        .is_dir()
                {
                    pending.push(entry_path.clone());
                }

                let name = if recursive {
                    relative_name(&full, &entry_path)
                } else {
                    entry.file_name().to_string_lossy().to_string()
                };
                if let Some(matcher) = &matcher
                    && !matcher.is_match(&name)
                {
                    continue;
                }
                // Follow symlinks; a dangling one is listed as an empty file.
                let (is_dir, size) = match tokio::fs::metadata(&entry_path).await {
                    Ok(meta) => (meta.is_dir(), meta.len()),
                    Err(_) => (false, 0),
                };
                entries.push(ListedEntry { name, is_dir, size });
            }
        }

        entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
        Ok(entries)
    }

    pub async fn list(&self, path: &str, pattern: Option<&str>) -> Result<String, FsError> {
        let entries = self.list_entries(path, pattern).await?;
        if entries.is_empty() {
            return Ok(out::directory_empty(path));
        }

        let mut lines = vec![out::directory_header(path)];
        for entry in &entries {
            if entry.is_dir {
                lines.push(out::directory_line(&entry.name));
            } else {
                lines.push(out::file_line(&entry.name, &format_size(entry.size)));
            }
        }
        Ok(lines.join("\n"))
    }

    pub async fn mkdir(&self, path: &str, parents: bool) -> Result<String, FsError> {
        let full = self.guard.resolve(path)?;
        if exists(&full).await? {
            return Err(FsError::AlreadyExists(path.to_string()));
        }

        let created = if parents {
            tokio::fs::create_dir_all(&full).await
        } else {
            tokio::fs::create_dir(&full).await
        };
        created.map_err(FsError::io("create directory"))?;
        Ok(out::directory_created(path))
    }

    /// Relocate a file. Both sides go through the guard.
    pub async fn relocate(&self, source: &str, destination: &str) -> Result<String, FsError> {
        let from = self.guard.resolve(source)?;
        let to = self.guard.resolve(destination)?;

        expect_kind(&from, source, EntryKind::File).await?;
        if exists(&to).await? {
            return Err(FsError::AlreadyExists(destination.to_string()));
        }
        if let Some(parent) = to.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(FsError::io("create parent directories"))?;
        }

        match tokio::fs::rename(&from, &to).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                tracing::debug!(error = %e, "rename crosses devices, copying instead");
                copy_then_remove(&from, &to).await?;
            }
            Err(e) => {
                return Err(FsError::Io {
                    action: "move",
                    source: e,
                });
            }
        }
        Ok(out::file_moved(source, destination))
    }

    pub async fn info(&self, path: &str) -> Result<String, FsError> {
        let full = self.guard.resolve(path)?;
        let meta = metadata(&full, path).await?;

        let name = match full.file_name() {
            Some(name) => name.to_string_lossy().to_string(),
            None => ".".to_string(),
        };
        let kind = if meta.is_dir() { "directory" } else { "file" };
        let size = meta.len();

        let fields = [
            ("name", name),
            ("path", self.guard.display_relative(&full)),
            ("type", kind.to_string()),
            ("size_bytes", size.to_string()),
            ("size_human", format_size(size)),
            ("created", format_time(meta.created())),
            ("modified", format_time(meta.modified())),
            ("permissions", permissions(&meta)),
        ];

        let mut lines = vec![out::info_header(path)];
        lines.extend(fields.iter().map(|(key, value)| out::info_line(key, value)));
        Ok(lines.join("\n"))
    }
}

/// Leaves exactly one copy: if the source cannot be removed, the new copy is.
async fn copy_then_remove(from: &Path, to: &Path) -> Result<(), FsError> {
    tokio::fs::copy(from, to)
        .await
        .map_err(FsError::io("move"))?;
    if let Err(e) = tokio::fs::remove_file(from).await {
        if let Err(cleanup) = tokio::fs::remove_file(to).await {
            tracing::warn!(path = %to.display(), error = %cleanup, "failed to remove partial move target");
        }
        return Err(FsError::Io {
            action: "move",
            source: e,
        });
    }
    Ok(())
}

/// `path` relative to `base`, `/`-separated so globs match the same on every platform.
fn relative_name(base: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Human-readable size. Below 1024 the raw byte count, otherwise one decimal
/// in the largest fitting unit. Display only.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} bytes");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

fn format_time(time: io::Result<SystemTime>) -> String {
    match time {
        Ok(time) => chrono::DateTime::<chrono::Local>::from(time)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        Err(_) => "unavailable".to_string(),
    }
}

#[cfg(unix)]
fn permissions(meta: &Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;
    format!("{:03o}", meta.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn permissions(meta: &Metadata) -> String {
    if meta.permissions().readonly() {
        "read-only".to_string()
    } else {
        "read-write".to_string()
    }
}

async fn metadata(full: &Path, display: &str) -> Result<Metadata, FsError> {
    match tokio::fs::metadata(full).await {
        Ok(meta) => Ok(meta),
        Err(e) if is_missing(&e) => Err(FsError::NotFound(display.to_string())),
        Err(e) => Err(FsError::Io {
            action: "stat",
            source: e,
        }),
    }
}

async fn expect_kind(full: &Path, display: &str, expected: EntryKind) -> Result<(), FsError> {
    let meta = metadata(full, display).await?;
    let matches = match expected {
        EntryKind::File => meta.is_file(),
        EntryKind::Directory => meta.is_dir(),
    };
    if matches {
        Ok(())
    } else {
        Err(FsError::WrongType {
            path: display.to_string(),
            expected,
        })
    }
}

async fn exists(full: &Path) -> Result<bool, FsError> {
    match tokio::fs::try_exists(full).await {
        Ok(found) => Ok(found),
        Err(e) if is_missing(&e) => Ok(false),
        Err(e) => Err(FsError::Io {
            action: "stat",
            source: e,
        }),
    }
}
