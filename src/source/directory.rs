//! Directory source
//!
//! Walks a directory (optionally recursing) and reports regular files whose
//! modification time is newer than the watermark.

use super::types::{CandidateSource, FileEntry, SourceKind};
use crate::error::{Error, Result};
use crate::types::Watermark;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default recursion limit below the watched directory
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Default cap on files reported per evaluation
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// A watched local directory
#[derive(Debug, Clone)]
pub struct DirectorySource {
    directory: PathBuf,
    recursive: bool,
    max_depth: usize,
    max_entries: usize,
}

impl DirectorySource {
    /// Watch the top level of `directory`
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            recursive: false,
            max_depth: DEFAULT_MAX_DEPTH,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    /// Descend into subdirectories
    #[must_use]
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Limit recursion depth (0 = top level only)
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Limit files reported per evaluation
    #[must_use]
    pub fn max_entries(mut self, entries: usize) -> Self {
        self.max_entries = entries.max(1);
        self
    }

    /// The watched directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    async fn check_directory(&self) -> Result<()> {
        match tokio::fs::metadata(&self.directory).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(Error::unreachable(format!(
                "Not a directory: {}",
                self.directory.display()
            ))),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::unreachable(format!(
                "Directory not found: {}",
                self.directory.display()
            ))),
            Err(e) => Err(Error::unreachable(format!(
                "Cannot access directory {}: {e}",
                self.directory.display()
            ))),
        }
    }

    /// Stat one directory entry, returning `None` for anything that is not
    /// a regular file. Symlinks are resolved for files but never descended.
    async fn stat_file(&self, path: &Path) -> Result<Option<FileEntry>> {
        let meta = tokio::fs::metadata(path).await?;
        if !meta.is_file() {
            return Ok(None);
        }
        let modified = Watermark::from_system_time(meta.modified()?)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Some(FileEntry {
            path: path.to_path_buf(),
            file_name,
            size: meta.len(),
            modified,
            directory: self.directory.clone(),
        }))
    }
}

#[async_trait]
impl CandidateSource for DirectorySource {
    type Item = FileEntry;

    fn kind(&self) -> SourceKind {
        SourceKind::Filesystem
    }

    fn location(&self) -> String {
        self.directory.display().to_string()
    }

    async fn fetch(&self, after: Watermark) -> Result<Vec<FileEntry>> {
        self.check_directory().await?;

        let mut files = Vec::new();
        let mut pending = vec![(self.directory.clone(), 0usize)];

        while let Some((dir, depth)) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if dir == self.directory => {
                    return Err(Error::unreachable(format!(
                        "Cannot list directory {}: {e}",
                        dir.display()
                    )));
                }
                Err(e) => {
                    warn!("Skipping unreadable directory {}: {e}", dir.display());
                    continue;
                }
            };

            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(e) => {
                        warn!("Error listing {}: {e}", dir.display());
                        break;
                    }
                };
                let path = entry.path();

                let file_type = match entry.file_type().await {
                    Ok(ft) => ft,
                    Err(e) => {
                        warn!("Skipping {}: {e}", path.display());
                        continue;
                    }
                };

                if file_type.is_dir() {
                    if self.recursive && depth < self.max_depth {
                        pending.push((path, depth + 1));
                    }
                    continue;
                }

                match self.stat_file(&path).await {
                    Ok(Some(file)) if file.modified.is_after(after) => files.push(file),
                    Ok(_) => {}
                    Err(e) => warn!("Skipping {}: {e}", path.display()),
                }
            }
        }

        let found = files.len();
        let files = take_oldest(files, self.max_entries);
        if files.len() < found {
            debug!(
                "Deferring {} of {found} new files in {} to the next evaluation",
                found - files.len(),
                self.directory.display()
            );
        }
        Ok(files)
    }
}

/// Keep at most `limit` of the oldest files.
///
/// Files sharing a timestamp with the first deferred file are deferred too,
/// otherwise the advanced watermark would equal their timestamp and they
/// would never be picked up. If that leaves nothing, the whole oldest
/// timestamp group is kept even when it exceeds the limit.
fn take_oldest(mut files: Vec<FileEntry>, limit: usize) -> Vec<FileEntry> {
    if files.len() <= limit {
        return files;
    }

    files.sort_by(|a, b| {
        a.modified
            .seconds()
            .total_cmp(&b.modified.seconds())
            .then_with(|| a.path.cmp(&b.path))
    });

    let boundary = files[limit].modified;
    let mut keep = files[..limit]
        .iter()
        .take_while(|f| f.modified.is_after(boundary) || boundary.is_after(f.modified))
        .count();

    if keep == 0 {
        keep = files
            .iter()
            .take_while(|f| !f.modified.is_after(boundary))
            .count();
    }

    files.truncate(keep);
    files
}

#[cfg(test)]
mod take_oldest_tests {
    use super::*;

    fn at(name: &str, ts: f64) -> FileEntry {
        FileEntry {
            path: PathBuf::from(name),
            file_name: name.to_string(),
            size: 0,
            modified: Watermark::new(ts).unwrap(),
            directory: PathBuf::from("."),
        }
    }

    fn names(files: &[FileEntry]) -> Vec<&str> {
        files.iter().map(|f| f.file_name.as_str()).collect()
    }

    #[test]
    fn test_under_limit_is_untouched() {
        let files = vec![at("b", 2.0), at("a", 1.0)];
        assert_eq!(names(&take_oldest(files, 5)), vec!["b", "a"]);
    }

    #[test]
    fn test_keeps_oldest() {
        let files = vec![at("c", 3.0), at("a", 1.0), at("b", 2.0)];
        assert_eq!(names(&take_oldest(files, 2)), vec!["a", "b"]);
    }

    #[test]
    fn test_defers_ties_at_boundary() {
        let files = vec![at("a", 1.0), at("b", 2.0), at("c", 2.0)];
        assert_eq!(names(&take_oldest(files, 2)), vec!["a"]);
    }

    #[test]
    fn test_keeps_whole_group_when_nothing_else_fits() {
        let files = vec![at("a", 1.0), at("b", 1.0), at("c", 1.0), at("d", 2.0)];
        assert_eq!(names(&take_oldest(files, 2)), vec!["a", "b", "c"]);
    }
}
