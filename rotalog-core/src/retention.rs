/*!
Retention of archive files.

Archive names start with an ISO date, so sorting by name sorts oldest first.
*/

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::Result;

/// Maximum number of archive files to keep in the log directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionLimit {
    /// Never delete archives
    Unlimited,
    /// Keep at most this many archives
    MaxFiles(usize),
}

impl RetentionLimit {
    /// Interpret a configured file count; any negative value means unlimited.
    pub fn from_max_files(max_log_files: i64) -> Self {
        match usize::try_from(max_log_files) {
            Ok(max) => Self::MaxFiles(max),
            Err(_) => Self::Unlimited,
        }
    }
}

/// When the log prunes old archives on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionCadence {
    /// Prune right before a write creates a new day's archive
    #[default]
    OnRotation,
    /// Only prune when `enforce_retention` is called
    Manual,
}

/// Regular files directly under `dir`, sorted by name ascending.
///
/// Subdirectories are skipped. A directory that does not exist yet holds no archives.
pub fn list_archives(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Delete the oldest archives under `dir` until at most `keep` remain.
///
/// Returns the deleted paths. Stops at the first deletion failure, which may
/// leave more than `keep` files behind.
pub fn prune_oldest(dir: &Path, keep: usize) -> Result<Vec<PathBuf>> {
    let files = list_archives(dir)?;
    let excess = files.len().saturating_sub(keep);

    let mut removed = Vec::with_capacity(excess);
    for path in files.into_iter().take(excess) {
        fs::remove_file(&path)?;
        info!(archive = %path.display(), "Removed expired archive");
        removed.push(path);
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seed(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(name), b"archive").unwrap();
        }
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_retention_limit_from_max_files() {
        assert_eq!(RetentionLimit::from_max_files(-1), RetentionLimit::Unlimited);
        assert_eq!(RetentionLimit::from_max_files(i64::MIN), RetentionLimit::Unlimited);
        assert_eq!(RetentionLimit::from_max_files(0), RetentionLimit::MaxFiles(0));
        assert_eq!(RetentionLimit::from_max_files(7), RetentionLimit::MaxFiles(7));
    }

    #[test]
    fn test_list_archives_sorted_and_skips_directories() {
        let temp_dir = TempDir::new().unwrap();
        seed(temp_dir.path(), &["2024-01-03.tar.gz", "2024-01-01.tar.gz", "2024-01-02.tar.gz"]);
        fs::create_dir(temp_dir.path().join("2023-12-31.tar.gz")).unwrap();

        let files = list_archives(temp_dir.path()).unwrap();
        assert_eq!(
            names(&files),
            vec!["2024-01-01.tar.gz", "2024-01-02.tar.gz", "2024-01-03.tar.gz"]
        );
    }

    #[test]
    fn test_list_archives_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let files = list_archives(&temp_dir.path().join("not-created-yet")).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_prune_oldest_keeps_newest() {
        let temp_dir = TempDir::new().unwrap();
        seed(
            temp_dir.path(),
            &[
                "2024-01-01.tar.gz",
                "2024-01-02.tar.gz",
                "2024-01-03.tar.gz",
                "2024-01-04.tar.gz",
                "2024-01-05.tar.gz",
            ],
        );

        let removed = prune_oldest(temp_dir.path(), 3).unwrap();
        assert_eq!(names(&removed), vec!["2024-01-01.tar.gz", "2024-01-02.tar.gz"]);

        let left = list_archives(temp_dir.path()).unwrap();
        assert_eq!(
            names(&left),
            vec!["2024-01-03.tar.gz", "2024-01-04.tar.gz", "2024-01-05.tar.gz"]
        );
    }

    #[test]
    fn test_prune_under_limit_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        seed(temp_dir.path(), &["2024-01-01.tar.gz", "2024-01-02.tar.gz"]);

        assert!(prune_oldest(temp_dir.path(), 5).unwrap().is_empty());
        assert_eq!(list_archives(temp_dir.path()).unwrap().len(), 2);
    }

    #[test]
    fn test_prune_to_zero() {
        let temp_dir = TempDir::new().unwrap();
        seed(temp_dir.path(), &["2024-01-01.tar.gz", "2024-01-02.tar.gz"]);

        assert_eq!(prune_oldest(temp_dir.path(), 0).unwrap().len(), 2);
        assert!(list_archives(temp_dir.path()).unwrap().is_empty());
    }
}
