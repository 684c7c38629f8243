use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::info;

use crate::error::{ImportError, Result};

/// Move one committed file into the archive, keeping its filename. Rename
/// first; shares mounted elsewhere need the copy+remove fallback. No retry:
/// a failure leaves the source file inbound for the next run.
pub fn archive_file(path: &Path, archive_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(archive_dir)?;
    let file_name = path
        .file_name()
        .ok_or_else(|| ImportError::Archive(format!("{} has no filename", path.display())))?;
    let dest = archive_dir.join(file_name);
    if std::fs::rename(path, &dest).is_err() {
        std::fs::copy(path, &dest)
            .and_then(|_| std::fs::remove_file(path))
            .map_err(|e| ImportError::Archive(format!("{}: {e}", path.display())))?;
    }
    Ok(dest)
}

/// Delete the oldest archive entries (by modification time) until the
/// directory holds at most `max_files`. Returns how many were removed.
pub fn prune_archive(archive_dir: &Path, max_files: usize) -> Result<usize> {
    let mut entries: Vec<(PathBuf, SystemTime)> = Vec::new();
    for entry in std::fs::read_dir(archive_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        entries.push((path, modified));
    }
    entries.sort_by_key(|(_, modified)| *modified);

    let excess = entries.len().saturating_sub(max_files);
    for (path, _) in entries.iter().take(excess) {
        std::fs::remove_file(path)?;
        info!("pruned {} from archive", path.display());
    }
    Ok(excess)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, name).unwrap();
        path
    }

    fn names_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_archive_file_moves_and_keeps_name() {
        let inbound = tempfile::tempdir().unwrap();
        let archive = tempfile::tempdir().unwrap();
        let src = write_file(inbound.path(), "totals.txt");
        let dest = archive_file(&src, archive.path()).unwrap();
        assert!(!src.exists());
        assert!(dest.exists());
        assert_eq!(dest, archive.path().join("totals.txt"));
    }

    #[test]
    fn test_archive_file_creates_archive_dir() {
        let inbound = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let archive = root.path().join("data").join("archive");
        let src = write_file(inbound.path(), "totals.txt");
        archive_file(&src, &archive).unwrap();
        assert!(archive.join("totals.txt").exists());
    }

    #[test]
    fn test_prune_archive_removes_oldest_first() {
        let archive = tempfile::tempdir().unwrap();
        for name in ["old.txt", "mid.txt", "new.txt"] {
            write_file(archive.path(), name);
            // mtime granularity
            std::thread::sleep(std::time::Duration::from_millis(25));
        }
        let removed = prune_archive(archive.path(), 2).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(names_in(archive.path()), vec!["mid.txt", "new.txt"]);
    }

    #[test]
    fn test_prune_archive_noop_under_cap() {
        let archive = tempfile::tempdir().unwrap();
        write_file(archive.path(), "a.txt");
        write_file(archive.path(), "b.txt");
        let removed = prune_archive(archive.path(), 180).unwrap();
        assert_eq!(removed, 0);
        assert_eq!(names_in(archive.path()).len(), 2);
    }

    #[test]
    fn test_prune_archive_to_exact_cap() {
        let archive = tempfile::tempdir().unwrap();
        for i in 0..5 {
            write_file(archive.path(), &format!("f{i}.txt"));
            std::thread::sleep(std::time::Duration::from_millis(25));
        }
        let removed = prune_archive(archive.path(), 3).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(names_in(archive.path()), vec!["f2.txt", "f3.txt", "f4.txt"]);
    }
}
