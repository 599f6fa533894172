//! File collection for one batch run.
//!
//! Walks the target tree, keeps files whose extension matches the
//! configured set, and cuts the batch off the first time a candidate
//! would push the running byte total over the cap. The cutoff is
//! global: once hit, nothing after it is considered, not even smaller
//! files in sibling directories — they wait for the next run.

use filetime::FileTime;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// One file selected for conversion. Timestamps are captured at
/// collection time so the worker can stamp them onto the output even
/// after the source is gone.
#[derive(Debug, Clone)]
pub struct FileTask {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified: FileTime,
    pub accessed: FileTime,
}

/// A size-bounded batch, sorted ascending by modification time.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub tasks: Vec<FileTask>,
    pub total_bytes: u64,
}

impl Batch {
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }
}

fn extension_lowercase(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    let ext = extension_lowercase(path);
    !ext.is_empty() && extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext))
}

/// Collect at most `max_batch_bytes` worth of matching files under
/// `root`, oldest-modified first.
///
/// Traversal order is sorted by file name so the same tree always
/// yields the same batch. Infallible: unreadable entries are skipped
/// and a tree with no matches is an empty batch.
pub fn collect(root: &Path, extensions: &[&str], max_batch_bytes: u64) -> Batch {
    let mut tasks: Vec<FileTask> = Vec::new();
    let mut total_bytes: u64 = 0;

    let walker = WalkDir::new(root).sort_by_file_name();

    'walk: for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if !has_extension(entry.path(), extensions) {
            continue;
        }

        let meta = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                debug!(path = %entry.path().display(), error = %e, "Skipping unstatable file");
                continue;
            }
        };
        let size = meta.len();

        if total_bytes + size > max_batch_bytes {
            debug!(
                path = %entry.path().display(),
                size,
                total_bytes,
                max_batch_bytes,
                "Batch cap reached, stopping collection"
            );
            break 'walk;
        }

        tasks.push(FileTask {
            path: entry.path().to_path_buf(),
            size_bytes: size,
            modified: FileTime::from_last_modification_time(&meta),
            accessed: FileTime::from_last_access_time(&meta),
        });
        total_bytes += size;
    }

    tasks.sort_by_key(|t| t.modified);

    Batch { tasks, total_bytes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_file(dir: &Path, name: &str, size: usize) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, vec![0u8; size]).unwrap();
        path
    }

    fn set_mtime(path: &Path, unix_secs: i64) {
        filetime::set_file_mtime(path, FileTime::from_unix_time(unix_secs, 0)).unwrap();
    }

    #[test]
    fn test_empty_dir_yields_empty_batch() {
        let temp = TempDir::new().unwrap();
        let batch = collect(temp.path(), &["ts", "flv"], 1024);
        assert!(batch.is_empty());
        assert_eq!(batch.total_bytes, 0);
    }

    #[test]
    fn test_non_matching_extensions_yield_empty_batch() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "a.mp4", 10);
        create_file(temp.path(), "b.mkv", 10);
        create_file(temp.path(), "noext", 10);
        let batch = collect(temp.path(), &["ts", "flv"], 1024);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "upper.TS", 10);
        create_file(temp.path(), "mixed.Flv", 10);
        let batch = collect(temp.path(), &["ts", "flv"], 1024);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_recursive_collection() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "top.ts", 10);
        create_file(temp.path(), "sub/nested.flv", 20);
        create_file(temp.path(), "sub/deeper/more.ts", 30);
        let batch = collect(temp.path(), &["ts", "flv"], 1024);
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.total_bytes, 60);
    }

    #[test]
    fn test_sorted_by_mtime_ascending() {
        let temp = TempDir::new().unwrap();
        let newest = create_file(temp.path(), "a.ts", 10);
        let oldest = create_file(temp.path(), "b.ts", 10);
        let middle = create_file(temp.path(), "c.ts", 10);
        set_mtime(&newest, 3_000);
        set_mtime(&oldest, 1_000);
        set_mtime(&middle, 2_000);

        let batch = collect(temp.path(), &["ts"], 1024);
        let paths: Vec<_> = batch.tasks.iter().map(|t| t.path.clone()).collect();
        assert_eq!(paths, vec![oldest, middle, newest]);
    }

    #[test]
    fn test_cap_halts_traversal_globally() {
        let temp = TempDir::new().unwrap();
        // Name-sorted order: a.ts (60), b.ts (60), z/tiny.ts (1).
        // The cap of 100 is hit at b.ts; the tiny file after it must
        // NOT be picked up even though it would fit.
        create_file(temp.path(), "a.ts", 60);
        create_file(temp.path(), "b.ts", 60);
        create_file(temp.path(), "z/tiny.ts", 1);

        let batch = collect(temp.path(), &["ts"], 100);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.tasks[0].path.file_name().unwrap(), "a.ts");
        assert_eq!(batch.total_bytes, 60);
    }

    #[test]
    fn test_exact_fit_is_accepted() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "a.ts", 50);
        create_file(temp.path(), "b.ts", 50);
        let batch = collect(temp.path(), &["ts"], 100);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.total_bytes, 100);
    }

    #[test]
    fn test_task_carries_timestamps_and_size() {
        let temp = TempDir::new().unwrap();
        let path = create_file(temp.path(), "clip.flv", 42);
        set_mtime(&path, 1_600_000_000);

        let batch = collect(temp.path(), &["flv"], 1024);
        assert_eq!(batch.len(), 1);
        let task = &batch.tasks[0];
        assert_eq!(task.size_bytes, 42);
        assert_eq!(task.modified.unix_seconds(), 1_600_000_000);
    }

    proptest! {
        #[test]
        fn prop_batch_never_exceeds_cap_and_is_sorted(
            sizes in prop::collection::vec(0u64..5_000, 0..20),
            cap in 0u64..40_000,
        ) {
            let temp = TempDir::new().unwrap();
            for (i, size) in sizes.iter().enumerate() {
                let path = create_file(temp.path(), &format!("f{:03}.ts", i), *size as usize);
                set_mtime(&path, 1_000_000 + (i as i64 % 7) * 100);
            }

            let batch = collect(temp.path(), &["ts"], cap);

            prop_assert!(batch.total_bytes <= cap);
            let sum: u64 = batch.tasks.iter().map(|t| t.size_bytes).sum();
            prop_assert_eq!(sum, batch.total_bytes);
            for pair in batch.tasks.windows(2) {
                prop_assert!(pair[0].modified <= pair[1].modified);
            }
        }
    }
}
