use crate::security::TMP_MARKER;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{error, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Temp files younger than this may still belong to a running write.
const STALE_AFTER: Duration = Duration::from_secs(300);

pub(crate) async fn purge_tmp(root: &Path) {
    let root = root.to_path_buf();
    let now = SystemTime::now();

    match tokio::task::spawn_blocking(move || remove_stale(&root, now, STALE_AFTER)).await {
        Ok((removed, failed)) if removed > 0 || failed > 0 => {
            info!(removed, failed, "Cleaned up temporary files");
        },
        Err(e) => {
            error!(error = %e, "Temp file cleanup task panicked");
        },
        _ => {},
    }
}

fn remove_stale(root: &Path, now: SystemTime, threshold: Duration) -> (usize, usize) {
    let mut removed = 0;
    let mut failed = 0;

    for entry in WalkDir::new(root).min_depth(1).into_iter().flatten() {
        if !is_tmp(&entry) || !is_stale(&entry, now, threshold) {
            continue;
        }
        match std::fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "Failed to remove temp file");
                failed += 1;
            },
        }
    }

    (removed, failed)
}

fn is_tmp(entry: &DirEntry) -> bool {
    entry.file_type().is_file()
        && entry.file_name().to_str().is_some_and(|name| name.contains(TMP_MARKER))
}

fn is_stale(entry: &DirEntry, now: SystemTime, threshold: Duration) -> bool {
    entry
        .metadata()
        .ok()
        .and_then(|m| m.modified().ok())
        .and_then(|modified| now.duration_since(modified).ok())
        .is_none_or(|age| age > threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_only_stale_temp_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("images/owner");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("1-a.png"), b"kept").unwrap();
        std::fs::write(dir.join(format!("1-b.png{TMP_MARKER}7")), b"orphan").unwrap();

        let later = SystemTime::now() + Duration::from_secs(3600);
        let (removed, failed) = remove_stale(tmp.path(), later, STALE_AFTER);

        assert_eq!((removed, failed), (1, 0));
        assert!(dir.join("1-a.png").exists());
    }

    #[test]
    fn fresh_temp_files_survive() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(format!("x.png{TMP_MARKER}1")), b"in flight").unwrap();

        let (removed, _) = remove_stale(tmp.path(), SystemTime::now(), STALE_AFTER);
        assert_eq!(removed, 0);
    }
}
