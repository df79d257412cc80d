use anyhow::{Context, bail};
use fs2::FileExt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Location of the single-instance lock for the daemon.
pub fn lock_path() -> PathBuf {
    let mut path = dirs::runtime_dir().unwrap_or(std::env::temp_dir());
    path.push("netsetupd.lock");
    path
}

/// Takes the daemon lock. The lock is held until the returned file is dropped.
pub fn acquire_daemon_lock() -> anyhow::Result<File> {
    acquire_lock_at(&lock_path())
}

pub fn acquire_lock_at(path: &Path) -> anyhow::Result<File> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create lock file {}", path.display()))?;

    // Exclusive lock; fails if another instance holds it
    if file.try_lock_exclusive().is_err() {
        bail!("Another instance is already running ({})", path.display());
    }

    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_lock_is_refused_until_first_is_dropped() {
        let path = std::env::temp_dir().join(format!("netsetupd-test-{}.lock", std::process::id()));

        let first = acquire_lock_at(&path).unwrap();
        assert!(acquire_lock_at(&path).is_err());

        drop(first);
        assert!(acquire_lock_at(&path).is_ok());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn lock_file_is_named_after_daemon() {
        assert!(lock_path().ends_with("netsetupd.lock"));
    }
}
