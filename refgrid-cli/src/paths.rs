//! Where the CLI keeps its settings database and logs.
//!
//! Follows platform conventions through `directories`: XDG on Linux,
//! `~/Library` on macOS, `AppData` on Windows.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use directories::ProjectDirs;

/// Archived logs kept next to `latest.log`.
const KEPT_LOGS: usize = 25;

const LATEST_LOG: &str = "latest.log";

fn dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "refgrid", "refgrid")
}

/// Default settings database, e.g. `~/.local/share/refgrid/settings.db`.
pub fn settings_db() -> Option<PathBuf> {
    dirs().map(|d| d.data_dir().join("settings.db"))
}

/// Log file for this run, e.g. `~/.cache/refgrid/latest.log`.
pub fn log_file() -> Option<PathBuf> {
    dirs().map(|d| d.cache_dir().join(LATEST_LOG))
}

/// Archives the previous run's log under a timestamp and prunes the oldest
/// archives in `log_dir`.
pub fn rotate_logs(log_dir: &Path) {
    let latest = log_dir.join(LATEST_LOG);
    if latest.exists() {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let _ = fs::rename(&latest, log_dir.join(format!("{}.log", stamp)));
    }
    prune_archives(log_dir, KEPT_LOGS);
}

fn prune_archives(log_dir: &Path, keep: usize) {
    let Ok(entries) = fs::read_dir(log_dir) else {
        return;
    };

    let mut archives: Vec<_> = entries
        .filter_map(Result::ok)
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            name.ends_with(".log") && name != LATEST_LOG
        })
        .collect();
    if archives.len() <= keep {
        return;
    }

    // Oldest first
    archives.sort_by_key(|entry| entry.metadata().and_then(|m| m.modified()).ok());
    let excess = archives.len() - keep;
    for entry in &archives[..excess] {
        let _ = fs::remove_file(entry.path());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prune_keeps_latest_and_newest() {
        let dir = std::env::temp_dir().join(format!("refgrid-logs-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        for i in 0..4 {
            fs::write(dir.join(format!("2024010{}_000000.log", i)), "").unwrap();
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
        fs::write(dir.join(LATEST_LOG), "").unwrap();

        prune_archives(&dir, 2);

        let mut names: Vec<String> = fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec!["20240102_000000.log", "20240103_000000.log", "latest.log"]
        );
        fs::remove_dir_all(&dir).unwrap();
    }
}
