//! Log bucketing by date.
//!
//! Node logs are saved as `<prefix>__<date><suffix>.log`, where the suffix is
//! a fixed-width time-of-day stamp (e.g. `node3__2019-05-03_1200.log`). Each
//! file is moved into a `<date>/` subdirectory of the logs directory.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::{debug, info};

/// Default logs directory, relative to the node working directory
pub const DEFAULT_LOGS_DIR: &str = "logs";

/// Characters after the date: time-of-day stamp plus the `.log` extension
const SUFFIX_LEN: usize = 9;

/// Outcome of an organize pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OrganizeReport {
    /// (from, to) pairs of moved files
    pub moved: Vec<(PathBuf, PathBuf)>,
    /// `.log` files whose names carry no recognizable date
    pub skipped: Vec<PathBuf>,
}

/// Extract the date a log file belongs to from its name
pub fn date_token(file_name: &str) -> Option<NaiveDate> {
    if !file_name.ends_with(".log") {
        return None;
    }
    let segment = file_name.split("__").nth(1)?;
    let cut = segment.len().checked_sub(SUFFIX_LEN)?;
    let token = segment.get(..cut)?;
    NaiveDate::parse_from_str(token, "%Y-%m-%d").ok()
}

/// Move every dated `.log` file in `logs_dir` into a per-date subdirectory
pub fn organize_logs(logs_dir: &Path) -> Result<OrganizeReport> {
    let mut entries = fs::read_dir(logs_dir)
        .wrap_err_with(|| format!("Failed to read logs directory '{}'", logs_dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()
        .wrap_err_with(|| format!("Failed to list logs directory '{}'", logs_dir.display()))?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut report = OrganizeReport::default();
    for entry in entries {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if !name.ends_with(".log") {
            continue;
        }

        let Some(date) = date_token(name) else {
            debug!("No date token in {}, leaving it in place", name);
            report.skipped.push(path);
            continue;
        };

        let bucket = logs_dir.join(date.format("%Y-%m-%d").to_string());
        fs::create_dir_all(&bucket)
            .wrap_err_with(|| format!("Failed to create log bucket '{}'", bucket.display()))?;
        let target = bucket.join(name);
        fs::rename(&path, &target)
            .wrap_err_with(|| format!("Failed to move '{}' to '{}'", path.display(), target.display()))?;
        report.moved.push((path, target));
    }

    info!(
        "Organized {} log files in {} ({} skipped)",
        report.moved.len(),
        logs_dir.display(),
        report.skipped.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_date_token() {
        assert_eq!(
            date_token("node3__2019-05-03_1200.log"),
            NaiveDate::from_ymd_opt(2019, 5, 3)
        );
        assert_eq!(
            date_token("hlx__2020-12-31-2359.log"),
            NaiveDate::from_ymd_opt(2020, 12, 31)
        );
        assert_eq!(date_token("node3.log"), None);
        assert_eq!(date_token("node3__short.log"), None);
        assert_eq!(date_token("node3__notadate_1200.log"), None);
        assert_eq!(date_token("node3__2019-05-03_1200.txt"), None);
    }

    #[test]
    fn test_organize_logs() {
        let temp_dir = TempDir::new().unwrap();
        let logs = temp_dir.path();
        fs::write(logs.join("node0__2019-05-03_1200.log"), "a").unwrap();
        fs::write(logs.join("node1__2019-05-03_1300.log"), "b").unwrap();
        fs::write(logs.join("node0__2019-05-04_0900.log"), "c").unwrap();
        fs::write(logs.join("undated.log"), "d").unwrap();
        fs::write(logs.join("notes.txt"), "e").unwrap();

        let report = organize_logs(logs).unwrap();

        assert_eq!(report.moved.len(), 3);
        assert_eq!(report.skipped, vec![logs.join("undated.log")]);
        assert!(logs.join("2019-05-03/node0__2019-05-03_1200.log").is_file());
        assert!(logs.join("2019-05-03/node1__2019-05-03_1300.log").is_file());
        assert!(logs.join("2019-05-04/node0__2019-05-04_0900.log").is_file());
        assert!(logs.join("notes.txt").is_file());

        // Already bucketed files live in subdirectories and are left alone
        let again = organize_logs(logs).unwrap();
        assert!(again.moved.is_empty());
    }

    #[test]
    fn test_missing_logs_dir() {
        let temp_dir = TempDir::new().unwrap();
        assert!(organize_logs(&temp_dir.path().join("absent")).is_err());
    }
}
