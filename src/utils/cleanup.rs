//! Node state cleanup.
//!
//! Removes the ledger databases, snapshot files and database log a node
//! leaves in its working directory, so the next run starts fresh against the
//! newly generated topology. Every target is removed independently and a
//! missing target is not an error.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};

/// Database directories (and the database log) left by a node
pub const DB_TARGETS: &[&str] = &[
    "db",
    "hxi",
    "spent-addresses-log",
    "spent-addresses-db",
    "mainnet.log",
    "mainnetdb",
];

/// Local snapshot state and metadata files, with their backups
pub const SNAPSHOT_TARGETS: &[&str] = &[
    "mainnet.snapshot.meta",
    "mainnet.snapshot.state",
    "mainnet.snapshot.meta.bkp",
    "mainnet.snapshot.state.bkp",
];

/// Outcome of a cleanup pass
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Targets that existed and were removed
    pub removed: Vec<PathBuf>,
    /// Targets that were already absent
    pub missing: Vec<PathBuf>,
    /// Targets that exist but could not be removed
    pub failed: Vec<(PathBuf, io::Error)>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Remove a file or directory tree.
///
/// Returns `Ok(false)` when nothing exists at `path`.
pub fn remove_path(path: &Path) -> io::Result<bool> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };

    if metadata.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(true)
}

/// Remove all database and snapshot targets below `dir`
pub fn clean_node_state(dir: &Path) -> CleanupReport {
    let mut report = CleanupReport::default();

    for target in DB_TARGETS.iter().chain(SNAPSHOT_TARGETS) {
        let path = dir.join(target);
        match remove_path(&path) {
            Ok(true) => {
                info!("Removed {}", path.display());
                report.removed.push(path);
            }
            Ok(false) => {
                info!("{} does not exist", path.display());
                report.missing.push(path);
            }
            Err(e) => {
                warn!("Failed to remove {}: {}", path.display(), e);
                report.failed.push((path, e));
            }
        }
    }

    report
}
