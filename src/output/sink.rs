//! Artifact sinks.
//!
//! A sink stores one artifact per node, keyed by node identifier. Storing the
//! same node twice replaces the earlier artifact.
//!
//! A directory that already holds artifacts from an earlier run is refused
//! unless the caller asks to overwrite. With overwrite, artifacts the new run
//! did not rewrite are removed by `DirectorySink::remove_stale`, so the
//! directory never mixes two topologies.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use super::format::{render, ArtifactFormat};
use super::settings::NodeSettings;
use crate::node::NodeRecord;
use crate::topology::NodeId;

/// Errors that can occur while storing node artifacts
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to create output directory '{}'", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to list output directory '{}'", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "output directory '{}' already holds {} artifact(s) from an earlier run; pass --overwrite to replace them",
        path.display(),
        existing.len()
    )]
    ExistingArtifacts { path: PathBuf, existing: Vec<PathBuf> },

    #[error("failed to remove stale artifact '{}'", path.display())]
    RemoveStale {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write artifact for node {node} to '{}'", path.display())]
    Write {
        node: NodeId,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize artifact for node {node}")]
    Serialize {
        node: NodeId,
        #[source]
        source: serde_json::Error,
    },
}

/// Destination for finished node records
pub trait ConfigSink {
    /// Durably store `record`, keyed by its node identifier
    fn store(&mut self, record: &NodeRecord) -> Result<(), SinkError>;
}

/// Writes `config{id}.{ext}` files into a shared output directory
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    format: ArtifactFormat,
    settings: NodeSettings,
    /// Artifacts found in `dir` before this run, in any format
    existing: Vec<PathBuf>,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    /// Create the sink, creating `dir` if it does not exist yet.
    ///
    /// Fails with `SinkError::ExistingArtifacts` when `dir` already holds
    /// artifacts and `overwrite` is false.
    pub fn new(
        dir: impl Into<PathBuf>,
        format: ArtifactFormat,
        settings: NodeSettings,
        overwrite: bool,
    ) -> Result<Self, SinkError> {
        let dir = dir.into();
        let existing = if dir.is_dir() {
            existing_artifacts(&dir)?
        } else {
            info!("Creating output directory {:?}", dir);
            Vec::new()
        };

        if !existing.is_empty() {
            if !overwrite {
                return Err(SinkError::ExistingArtifacts {
                    path: dir,
                    existing,
                });
            }
            warn!(
                "Overwriting {} artifact(s) from an earlier run in {:?}",
                existing.len(),
                dir
            );
        }

        fs::create_dir_all(&dir).map_err(|source| SinkError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        Ok(Self {
            dir,
            format,
            settings,
            existing,
            written: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the artifact for `node` is written to
    pub fn path_for(&self, node: NodeId) -> PathBuf {
        self.dir.join(self.format.file_name(node))
    }

    /// Artifacts written so far, in write order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Delete artifacts of an earlier run that this run did not rewrite.
    ///
    /// Call after every record is stored. Returns the removed paths.
    pub fn remove_stale(&mut self) -> Result<Vec<PathBuf>, SinkError> {
        let stale: Vec<PathBuf> = self
            .existing
            .drain(..)
            .filter(|path| !self.written.contains(path))
            .collect();

        for path in &stale {
            fs::remove_file(path).map_err(|source| SinkError::RemoveStale {
                path: path.clone(),
                source,
            })?;
        }
        if !stale.is_empty() {
            warn!("Removed {} stale artifact(s): {:?}", stale.len(), stale);
        }
        Ok(stale)
    }
}

/// Artifact files (`config{id}.{ini,json}`) directly inside `dir`, sorted
pub fn existing_artifacts(dir: &Path) -> Result<Vec<PathBuf>, SinkError> {
    let read_err = |source| SinkError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut found = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if ArtifactFormat::ALL
            .iter()
            .any(|format| format.parse_file_name(name).is_some())
        {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

impl ConfigSink for DirectorySink {
    fn store(&mut self, record: &NodeRecord) -> Result<(), SinkError> {
        let node = record.node();
        let content = render(record, &self.settings, self.format)
            .map_err(|source| SinkError::Serialize { node, source })?;

        let path = self.path_for(node);
        fs::write(&path, content).map_err(|source| SinkError::Write {
            node,
            path: path.clone(),
            source,
        })?;

        debug!("Wrote node {} artifact to {:?}", node, path);
        self.written.push(path);
        Ok(())
    }
}

/// Keeps rendered artifacts in memory, keyed by node identifier
#[derive(Debug, Default)]
pub struct MemorySink {
    format: ArtifactFormat,
    settings: NodeSettings,
    artifacts: BTreeMap<NodeId, String>,
}

impl MemorySink {
    pub fn new(format: ArtifactFormat, settings: NodeSettings) -> Self {
        Self {
            format,
            settings,
            artifacts: BTreeMap::new(),
        }
    }

    pub fn get(&self, node: NodeId) -> Option<&str> {
        self.artifacts.get(&node).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn into_artifacts(self) -> BTreeMap<NodeId, String> {
        self.artifacts
    }
}

impl ConfigSink for MemorySink {
    fn store(&mut self, record: &NodeRecord) -> Result<(), SinkError> {
        let node = record.node();
        let content = render(record, &self.settings, self.format)
            .map_err(|source| SinkError::Serialize { node, source })?;
        self.artifacts.insert(node, content);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::{BasePorts, PortCounters};
    use tempfile::TempDir;

    fn isolated_record() -> NodeRecord {
        let (ports, _) = PortCounters::new(BasePorts::default()).allocate().unwrap();
        NodeRecord {
            ports,
            neighbors: Vec::new(),
        }
    }

    #[test]
    fn test_directory_sink_creates_dir_and_writes() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("many_configs");
        assert!(!out.exists());

        let mut sink =
            DirectorySink::new(&out, ArtifactFormat::Ini, NodeSettings::new(), false).unwrap();
        sink.store(&isolated_record()).unwrap();

        let path = out.join("config0.ini");
        assert!(path.is_file());
        assert_eq!(sink.written(), &[path.clone()]);
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("#NODE 0 CONFIG\n"));
    }

    #[test]
    fn test_directory_sink_reuses_existing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let mut sink =
            DirectorySink::new(temp_dir.path(), ArtifactFormat::Json, NodeSettings::new(), false)
                .unwrap();
        sink.store(&isolated_record()).unwrap();
        // Second store of the same node replaces the artifact
        sink.store(&isolated_record()).unwrap();
        assert!(temp_dir.path().join("config0.json").is_file());
    }

    #[test]
    fn test_directory_sink_fails_on_file_path() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not_a_dir");
        fs::write(&blocker, "x").unwrap();

        let result = DirectorySink::new(&blocker, ArtifactFormat::Ini, NodeSettings::new(), true);
        assert!(matches!(result, Err(SinkError::CreateDir { .. })));
    }

    fn record_for(node: usize) -> NodeRecord {
        let mut counters = PortCounters::new(BasePorts::default());
        loop {
            let (ports, next) = counters.allocate().unwrap();
            if ports.node == node {
                return NodeRecord {
                    ports,
                    neighbors: Vec::new(),
                };
            }
            counters = next;
        }
    }

    #[test]
    fn test_existing_artifacts_refused_without_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("config0.ini"), "old").unwrap();
        fs::write(temp_dir.path().join("config7.json"), "old").unwrap();
        fs::write(temp_dir.path().join("README"), "keep").unwrap();

        let result = DirectorySink::new(temp_dir.path(), ArtifactFormat::Ini, NodeSettings::new(), false);
        match result {
            Err(SinkError::ExistingArtifacts { existing, .. }) => {
                assert_eq!(
                    existing,
                    vec![temp_dir.path().join("config0.ini"), temp_dir.path().join("config7.json")]
                );
            }
            other => panic!("expected ExistingArtifacts, got {:?}", other),
        }
        assert_eq!(fs::read_to_string(temp_dir.path().join("config0.ini")).unwrap(), "old");
    }

    #[test]
    fn test_overwrite_removes_stale_artifacts() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        for node in 0..4 {
            fs::write(dir.join(format!("config{}.ini", node)), "old").unwrap();
        }
        fs::write(dir.join("notes.txt"), "keep").unwrap();

        let mut sink = DirectorySink::new(dir, ArtifactFormat::Ini, NodeSettings::new(), true).unwrap();
        sink.store(&record_for(0)).unwrap();
        sink.store(&record_for(1)).unwrap();
        let removed = sink.remove_stale().unwrap();

        assert_eq!(removed, vec![dir.join("config2.ini"), dir.join("config3.ini")]);
        assert!(!dir.join("config2.ini").exists());
        assert!(!dir.join("config3.ini").exists());
        assert!(fs::read_to_string(dir.join("config1.ini")).unwrap().starts_with("#NODE 1 CONFIG"));
        assert!(dir.join("notes.txt").is_file());

        // Nothing left to remove on a second call
        assert!(sink.remove_stale().unwrap().is_empty());
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::new(ArtifactFormat::Ini, NodeSettings::new());
        assert!(sink.is_empty());
        sink.store(&isolated_record()).unwrap();
        assert_eq!(sink.len(), 1);
        assert!(sink.get(0).unwrap().contains("API_PORT = 14000"));
        assert!(sink.get(1).is_none());
    }
}
