//! Plugin releases and their per-plugin history

use std::cell::OnceCell;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::coordinate::ArtifactCoordinate;
use crate::error::Result;
use crate::manifest::ManifestAttributes;
use crate::repository::Repository;

/// One released plugin archive.
///
/// Timestamp, digest and manifest are fetched through the repository on
/// first use and kept for the lifetime of this value. Failures are not
/// remembered, so a later call retries.
#[derive(Debug, Clone)]
pub struct Hpi {
    pub artifact: ArtifactCoordinate,
    timestamp: OnceCell<DateTime<Utc>>,
    digest: OnceCell<String>,
    manifest: OnceCell<ManifestAttributes>,
}

impl Hpi {
    pub fn new(artifact: ArtifactCoordinate) -> Self {
        Self {
            artifact,
            timestamp: OnceCell::new(),
            digest: OnceCell::new(),
            manifest: OnceCell::new(),
        }
    }

    pub fn version(&self) -> &str {
        &self.artifact.version
    }

    pub fn is_equal_to(&self, group_id: &str, artifact_id: &str, version: &str) -> bool {
        self.artifact.matches(group_id, artifact_id, version)
    }

    /// When the archive was published to the repository
    pub fn timestamp(&self, repository: &dyn Repository) -> Result<DateTime<Utc>> {
        if let Some(ts) = self.timestamp.get() {
            return Ok(*ts);
        }
        let ts = repository.load_timestamp(&self.artifact)?;
        Ok(*self.timestamp.get_or_init(|| ts))
    }

    /// SHA-1 of the archive bytes, lowercase hex
    pub fn digest(&self, repository: &dyn Repository) -> Result<&str> {
        if let Some(digest) = self.digest.get() {
            return Ok(digest);
        }
        let digest = repository.load_digest(&self.artifact)?;
        Ok(self.digest.get_or_init(|| digest))
    }

    pub fn manifest_attributes(&self, repository: &dyn Repository) -> Result<&ManifestAttributes> {
        if let Some(attributes) = self.manifest.get() {
            return Ok(attributes);
        }
        let attributes = repository.load_manifest_attributes(&self.artifact)?;
        Ok(self.manifest.get_or_init(|| attributes))
    }
}

/// All known releases of one plugin, keyed by version string
#[derive(Debug, Clone)]
pub struct PluginHistory {
    pub artifact_id: String,
    pub group_id: String,
    pub artifacts: BTreeMap<String, Hpi>,
}

impl PluginHistory {
    pub fn new(group_id: &str, artifact_id: &str) -> Self {
        Self {
            artifact_id: artifact_id.to_string(),
            group_id: group_id.to_string(),
            artifacts: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, artifact: ArtifactCoordinate) {
        self.artifacts
            .insert(artifact.version.clone(), Hpi::new(artifact));
    }

    pub fn get(&self, version: &str) -> Option<&Hpi> {
        self.artifacts.get(version)
    }
}
