//! Repository accessors
//!
//! - `maven`: download the archive, inspect it locally
//! - `artifactory`: ask an Artifactory server for the same facts directly

pub mod artifactory;
pub mod maven;

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::archive::PluginArchive;
use crate::coordinate::ArtifactCoordinate;
use crate::digest::Sha1Digest;
use crate::error::Result;
use crate::manifest::ManifestAttributes;
use crate::plugin::PluginHistory;

pub use artifactory::ArtifactoryRepository;
pub use maven::MavenRepository;

/// The single remote repository an accessor reads from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRepository {
    pub id: String,
    /// Directory or coordinate list describing the known artifacts
    pub index: Option<PathBuf>,
    pub url: String,
}

/// Facts about artifacts in a Maven-layout repository.
///
/// The provided fact methods resolve the artifact to a local file and read
/// it. Every failure they hit, resolution included, is reported as an I/O
/// error carrying the original cause.
pub trait Repository {
    /// Register the remote repository. Only one is supported per accessor;
    /// a second call fails and keeps the first registration.
    fn add_remote_repository(
        &mut self,
        id: &str,
        index: Option<PathBuf>,
        url: &str,
    ) -> Result<()>;

    fn remote(&self) -> Option<&RemoteRepository>;

    /// Every plugin the registered index knows about
    fn list_plugins(&self) -> Result<Vec<PluginHistory>>;

    /// Local file holding the artifact
    fn resolve(&self, coordinate: &ArtifactCoordinate) -> Result<PathBuf>;

    /// Publish time of the artifact. Read from the archive this is only the
    /// manifest's stored modification time.
    fn load_timestamp(&self, coordinate: &ArtifactCoordinate) -> Result<DateTime<Utc>> {
        let path = self.resolve(coordinate).map_err(|e| e.into_io("Failed to resolve"))?;
        let mut archive = PluginArchive::open(&path)?;
        archive.manifest_timestamp()
    }

    /// SHA-1 of the artifact bytes, lowercase hex
    fn load_digest(&self, coordinate: &ArtifactCoordinate) -> Result<String> {
        let path = self.resolve(coordinate).map_err(|e| e.into_io("Failed to resolve"))?;
        Ok(Sha1Digest::compute_file(&path)?.to_hex())
    }

    fn load_manifest_attributes(
        &self,
        coordinate: &ArtifactCoordinate,
    ) -> Result<ManifestAttributes> {
        let path = self.resolve(coordinate).map_err(|e| e.into_io("Failed to resolve"))?;
        let mut archive = PluginArchive::open(&path)?;
        archive.manifest_attributes()
    }
}
