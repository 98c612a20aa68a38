//! Artifact resolution into a local Maven repository

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::coordinate::ArtifactCoordinate;
use crate::error::{ResolverError, Result};
use crate::http::{join_url, Transport};
use crate::repository::RemoteRepository;

/// Turns a coordinate into a local file
pub trait ArtifactResolver {
    fn resolve(
        &self,
        remote: &RemoteRepository,
        coordinate: &ArtifactCoordinate,
    ) -> Result<PathBuf>;
}

/// Resolves through a local repository cache (`~/.m2/repository` layout),
/// downloading from the remote repository on a miss.
pub struct LocalRepositoryResolver {
    local_repository: PathBuf,
    transport: Box<dyn Transport>,
}

impl LocalRepositoryResolver {
    pub fn new(local_repository: PathBuf, transport: Box<dyn Transport>) -> Self {
        Self {
            local_repository,
            transport,
        }
    }

    /// Default local repository: `~/.m2/repository`
    pub fn default_local_repository() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ResolverError::HomeNotFound)?;
        Ok(home.join(".m2").join("repository"))
    }

    pub fn local_repository(&self) -> &Path {
        &self.local_repository
    }

    /// Where a coordinate lives inside the local repository
    pub fn local_path(&self, coordinate: &ArtifactCoordinate) -> PathBuf {
        coordinate
            .storage_path()
            .split('/')
            .fold(self.local_repository.clone(), |path, segment| path.join(segment))
    }

    fn download(&self, url: &str, target: &Path) -> Result<()> {
        let body = self.transport.get(url)?;

        let parent = target.parent().unwrap_or(self.local_repository.as_path());
        fs::create_dir_all(parent)?;

        // Write next to the target then rename, so a partial download never
        // shows up under the final name.
        let partial = target.with_extension("part");
        let stored = store(&partial, &body).and_then(|()| fs::rename(&partial, target));
        if let Err(e) = stored {
            if let Err(cleanup) = fs::remove_file(&partial) {
                log::debug!("Could not remove {}: {}", partial.display(), cleanup);
            }
            return Err(ResolverError::io(
                format!("Failed to store {}", target.display()),
                e,
            ));
        }
        Ok(())
    }
}

fn store(path: &Path, body: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(body)?;
    file.sync_all()
}

impl ArtifactResolver for LocalRepositoryResolver {
    fn resolve(
        &self,
        remote: &RemoteRepository,
        coordinate: &ArtifactCoordinate,
    ) -> Result<PathBuf> {
        let target = self.local_path(coordinate);
        if target.is_file() {
            log::debug!("{} found at {}", coordinate, target.display());
            return Ok(target);
        }

        let url = join_url(&remote.url, &coordinate.storage_path());
        log::info!("Downloading {} from {}", coordinate, url);

        match self.download(&url, &target) {
            Ok(()) => Ok(target),
            Err(ResolverError::HttpStatus { status: 404, .. }) => {
                Err(ResolverError::ArtifactNotFound {
                    coordinate: coordinate.to_string(),
                })
            }
            Err(e) => Err(ResolverError::Resolution {
                coordinate: coordinate.to_string(),
                source: Box::new(e),
            }),
        }
    }
}
