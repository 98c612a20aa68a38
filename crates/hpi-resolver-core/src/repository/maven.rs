//! Generic Maven repository: resolve to a local file, then inspect it

use std::path::PathBuf;

use crate::coordinate::ArtifactCoordinate;
use crate::error::{ResolverError, Result};
use crate::index::ArtifactIndex;
use crate::plugin::PluginHistory;
use crate::resolver::ArtifactResolver;

use super::{RemoteRepository, Repository};

pub struct MavenRepository {
    resolver: Box<dyn ArtifactResolver>,
    remote: Option<RemoteRepository>,
}

impl MavenRepository {
    pub fn new(resolver: Box<dyn ArtifactResolver>) -> Self {
        Self {
            resolver,
            remote: None,
        }
    }

    fn registered(&self) -> Result<&RemoteRepository> {
        self.remote.as_ref().ok_or(ResolverError::NoRemoteRepository)
    }
}

impl Repository for MavenRepository {
    fn add_remote_repository(
        &mut self,
        id: &str,
        index: Option<PathBuf>,
        url: &str,
    ) -> Result<()> {
        if let Some(existing) = &self.remote {
            return Err(ResolverError::RepositoryAlreadyRegistered {
                existing: existing.url.clone(),
            });
        }
        if url.trim().is_empty() {
            return Err(ResolverError::InvalidRepositoryUrl {
                url: url.to_string(),
                message: "empty URL".to_string(),
            });
        }

        log::debug!("Registered remote repository {} at {}", id, url);
        self.remote = Some(RemoteRepository {
            id: id.to_string(),
            index,
            url: url.to_string(),
        });
        Ok(())
    }

    fn remote(&self) -> Option<&RemoteRepository> {
        self.remote.as_ref()
    }

    fn list_plugins(&self) -> Result<Vec<PluginHistory>> {
        let remote = self.registered()?;
        let Some(index_path) = &remote.index else {
            log::warn!("No index configured for repository '{}'; no plugins listed", remote.id);
            return Ok(Vec::new());
        };
        let index = ArtifactIndex::load(index_path)?;
        if index.is_empty() {
            log::warn!("Index {} lists no artifacts", index_path.display());
        }
        Ok(index.plugin_histories())
    }

    fn resolve(&self, coordinate: &ArtifactCoordinate) -> Result<PathBuf> {
        let remote = self.registered()?;
        self.resolver.resolve(remote, coordinate)
    }
}
