//! Plugin catalog: every known plugin release, viewed by plugin or by date

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::plugin::{Hpi, PluginHistory};
use crate::repository::Repository;

/// Releases grouped by publish time, then by plugin artifact id
pub type ReleasesByDate = BTreeMap<DateTime<Utc>, BTreeMap<String, Hpi>>;

pub struct PluginCatalog<'r> {
    repository: &'r dyn Repository,
    plugins: Vec<PluginHistory>,
}

impl<'r> PluginCatalog<'r> {
    /// Discover all plugins the repository knows about
    pub fn discover(repository: &'r dyn Repository) -> Result<Self> {
        let plugins = repository.list_plugins()?;
        log::debug!("Discovered {} plugins", plugins.len());
        Ok(Self::with_plugins(repository, plugins))
    }

    pub fn with_plugins(repository: &'r dyn Repository, plugins: Vec<PluginHistory>) -> Self {
        Self {
            repository,
            plugins,
        }
    }

    pub fn plugins(&self) -> &[PluginHistory] {
        &self.plugins
    }

    /// Every release filed under its publish time.
    ///
    /// A release whose timestamp cannot be loaded is logged and skipped; it
    /// does not stop the rest of the catalog.
    pub fn list_plugins_by_release_date(&self) -> ReleasesByDate {
        let mut releases = ReleasesByDate::new();

        for plugin in &self.plugins {
            for hpi in plugin.artifacts.values() {
                match hpi.timestamp(self.repository) {
                    Ok(released) => {
                        log::info!("adding {}:{}", plugin.artifact_id, hpi.version());
                        releases
                            .entry(released)
                            .or_default()
                            .insert(plugin.artifact_id.clone(), hpi.clone());
                    }
                    Err(e) => {
                        log::warn!("Skipping {}: {}", hpi.artifact, e);
                    }
                }
            }
        }

        releases
    }

    /// Exact group/artifact/version match, `None` when nothing matches
    pub fn find_plugin(&self, group_id: &str, artifact_id: &str, version: &str) -> Option<&Hpi> {
        self.plugins
            .iter()
            .flat_map(|p| p.artifacts.values())
            .find(|hpi| hpi.is_equal_to(group_id, artifact_id, version))
    }
}
