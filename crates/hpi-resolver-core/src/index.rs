//! Artifact index: the set of coordinates a repository knows about
//!
//! An index is either a directory laid out as a Maven repository or a text
//! file listing one coordinate per line.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Component, Path};

use walkdir::WalkDir;

use crate::coordinate::{ArtifactCoordinate, PLUGIN_PACKAGINGS};
use crate::error::{ResolverError, Result};
use crate::plugin::PluginHistory;

#[derive(Debug, Clone, Default)]
pub struct ArtifactIndex {
    coordinates: BTreeSet<ArtifactCoordinate>,
}

impl ArtifactIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an index from a directory (scanned) or a coordinate list file
    pub fn load(path: &Path) -> Result<Self> {
        if path.is_dir() {
            Self::scan(path)
        } else {
            let content = fs::read_to_string(path).map_err(|e| {
                ResolverError::io(format!("Failed to read index {}", path.display()), e)
            })?;
            Self::parse(&content).map_err(|e| ResolverError::ConfigParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        }
    }

    /// Parse a coordinate list; `#` starts a comment
    pub fn parse(content: &str) -> Result<Self> {
        let mut index = Self::new();
        for line in content.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            index.insert(ArtifactCoordinate::parse(line)?);
        }
        Ok(index)
    }

    /// Walk a Maven-layout directory and collect every plugin archive
    pub fn scan(root: &Path) -> Result<Self> {
        let mut index = Self::new();
        for entry in WalkDir::new(root).follow_links(true) {
            let entry = entry.map_err(|e| {
                ResolverError::io(format!("Failed to scan {}", root.display()), e)
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            match coordinate_from_path(relative) {
                Some(coordinate) => index.insert(coordinate),
                None => log::trace!("Skipping {}", relative.display()),
            }
        }
        log::debug!("Indexed {} plugin archives under {}", index.len(), root.display());
        Ok(index)
    }

    pub fn insert(&mut self, coordinate: ArtifactCoordinate) {
        self.coordinates.insert(coordinate);
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// Group plugin coordinates by artifact id, sorted by artifact id.
    ///
    /// Classified artifacts (sources, tests, ...) are not plugin releases and
    /// are left out.
    pub fn plugin_histories(&self) -> Vec<PluginHistory> {
        let mut histories: BTreeMap<&str, PluginHistory> = BTreeMap::new();
        for coordinate in self
            .coordinates
            .iter()
            .filter(|c| c.is_plugin() && c.classifier.is_none())
        {
            histories
                .entry(coordinate.artifact_id.as_str())
                .or_insert_with(|| {
                    PluginHistory::new(&coordinate.group_id, &coordinate.artifact_id)
                })
                .add(coordinate.clone());
        }
        histories.into_values().collect()
    }
}

/// Recover a coordinate from `<group path>/<artifactId>/<version>/<file>`
fn coordinate_from_path(relative: &Path) -> Option<ArtifactCoordinate> {
    let segments: Vec<&str> = relative
        .components()
        .map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;

    // at least one group segment
    if segments.len() < 4 {
        return None;
    }
    let (file_name, rest) = segments.split_last()?;
    let (version, rest) = rest.split_last()?;
    let (artifact_id, group) = rest.split_last()?;

    let (stem, packaging) = file_name.rsplit_once('.')?;
    if !PLUGIN_PACKAGINGS.contains(&packaging) {
        return None;
    }

    let prefix = format!("{}-{}", artifact_id, version);
    let remainder = stem.strip_prefix(prefix.as_str())?;
    let classifier = match remainder {
        "" => None,
        r => Some(r.strip_prefix('-').filter(|c| !c.is_empty())?),
    };

    let mut coordinate =
        ArtifactCoordinate::new(group.join("."), *artifact_id, *version, packaging);
    if let Some(classifier) = classifier {
        coordinate = coordinate.with_classifier(classifier);
    }
    Some(coordinate)
}
