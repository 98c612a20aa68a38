//! Maven artifact coordinates
//!
//! `groupId:artifactId:version[:packaging[:classifier]]` plus the storage
//! path convention shared by every Maven-layout repository.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ResolverError, Result};

/// Packaging assumed when a coordinate omits it
pub const DEFAULT_PACKAGING: &str = "hpi";

/// Packagings that identify a Jenkins plugin
pub const PLUGIN_PACKAGINGS: &[&str] = &["hpi", "jpi"];

/// Identifies one artifact instance. Equality is coordinate-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactCoordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub packaging: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
}

impl ArtifactCoordinate {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
        packaging: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            packaging: packaging.into(),
            classifier: None,
        }
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    /// Parse `groupId:artifactId:version[:packaging[:classifier]]`
    pub fn parse(value: &str) -> Result<Self> {
        let invalid = || ResolverError::InvalidCoordinate {
            value: value.to_string(),
        };

        let parts: Vec<&str> = value.trim().split(':').collect();
        if !(3..=5).contains(&parts.len()) || parts.iter().any(|p| p.trim().is_empty()) {
            return Err(invalid());
        }

        let packaging = parts.get(3).copied().unwrap_or(DEFAULT_PACKAGING);
        let mut coordinate = Self::new(parts[0], parts[1], parts[2], packaging);
        if let Some(classifier) = parts.get(4) {
            coordinate = coordinate.with_classifier(*classifier);
        }
        Ok(coordinate)
    }

    /// Whether this coordinate matches the given group, artifact and version
    pub fn matches(&self, group_id: &str, artifact_id: &str, version: &str) -> bool {
        self.group_id == group_id && self.artifact_id == artifact_id && self.version == version
    }

    pub fn is_plugin(&self) -> bool {
        PLUGIN_PACKAGINGS.contains(&self.packaging.as_str())
    }

    /// File name inside the version directory:
    /// `<artifactId>-<version>[-<classifier>].<packaging>`
    pub fn file_name(&self) -> String {
        let mut name = format!("{}-{}", self.artifact_id, self.version);
        if let Some(classifier) = &self.classifier {
            name.push('-');
            name.push_str(classifier);
        }
        name.push('.');
        name.push_str(&self.packaging);
        name
    }

    /// Repository-relative storage path, always `/`-separated:
    /// `<groupId with '.'→'/'>/<artifactId>/<version>/<file_name>`
    pub fn storage_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.group_id.replace('.', "/"),
            self.artifact_id,
            self.version,
            self.file_name()
        )
    }
}

impl fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.group_id, self.artifact_id, self.version, self.packaging
        )?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{}", classifier)?;
        }
        Ok(())
    }
}

impl FromStr for ArtifactCoordinate {
    type Err = ResolverError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_dsl() -> ArtifactCoordinate {
        ArtifactCoordinate::new("org.jenkins-ci.plugins", "job-dsl", "1.18", "jpi")
    }

    #[test]
    fn test_storage_path_job_dsl() {
        assert_eq!(
            job_dsl().storage_path(),
            "org/jenkins-ci/plugins/job-dsl/1.18/job-dsl-1.18.jpi"
        );
    }

    #[test]
    fn test_storage_path_with_classifier() {
        let c = ArtifactCoordinate::new("org.example", "tool", "2.0.1", "jar")
            .with_classifier("sources");
        assert_eq!(
            c.storage_path(),
            "org/example/tool/2.0.1/tool-2.0.1-sources.jar"
        );
    }

    #[test]
    fn test_storage_path_is_deterministic_and_replaces_group_dots() {
        let c = ArtifactCoordinate::new("a.b.c.d", "x", "1.2.3", "hpi");
        let first = c.storage_path();
        assert_eq!(first, c.clone().storage_path());

        let group_segment = &first[..first.find("/x/").unwrap()];
        assert_eq!(group_segment, "a/b/c/d");
        assert!(!group_segment.contains('.'));
    }

    #[test]
    fn test_parse_defaults_packaging() {
        let c = ArtifactCoordinate::parse("org.jenkins-ci.plugins:ivy:1.17").unwrap();
        assert_eq!(c.group_id, "org.jenkins-ci.plugins");
        assert_eq!(c.artifact_id, "ivy");
        assert_eq!(c.version, "1.17");
        assert_eq!(c.packaging, DEFAULT_PACKAGING);
        assert!(c.classifier.is_none());
    }

    #[test]
    fn test_parse_full() {
        let c: ArtifactCoordinate = "g:a:1:jpi:tests".parse().unwrap();
        assert_eq!(c.packaging, "jpi");
        assert_eq!(c.classifier.as_deref(), Some("tests"));
        assert_eq!(c.to_string(), "g:a:1:jpi:tests");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(ArtifactCoordinate::parse("only:two").is_err());
        assert!(ArtifactCoordinate::parse("g::1").is_err());
        assert!(ArtifactCoordinate::parse("a:b:c:d:e:f").is_err());
    }

    #[test]
    fn test_matches_requires_exact_version() {
        let c = job_dsl();
        assert!(c.matches("org.jenkins-ci.plugins", "job-dsl", "1.18"));
        assert!(!c.matches("org.jenkins-ci.plugins", "job-dsl", "1.1"));
    }
}
