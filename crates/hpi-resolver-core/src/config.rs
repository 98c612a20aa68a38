use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ResolverError, Result};
use crate::http::HttpTransport;
use crate::repository::{ArtifactoryRepository, MavenRepository, Repository};
use crate::resolver::LocalRepositoryResolver;

const CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_REPOSITORY_ID: &str = "public";
pub const DEFAULT_REPOSITORY_URL: &str = "https://repo.jenkins-ci.org/public/";

/// Written by `Config::init`; parses to `Config::default()`
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# hpi-resolver configuration file
# Location: ~/.hpi-resolver/config.toml

[repository]
# Identifier of the remote repository
id = "public"

# Repository URL; for Artifactory the last path segment is the repository key
url = "https://repo.jenkins-ci.org/public/"

# "artifactory" queries the storage API; "maven" downloads and inspects archives
kind = "artifactory"

# Known artifacts: a Maven-layout directory or a file with one
# groupId:artifactId:version[:packaging] per line
# index = "/path/to/index.txt"

# Local repository used for downloads
# Default: ~/.m2/repository
# local = "/path/to/repository"

[http]
# Request timeout in seconds
timeout_secs = 30

# Retries for connection errors and 5xx responses
retries = 2

# First retry delay in milliseconds, doubled on each attempt
retry_backoff_ms = 500
"#;

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub repository: RepositoryConfig,

    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryKind {
    #[default]
    Artifactory,
    Maven,
}

impl std::str::FromStr for RepositoryKind {
    type Err = ResolverError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "artifactory" => Ok(Self::Artifactory),
            "maven" => Ok(Self::Maven),
            _ => Err(ResolverError::UnknownRepositoryKind {
                kind: s.to_string(),
            }),
        }
    }
}

/// Remote repository settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default = "default_id")]
    pub id: String,

    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default)]
    pub kind: RepositoryKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<PathBuf>,

    /// Local repository (default: ~/.m2/repository)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local: Option<PathBuf>,
}

fn default_id() -> String {
    DEFAULT_REPOSITORY_ID.to_string()
}

fn default_url() -> String {
    DEFAULT_REPOSITORY_URL.to_string()
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            id: default_id(),
            url: default_url(),
            kind: RepositoryKind::default(),
            index: None,
            local: None,
        }
    }
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_retries")]
    pub retries: u32,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retries() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    500
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl Config {
    /// `<base_dir>/config.toml`, or defaults when there is none
    pub fn load(base_dir: &Path) -> Result<Self> {
        let path = Self::path(base_dir);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_file(&path)
    }

    /// Load config from an explicit file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ResolverError::io(format!("Failed to read {}", path.display()), e))?;
        toml::from_str(&content).map_err(|e| ResolverError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn path(base_dir: &Path) -> PathBuf {
        base_dir.join(CONFIG_FILE)
    }

    /// Write the commented default config; an existing file is left alone
    pub fn init(base_dir: &Path) -> Result<PathBuf> {
        let path = Self::path(base_dir);
        if path.exists() {
            log::info!("Keeping existing {}", path.display());
            return Ok(path);
        }

        fs::create_dir_all(base_dir).map_err(|e| {
            ResolverError::io(format!("Failed to create {}", base_dir.display()), e)
        })?;
        fs::write(&path, DEFAULT_CONFIG_TEMPLATE)
            .map_err(|e| ResolverError::io(format!("Failed to write {}", path.display()), e))?;
        Ok(path)
    }

    /// Local repository root, falling back to `~/.m2/repository`
    pub fn local_repository(&self) -> Result<PathBuf> {
        match &self.repository.local {
            Some(local) => Ok(local.clone()),
            None => LocalRepositoryResolver::default_local_repository(),
        }
    }

    /// Build the configured accessor with its remote repository registered
    pub fn open_repository(&self) -> Result<Box<dyn Repository>> {
        let transport = HttpTransport::new(&self.http)?;
        let resolver = LocalRepositoryResolver::new(
            self.local_repository()?,
            Box::new(transport.clone()),
        );

        let mut repository: Box<dyn Repository> = match self.repository.kind {
            RepositoryKind::Artifactory => Box::new(ArtifactoryRepository::new(
                Box::new(resolver),
                Box::new(transport),
            )),
            RepositoryKind::Maven => Box::new(MavenRepository::new(Box::new(resolver))),
        };

        repository.add_remote_repository(
            &self.repository.id,
            self.repository.index.clone(),
            &self.repository.url,
        )?;
        Ok(repository)
    }
}
