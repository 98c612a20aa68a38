//! Artifactory-aware repository
//!
//! Timestamp, checksum and manifest come from Artifactory's REST API instead
//! of downloading the archive:
//!
//! - `GET <server>/api/storage/<repo>/<path>` → `created`, `checksums.sha1`
//! - `GET <server>/<repo>/<path>!/META-INF/MANIFEST.MF` → manifest bytes

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Deserialize;

use crate::coordinate::ArtifactCoordinate;
use crate::digest::Sha1Digest;
use crate::error::{ResolverError, Result};
use crate::http::Transport;
use crate::manifest::{parse_manifest, ManifestAttributes, MANIFEST_PATH};
use crate::plugin::PluginHistory;
use crate::resolver::ArtifactResolver;

use super::{MavenRepository, RemoteRepository, Repository};

/// Server root and repository name split out of a repository URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactoryServer {
    /// Server context, no trailing slash (`https://host/artifactory`)
    pub base_url: String,
    /// Repository key (`public`, `libs-release`, ...)
    pub repo: String,
}

impl ArtifactoryServer {
    /// Split `<server context>/<repo>[/]` at its last path segment
    pub fn from_repository_url(url: &str) -> Result<Self> {
        let invalid = |message: &str| ResolverError::InvalidRepositoryUrl {
            url: url.to_string(),
            message: message.to_string(),
        };

        let mut parsed = Url::parse(url).map_err(|e| invalid(&e.to_string()))?;
        let path = parsed.path().trim_end_matches('/').to_string();
        let (context, repo) = path
            .rsplit_once('/')
            .filter(|(_, repo)| !repo.is_empty())
            .ok_or_else(|| invalid("no repository segment in URL path"))?;

        let repo = repo.to_string();
        parsed.set_path(context);
        parsed.set_query(None);
        parsed.set_fragment(None);

        Ok(Self {
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            repo,
        })
    }

    pub fn storage_url(&self, storage_path: &str) -> String {
        format!("{}/api/storage/{}/{}", self.base_url, self.repo, storage_path)
    }

    /// Address an entry inside a remote archive
    pub fn archive_entry_url(&self, storage_path: &str, entry: &str) -> String {
        format!("{}/{}/{}!/{}", self.base_url, self.repo, storage_path, entry)
    }
}

/// Subset of the storage API's file info
#[derive(Debug, Deserialize)]
struct StorageInfo {
    created: Option<String>,
    checksums: Option<Checksums>,
}

#[derive(Debug, Deserialize)]
struct Checksums {
    sha1: Option<String>,
}

pub struct ArtifactoryRepository {
    generic: MavenRepository,
    transport: Box<dyn Transport>,
    server: Option<ArtifactoryServer>,
}

impl ArtifactoryRepository {
    pub fn new(resolver: Box<dyn ArtifactResolver>, transport: Box<dyn Transport>) -> Self {
        Self {
            generic: MavenRepository::new(resolver),
            transport,
            server: None,
        }
    }

    pub fn server(&self) -> Option<&ArtifactoryServer> {
        self.server.as_ref()
    }

    /// The download-and-inspect accessor this one falls back to
    pub fn generic(&self) -> &MavenRepository {
        &self.generic
    }

    /// Repository-relative path of an artifact
    pub fn download_path(&self, coordinate: &ArtifactCoordinate) -> String {
        coordinate.storage_path()
    }

    fn registered(&self) -> Result<&ArtifactoryServer> {
        self.server.as_ref().ok_or(ResolverError::NoRemoteRepository)
    }

    fn storage_info(&self, coordinate: &ArtifactCoordinate) -> Result<StorageInfo> {
        let url = self.registered()?.storage_url(&self.download_path(coordinate));
        log::debug!("Querying storage info for {}", coordinate);
        let body = self.transport.get(&url)?;
        serde_json::from_slice(&body)
            .map_err(|e| ResolverError::io(format!("Malformed storage info from {}", url), e))
    }
}

impl Repository for ArtifactoryRepository {
    fn add_remote_repository(
        &mut self,
        id: &str,
        index: Option<PathBuf>,
        url: &str,
    ) -> Result<()> {
        if let Some(remote) = self.generic.remote() {
            return Err(ResolverError::RepositoryAlreadyRegistered {
                existing: remote.url.clone(),
            });
        }
        let server = ArtifactoryServer::from_repository_url(url)?;
        self.generic.add_remote_repository(id, index, url)?;
        log::debug!(
            "Artifactory server {} with repository '{}'",
            server.base_url,
            server.repo
        );
        self.server = Some(server);
        Ok(())
    }

    fn remote(&self) -> Option<&RemoteRepository> {
        self.generic.remote()
    }

    fn list_plugins(&self) -> Result<Vec<PluginHistory>> {
        self.generic.list_plugins()
    }

    fn resolve(&self, coordinate: &ArtifactCoordinate) -> Result<PathBuf> {
        // Artifactory could answer this directly; downloading through the
        // generic resolver is what is implemented.
        self.generic.resolve(coordinate)
    }

    /// Time the archive was stored in Artifactory, not the build date
    fn load_timestamp(&self, coordinate: &ArtifactCoordinate) -> Result<DateTime<Utc>> {
        let context = || format!("Failed to load timestamp of {}", coordinate);
        let info = self
            .storage_info(coordinate)
            .map_err(|e| e.into_io(context()))?;
        let created = info
            .created
            .ok_or_else(|| ResolverError::io(context(), "storage info has no 'created' field"))?;
        parse_created(&created).map_err(|e| e.into_io(context()))
    }

    fn load_digest(&self, coordinate: &ArtifactCoordinate) -> Result<String> {
        let context = || format!("Failed to load digest of {}", coordinate);
        let info = self
            .storage_info(coordinate)
            .map_err(|e| e.into_io(context()))?;
        let sha1 = info.checksums.and_then(|c| c.sha1).ok_or_else(|| {
            ResolverError::io(context(), "storage info has no 'checksums.sha1' field")
        })?;
        Sha1Digest::parse(&sha1)
            .map(|digest| digest.to_hex())
            .map_err(|e| ResolverError::io(context(), e))
    }

    fn load_manifest_attributes(
        &self,
        coordinate: &ArtifactCoordinate,
    ) -> Result<ManifestAttributes> {
        let context = || format!("Failed to load manifest of {}", coordinate);
        let url = self
            .registered()
            .map_err(|e| e.into_io(context()))?
            .archive_entry_url(&self.download_path(coordinate), MANIFEST_PATH);
        let bytes = self.transport.get(&url).map_err(|e| e.into_io(context()))?;
        parse_manifest(&bytes).map_err(|e| ResolverError::io(context(), e))
    }
}

/// Parse Artifactory's ISO-8601 `created` value (`2013-10-07T21:59:41.063+02:00`)
fn parse_created(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ResolverError::io(format!("Invalid timestamp '{}'", value), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::test_support::{dos_time, write_plugin_jar};
    use crate::error::ErrorKind;
    use crate::http::test_support::FakeTransport;
    use crate::resolver::LocalRepositoryResolver;
    use tempfile::TempDir;

    const REPO_URL: &str = "https://repo.jenkins-ci.org/public/";
    const STORAGE_URL: &str = "https://repo.jenkins-ci.org/api/storage/public/org/jenkins-ci/plugins/job-dsl/1.18/job-dsl-1.18.jpi";
    const MANIFEST_URL: &str = "https://repo.jenkins-ci.org/public/org/jenkins-ci/plugins/job-dsl/1.18/job-dsl-1.18.jpi!/META-INF/MANIFEST.MF";

    fn job_dsl() -> ArtifactCoordinate {
        ArtifactCoordinate::new("org.jenkins-ci.plugins", "job-dsl", "1.18", "jpi")
    }

    fn repository(temp: &TempDir, transport: FakeTransport) -> ArtifactoryRepository {
        let resolver = LocalRepositoryResolver::new(
            temp.path().to_path_buf(),
            Box::<FakeTransport>::default(),
        );
        let mut repo = ArtifactoryRepository::new(Box::new(resolver), Box::new(transport));
        repo.add_remote_repository("public", None, REPO_URL).unwrap();
        repo
    }

    #[test]
    fn test_server_from_repository_url() {
        let server = ArtifactoryServer::from_repository_url(REPO_URL).unwrap();
        assert_eq!(server.base_url, "https://repo.jenkins-ci.org");
        assert_eq!(server.repo, "public");

        let server =
            ArtifactoryServer::from_repository_url("https://host.example/artifactory/libs-release")
                .unwrap();
        assert_eq!(server.base_url, "https://host.example/artifactory");
        assert_eq!(server.repo, "libs-release");
    }

    #[test]
    fn test_server_rejects_url_without_repository() {
        assert!(ArtifactoryServer::from_repository_url("https://host.example/").is_err());
        assert!(ArtifactoryServer::from_repository_url("not a url").is_err());
    }

    #[test]
    fn test_download_path() {
        let temp = TempDir::new().unwrap();
        let repo = repository(&temp, FakeTransport::default());
        assert_eq!(
            repo.download_path(&job_dsl()),
            "org/jenkins-ci/plugins/job-dsl/1.18/job-dsl-1.18.jpi"
        );
    }

    #[test]
    fn test_second_registration_keeps_first() {
        let temp = TempDir::new().unwrap();
        let mut repo = repository(&temp, FakeTransport::default());

        let err = repo
            .add_remote_repository("other", None, "https://other.example/artifactory/releases/")
            .unwrap_err();
        assert!(matches!(err, ResolverError::RepositoryAlreadyRegistered { .. }));
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(repo.remote().unwrap().url, REPO_URL);
        assert_eq!(repo.server().unwrap().repo, "public");
    }

    #[test]
    fn test_invalid_url_registers_nothing() {
        let temp = TempDir::new().unwrap();
        let resolver = LocalRepositoryResolver::new(
            temp.path().to_path_buf(),
            Box::<FakeTransport>::default(),
        );
        let mut repo =
            ArtifactoryRepository::new(Box::new(resolver), Box::<FakeTransport>::default());
        assert!(repo.add_remote_repository("bad", None, "https://host/").is_err());
        assert!(repo.remote().is_none());
        repo.add_remote_repository("public", None, REPO_URL).unwrap();
    }

    #[test]
    fn test_load_timestamp_uses_created() {
        let temp = TempDir::new().unwrap();
        let transport = FakeTransport::default().with_body(
            STORAGE_URL,
            r#"{"repo":"public","created":"2013-10-07T21:59:41.063+02:00","checksums":{"sha1":"54d78df11e40924a65669e2d5340c3c2328338ca"}}"#,
        );
        let repo = repository(&temp, transport);

        let ts = repo.load_timestamp(&job_dsl()).unwrap();
        assert_eq!(ts.timestamp_millis(), 1381175981063);
    }

    #[test]
    fn test_load_digest_uses_checksum() {
        let temp = TempDir::new().unwrap();
        let transport = FakeTransport::default().with_body(
            STORAGE_URL,
            r#"{"created":"2013-10-07T19:59:41.063Z","checksums":{"sha1":"54D78DF11E40924A65669E2D5340C3C2328338CA"}}"#,
        );
        let repo = repository(&temp, transport);

        assert_eq!(
            repo.load_digest(&job_dsl()).unwrap(),
            "54d78df11e40924a65669e2d5340c3c2328338ca"
        );
    }

    #[test]
    fn test_load_digest_accepts_base64_checksum() {
        let temp = TempDir::new().unwrap();
        let transport = FakeTransport::default().with_body(
            STORAGE_URL,
            r#"{"checksums":{"sha1":"Kq5sNclPz7QV2+lfQIuc6R7oRu0="}}"#,
        );
        let repo = repository(&temp, transport);

        assert_eq!(
            repo.load_digest(&job_dsl()).unwrap(),
            "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"
        );
    }

    #[test]
    fn test_bad_checksum_names_the_artifact() {
        let temp = TempDir::new().unwrap();
        let transport =
            FakeTransport::default().with_body(STORAGE_URL, r#"{"checksums":{"sha1":"zz"}}"#);
        let repo = repository(&temp, transport);

        let err = repo.load_digest(&job_dsl()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("org.jenkins-ci.plugins:job-dsl:1.18"));
    }

    #[test]
    fn test_load_manifest_from_archive_entry() {
        let temp = TempDir::new().unwrap();
        let transport = FakeTransport::default().with_body(
            MANIFEST_URL,
            "Manifest-Version: 1.0\r\nLong-Name: Job DSL\r\nPlugin-Version: 1.18\r\n\r\n",
        );
        let repo = repository(&temp, transport);

        let attrs = repo.load_manifest_attributes(&job_dsl()).unwrap();
        assert_eq!(attrs["Long-Name"], "Job DSL");
        assert_eq!(attrs["Plugin-Version"], "1.18");
    }

    #[test]
    fn test_malformed_storage_info_is_io_error() {
        let temp = TempDir::new().unwrap();
        let transport = FakeTransport::default().with_body(STORAGE_URL, "<html>oops</html>");
        let repo = repository(&temp, transport);

        let err = repo.load_timestamp(&job_dsl()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("job-dsl"));
    }

    #[test]
    fn test_missing_fields_are_io_errors() {
        let temp = TempDir::new().unwrap();
        let transport = FakeTransport::default().with_body(STORAGE_URL, "{}");
        let repo = repository(&temp, transport);

        assert_eq!(repo.load_timestamp(&job_dsl()).unwrap_err().kind(), ErrorKind::Io);
        assert_eq!(repo.load_digest(&job_dsl()).unwrap_err().kind(), ErrorKind::Io);
    }

    #[test]
    fn test_http_failure_is_io_error() {
        let temp = TempDir::new().unwrap();
        let repo = repository(&temp, FakeTransport::default().with_status(MANIFEST_URL, 500));

        let err = repo.load_manifest_attributes(&job_dsl()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(std::error::Error::source(&err)
            .unwrap()
            .to_string()
            .contains("500"));
    }

    #[test]
    fn test_digest_agrees_with_generic_accessor() {
        let temp = TempDir::new().unwrap();
        let jar = temp.path().join(job_dsl().storage_path());
        write_plugin_jar(
            &jar,
            &[("Long-Name", "Job DSL")],
            dos_time(2013, 10, 7, 19, 59, 28),
        );
        let local = Sha1Digest::compute_file(&jar).unwrap();

        // Artifactory reports hex; older catalogs stored base64 of the same bytes
        let body = format!(
            r#"{{"created":"2013-10-07T19:59:41.063Z","checksums":{{"sha1":"{}"}}}}"#,
            local.to_hex()
        );
        let repo = repository(&temp, FakeTransport::default().with_body(STORAGE_URL, body));

        let optimized = repo.load_digest(&job_dsl()).unwrap();
        let generic = repo.generic().load_digest(&job_dsl()).unwrap();
        assert_eq!(optimized, generic);
        assert_eq!(
            Sha1Digest::parse(&optimized).unwrap(),
            Sha1Digest::parse(&local.to_base64()).unwrap()
        );
    }

    #[test]
    fn test_resolve_falls_back_to_download() {
        let temp = TempDir::new().unwrap();
        let jar = temp.path().join(job_dsl().storage_path());
        write_plugin_jar(&jar, &[], dos_time(2013, 10, 7, 19, 59, 28));
        let repo = repository(&temp, FakeTransport::default());

        assert_eq!(repo.resolve(&job_dsl()).unwrap(), jar);
    }

    #[test]
    fn test_parse_created_variants() {
        let expected = 1381175981063;
        assert_eq!(
            parse_created("2013-10-07T19:59:41.063Z").unwrap().timestamp_millis(),
            expected
        );
        assert_eq!(
            parse_created("2013-10-07T21:59:41.063+0200").unwrap().timestamp_millis(),
            expected
        );
        assert!(parse_created("yesterday").is_err());
    }
}
