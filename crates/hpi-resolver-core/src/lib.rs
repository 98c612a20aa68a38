pub mod archive;
pub mod catalog;
pub mod config;
pub mod coordinate;
pub mod digest;
pub mod error;
pub mod http;
pub mod index;
pub mod manifest;
pub mod plugin;
pub mod repository;
pub mod resolver;

pub use catalog::{PluginCatalog, ReleasesByDate};
pub use config::{Config, HttpConfig, RepositoryConfig, RepositoryKind};
pub use coordinate::ArtifactCoordinate;
pub use digest::Sha1Digest;
pub use error::{ErrorKind, ResolverError, Result};
pub use http::{HttpTransport, Transport};
pub use index::ArtifactIndex;
pub use manifest::{parse_manifest, ManifestAttributes, MANIFEST_PATH};
pub use plugin::{Hpi, PluginHistory};
pub use repository::{ArtifactoryRepository, MavenRepository, RemoteRepository, Repository};
pub use resolver::{ArtifactResolver, LocalRepositoryResolver};
