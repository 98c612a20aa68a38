use std::path::PathBuf;

use thiserror::Error;

/// Boxed cause carried by I/O errors
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("Remote repository already registered: {existing} (only a single remote repository is supported)")]
    RepositoryAlreadyRegistered { existing: String },

    #[error("No remote repository registered")]
    NoRemoteRepository,

    #[error("Invalid repository URL: '{url}' - {message}")]
    InvalidRepositoryUrl { url: String, message: String },

    #[error("Invalid artifact coordinate: '{value}' - expected groupId:artifactId:version[:packaging[:classifier]]")]
    InvalidCoordinate { value: String },

    #[error("Config parse error in {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Unknown repository kind: {kind}")]
    UnknownRepositoryKind { kind: String },

    #[error("Artifact not found: {coordinate}")]
    ArtifactNotFound { coordinate: String },

    #[error("Failed to resolve {coordinate}: {source}")]
    Resolution {
        coordinate: String,
        #[source]
        source: BoxError,
    },

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: BoxError,
    },

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Coarse classification used by callers that only care about the failure class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Resolution,
    Io,
}

pub type Result<T> = std::result::Result<T, ResolverError>;

impl ResolverError {
    /// Wrap any error as an I/O failure with context
    pub fn io(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Io {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Normalize into the I/O kind, keeping `self` as the cause.
    ///
    /// Accessor fact queries surface every failure this way.
    pub fn into_io(self, context: impl Into<String>) -> Self {
        match self {
            Self::Io { .. } => self,
            other => Self::io(context, other),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RepositoryAlreadyRegistered { .. }
            | Self::NoRemoteRepository
            | Self::InvalidRepositoryUrl { .. }
            | Self::InvalidCoordinate { .. }
            | Self::ConfigParse { .. }
            | Self::UnknownRepositoryKind { .. }
            | Self::HomeNotFound => ErrorKind::Configuration,
            Self::ArtifactNotFound { .. } | Self::Resolution { .. } => ErrorKind::Resolution,
            Self::HttpStatus { .. } | Self::Io { .. } => ErrorKind::Io,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Resolution => 2,
            ErrorKind::Configuration => 3,
            ErrorKind::Io => 4,
        }
    }
}

impl From<std::io::Error> for ResolverError {
    fn from(err: std::io::Error) -> Self {
        Self::io("I/O error", err)
    }
}
