use std::path::PathBuf;
use thiserror::Error;

/// Core library errors
#[derive(Error, Debug)]
pub enum EchoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error at path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Home directory could not be determined")]
    NoHomeDir,

    #[error("Scanning {cleaner} failed: {source}")]
    Scan {
        cleaner: String,
        #[source]
        source: Box<EchoError>,
    },

    #[error("Cleaning {category} failed: {source}")]
    Clean {
        category: String,
        #[source]
        source: Box<EchoError>,
    },

    #[error("No categories selected for cleaning")]
    EmptySelection,

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Item '{path}' was not produced by the {category} scan")]
    ForeignItem { category: String, path: String },

    #[error("No cleaner registered under handle {0}")]
    InvalidHandle(usize),

    #[error("Failed to parse {what}: {source}")]
    Parse {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] globset::Error),

    #[error("Shared state lock poisoned: {0}")]
    Poisoned(String),

    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),
}

impl EchoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EchoError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, EchoError>;
