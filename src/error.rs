use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status code {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("`var rgGames` marker not found in profile page")]
    MarkerNotFound,

    #[error("invalid JSON: {0}")]
    Json(#[from] json::Error),

    #[error("unexpected response shape: {0}")]
    Shape(String),

    #[error("invalid profile name {0:?}: only letters, digits, `_` and `-` are allowed")]
    InvalidUserId(String),
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("failed to access cache file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache file {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML: {0}")]
    Yaml(#[from] yaml_rust2::ScanError),

    #[error("invalid config value: {0}")]
    Invalid(String),
}
