use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file does not exist.
    ///
    /// The bot never fabricates a configuration; the file must be created by hand
    /// in the config directory (see `--cfg-path`).
    #[error("Config file not found: {}", path.display())]
    Missing { path: PathBuf },

    /// The configuration file is not valid JSON or lacks a required field.
    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The configuration file or directory could not be accessed.
    #[error("Failed to read config from {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A field holds a value of the right type that cannot be used.
    #[error("Invalid value for {field} in config file: {value:?}")]
    Invalid { field: &'static str, value: String },
}
