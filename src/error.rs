//! # Error Module
//!
//! Errors raised by the fallible edges of the sandbox: scene persistence,
//! scene text parsing, configuration loading and capacity limits.
//!
//! Placement and movement rejections are not errors. They are policy outcomes
//! reported as `bool` by the tracker and never travel through this type.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading, saving or parsing sandbox data.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// The backing file of a scene could not be read.
    #[error("failed to read scene '{name}'")]
    SceneRead {
        /// Name of the scene that was requested.
        name: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The backing file of a scene could not be written.
    #[error("failed to write scene '{name}'")]
    SceneWrite {
        /// Name of the scene that was being persisted.
        name: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// An in-memory store has no scene under this name.
    #[error("scene '{name}' does not exist")]
    SceneMissing {
        /// Name of the scene that was requested.
        name: String,
    },

    /// A whitespace separated token is not a number.
    #[error("field {field} is not a number: {token:?}")]
    MalformedNumber {
        /// Zero based position of the token in the scene text.
        field: usize,
        /// The offending token.
        token: String,
    },

    /// The number of fields does not split into whole records.
    #[error("expected a multiple of {per_record} fields, found {found}")]
    FieldCount {
        /// Width of one record (6 for static cubes, 9 for live cubes).
        per_record: usize,
        /// Number of fields actually present.
        found: usize,
    },

    /// The configuration file could not be read.
    #[error("failed to read config {path:?}")]
    ConfigRead {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for `SandboxConfig`.
    #[error("failed to parse config")]
    ConfigParse(#[from] serde_json::Error),

    /// The configuration parsed but describes an unusable world.
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// A cube list already holds as many cubes as it is allowed to.
    #[error("scene already holds the maximum of {limit} cubes")]
    CapacityReached {
        /// The configured limit.
        limit: usize,
    },
}
