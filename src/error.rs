//! Unified error type for the audioforge application.
//!
//! All failure modes funnel into [`Error`], which carries enough context for
//! `main` to derive a process exit code via [`Error::exit_code`].

use std::path::PathBuf;

/// Unified error type covering all failure modes in audioforge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No destination format was given on the command line.
    #[error("you must specify a destination format (-f | --format)")]
    MissingFormat,

    /// The registry has no encoder for the requested destination format.
    #[error("no encoder found to create '{format}' files")]
    NoEncoder {
        /// The destination format that could not be encoded.
        format: String,
    },

    /// The output directory could not be created or written to.
    #[error("output directory {path:?} is unusable: {message}")]
    OutputDir {
        /// The directory that was probed.
        path: PathBuf,
        /// Human-readable failure description.
        message: String,
    },

    /// The tool configuration file could not be read or parsed.
    #[error("configuration error in {path:?}: {message}")]
    Config {
        /// Path of the configuration file.
        path: PathBuf,
        /// Human-readable failure description.
        message: String,
    },

    /// A user-supplied encoder-settings override failed validation.
    #[error("invalid encoder settings: {0}")]
    Template(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// An external tool (decoder or encoder) failed to run.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to the process exit code documented in the CLI help.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::MissingFormat => 1,
            Error::NoEncoder { .. } => 1,
            Error::Template(_) => 1,
            Error::Tool { .. } => 1,
            Error::OutputDir { .. } => 2,
            Error::Config { .. } => 3,
            Error::Io { .. } => 3,
            Error::Internal(_) => 3,
        }
    }

    /// Convenience constructor for [`Error::Config`].
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::OutputDir`].
    pub fn output_dir(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::OutputDir {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
