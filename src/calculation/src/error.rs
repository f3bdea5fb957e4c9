//! Error type of the solver library.

use thiserror::Error;

/// Errors that terminate a simulation run.
///
/// The solver is a deterministic batch computation, so every error is fatal
/// for the run; nothing here is retried.
#[derive(Debug, Error)]
pub enum Error {
    /// Rear and front wings overlap in the chordwise direction.
    #[error(
        "rear and front wings interfere: separation {separation} is below the required clearance {clearance}"
    )]
    WingInterference {
        /// Rear minus front pitch-axis station
        separation: f64,
        /// Half the sum of the root chords
        clearance: f64,
    },

    /// The influence matrix could not be solved, usually from degenerate panel geometry.
    #[error("influence matrix is singular or ill-conditioned at step {step}")]
    SingularMatrix { step: usize },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Reading a configuration file failed.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file is not valid TOML for [`crate::Config`].
    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// A configuration could not be written back as TOML.
    #[error("failed to serialize configuration: {0}")]
    TomlWrite(#[from] toml::ser::Error),
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
