use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] orgprobe_core::ValidationError),

    #[error(transparent)]
    Config(#[from] orgprobe_core::ConfigError),

    #[error("command error: {0}")]
    Command(String),

    #[error("strict mode failed: {failed} lookup(s) did not succeed")]
    StrictModeViolation { failed: usize },

    #[error(transparent)]
    Batch(#[from] orgprobe_core::BatchError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Config(_) => 2,
            Self::Command(_) => 2,
            Self::StrictModeViolation { .. } => 3,
            Self::Serialization(_) => 4,
            Self::Batch(_) => 5,
            Self::Io(_) => 10,
        }
    }
}
