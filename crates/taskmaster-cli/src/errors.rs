//! Error types reported by the binary.

use taskmaster_config::ConfigError;
use thiserror::Error;

use crate::client::CommandError;
use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    LoadConfiguration(#[from] ConfigError),
    #[error("{0}")]
    CliUsage(clap::Error),
    /// Help has already been written to stderr.
    #[error("bare invocation")]
    BareInvocation,
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to write help: {0}")]
    WriteHelp(std::io::Error),
    #[error(transparent)]
    Command(#[from] CommandError),
}
