//! Shared configuration for the taskmaster control client.
//!
//! Settings resolve in three layers: built-in defaults, `TASKMASTER_*`
//! environment variables, then command-line flags. The resulting [`Config`]
//! is plain data so callers and tests can also construct it directly.

use std::ffi::OsString;

use clap::Parser;
use clap::builder::BoolishValueParser;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod defaults;
mod logging;
mod socket;

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_READ_BUFFER_SIZE, DEFAULT_SOCKET_PATH, MAX_READ_BUFFER_SIZE,
    default_log_filter, default_log_format, default_socket_endpoint,
};
pub use logging::LogFormat;
pub use socket::{SocketEndpoint, SocketParseError};

/// Resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Control socket exposed by the daemon.
    pub daemon_socket: SocketEndpoint,
    /// Number of bytes requested per read while streaming a response.
    pub read_buffer_size: usize,
    /// Sends `signal` requests with an optional instance index.
    pub indexed_signals: bool,
    /// `tracing` filter directive for diagnostics.
    pub log_filter: String,
    /// Diagnostic output format.
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            daemon_socket: default_socket_endpoint(),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            indexed_signals: false,
            log_filter: default_log_filter().to_owned(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Loads configuration from the process environment and the supplied
    /// arguments. The first item is the binary name.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let layer = ConfigLayer::try_parse_from(args)?;
        Ok(layer.apply(Self::default()))
    }

    /// Endpoint of the daemon control socket.
    #[must_use]
    pub fn daemon_socket(&self) -> &SocketEndpoint {
        &self.daemon_socket
    }

    /// Read chunk size, never zero.
    #[must_use]
    pub fn read_buffer_size(&self) -> usize {
        self.read_buffer_size.max(1)
    }

    /// Whether `signal` accepts a trailing instance index.
    #[must_use]
    pub const fn indexed_signals(&self) -> bool {
        self.indexed_signals
    }

    /// Log filter directive.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

/// Command-line and environment overrides. Absent values keep the defaults.
#[derive(Debug, Parser)]
#[command(
    name = "taskmasterctl",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct ConfigLayer {
    #[arg(long = "socket", env = "TASKMASTER_SOCKET", value_name = "ENDPOINT")]
    socket: Option<SocketEndpoint>,
    #[arg(
        long,
        env = "TASKMASTER_READ_BUFFER_SIZE",
        value_name = "BYTES",
        value_parser = parse_read_buffer_size
    )]
    read_buffer_size: Option<usize>,
    #[arg(
        long,
        env = "TASKMASTER_INDEXED_SIGNALS",
        value_parser = BoolishValueParser::new()
    )]
    indexed_signals: bool,
    #[arg(long, env = "TASKMASTER_LOG_FILTER", value_name = "FILTER")]
    log_filter: Option<String>,
    #[arg(long, env = "TASKMASTER_LOG_FORMAT", value_name = "FORMAT")]
    log_format: Option<LogFormat>,
}

impl ConfigLayer {
    fn apply(self, mut config: Config) -> Config {
        if let Some(socket) = self.socket {
            config.daemon_socket = socket;
        }
        if let Some(size) = self.read_buffer_size {
            config.read_buffer_size = size;
        }
        config.indexed_signals |= self.indexed_signals;
        if let Some(filter) = self.log_filter {
            config.log_filter = filter;
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        config
    }
}

fn parse_read_buffer_size(input: &str) -> Result<usize, String> {
    let size: usize = input
        .trim()
        .parse()
        .map_err(|_| format!("'{input}' is not a byte count"))?;
    if size == 0 || size > MAX_READ_BUFFER_SIZE {
        return Err(format!(
            "read buffer size must be between 1 and {MAX_READ_BUFFER_SIZE} bytes"
        ));
    }
    Ok(size)
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A flag or environment variable held an unusable value.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] clap::Error),
}
