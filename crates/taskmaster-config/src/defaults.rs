use crate::logging::LogFormat;
use crate::socket::SocketEndpoint;

/// Well-known control socket path shared with `taskmasterd`.
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/taskmaster.sock";

/// Size of each read issued while streaming a daemon response.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;

/// Upper bound accepted for the read buffer size.
pub const MAX_READ_BUFFER_SIZE: usize = 1 << 20;

/// Default log filter expression. The client stays quiet unless asked.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Default log filter expression used by the binaries.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the binaries.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Endpoint used when neither the environment nor the command line names one.
#[must_use]
pub fn default_socket_endpoint() -> SocketEndpoint {
    SocketEndpoint::unix(DEFAULT_SOCKET_PATH)
}
