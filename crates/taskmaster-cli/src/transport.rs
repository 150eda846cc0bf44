//! Socket transport for daemon exchanges.
//!
//! [`connect`] opens the configured endpoint and wraps the stream in a
//! uniform [`Connection`]. [`send`] writes one encoded request in a single
//! write, and [`receive`] forwards response chunks until the daemon closes
//! the connection or the operator interrupts.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use taskmaster_config::SocketEndpoint;
use thiserror::Error;
use tracing::{debug, trace};

#[cfg(unix)]
use std::os::unix::net::UnixStream;

#[cfg(unix)]
use socket2::{Domain, SockAddr, Socket, Type};

use crate::interrupt::InterruptFlag;

pub(crate) const TRANSPORT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");

/// Upper bound on establishing a connection.
pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// How long a single read may block before the interrupt flag is checked.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// An open connection to the daemon.
#[derive(Debug)]
pub enum Connection {
    /// TCP stream to a `tcp://` endpoint.
    Tcp(TcpStream),
    /// Stream to the daemon's Unix domain socket.
    #[cfg(unix)]
    Unix(UnixStream),
}

impl Connection {
    /// Bounds how long each read may block.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<(), TransportError> {
        match self {
            Self::Tcp(stream) => stream.set_read_timeout(timeout),
            #[cfg(unix)]
            Self::Unix(stream) => stream.set_read_timeout(timeout),
        }
        .map_err(TransportError::Configure)
    }
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Tcp(stream) => stream.read(buf),
            #[cfg(unix)]
            Self::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Tcp(stream) => stream.write(buf),
            #[cfg(unix)]
            Self::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            Self::Unix(stream) => stream.flush(),
        }
    }
}

/// How a receive loop ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The daemon closed the connection.
    PeerClosed,
    /// The operator interrupted the exchange.
    Interrupted,
}

/// Failures while exchanging a request with the daemon.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The Unix socket path does not exist.
    #[error("no daemon socket at {endpoint}; is taskmasterd running?")]
    EndpointNotFound { endpoint: String },
    /// The TCP host did not resolve to any address.
    #[error("failed to resolve daemon address {endpoint}: {source}")]
    Resolve { endpoint: String, source: io::Error },
    /// The daemon refused or did not answer the connection.
    #[error("failed to connect to daemon at {endpoint}: {source}")]
    Connect { endpoint: String, source: io::Error },
    /// Unix sockets were requested on a platform without them.
    #[cfg(not(unix))]
    #[error("platform does not support Unix sockets: {0}")]
    UnsupportedUnixTransport(String),
    /// Read timeouts could not be applied.
    #[error("failed to configure daemon connection: {0}")]
    Configure(io::Error),
    /// The request could not be encoded.
    #[error("failed to serialise request: {0}")]
    SerialiseRequest(serde_json::Error),
    /// Writing the request failed.
    #[error("failed to send request to daemon: {0}")]
    SendRequest(io::Error),
    /// Reading the response failed.
    #[error("failed to read response from daemon: {0}")]
    ReadResponse(io::Error),
    /// Response bytes could not be written to the output.
    #[error("failed to forward daemon output: {0}")]
    ForwardResponse(io::Error),
}

/// Opens a connection to `endpoint`.
pub fn connect(endpoint: &SocketEndpoint) -> Result<Connection, TransportError> {
    debug!(target: TRANSPORT_TARGET, %endpoint, "connecting to daemon");
    match endpoint {
        SocketEndpoint::Tcp { host, port } => {
            let endpoint_display = endpoint.to_string();
            let address =
                resolve_tcp_address(host, *port).map_err(|source| TransportError::Resolve {
                    endpoint: endpoint_display.clone(),
                    source,
                })?;

            TcpStream::connect_timeout(&address, CONNECTION_TIMEOUT)
                .map(Connection::Tcp)
                .map_err(|source| TransportError::Connect {
                    endpoint: endpoint_display,
                    source,
                })
        }
        SocketEndpoint::Unix { path } => {
            #[cfg(unix)]
            {
                connect_unix(path.as_str()).map_err(|source| {
                    let endpoint = endpoint.to_string();
                    if source.kind() == io::ErrorKind::NotFound {
                        TransportError::EndpointNotFound { endpoint }
                    } else {
                        TransportError::Connect { endpoint, source }
                    }
                })
            }

            #[cfg(not(unix))]
            {
                let _ = path;
                Err(TransportError::UnsupportedUnixTransport(endpoint.to_string()))
            }
        }
    }
}

fn resolve_tcp_address(host: &str, port: u16) -> io::Result<SocketAddr> {
    let mut addrs = (host, port).to_socket_addrs()?;
    addrs
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no resolved addresses"))
}

#[cfg(unix)]
fn connect_unix(path: &str) -> io::Result<Connection> {
    let socket = Socket::new(Domain::UNIX, Type::STREAM, None)?;
    let address = SockAddr::unix(path)?;
    socket.connect_timeout(&address, CONNECTION_TIMEOUT)?;
    let stream = UnixStream::from(std::os::fd::OwnedFd::from(socket));
    Ok(Connection::Unix(stream))
}

/// Writes the whole encoded request and flushes it.
pub fn send<W: Write>(writer: &mut W, request: &[u8]) -> Result<(), TransportError> {
    writer
        .write_all(request)
        .and_then(|()| writer.flush())
        .map_err(TransportError::SendRequest)?;
    debug!(target: TRANSPORT_TARGET, bytes = request.len(), "request sent");
    Ok(())
}

/// Reads the response in chunks of at most `buffer_size` bytes and hands
/// each non-empty chunk to `on_chunk`.
///
/// Reads that time out or are interrupted by a signal are retried unless
/// `interrupt` has been raised, in which case the loop ends with
/// [`Completion::Interrupted`].
pub fn receive<R, F>(
    reader: &mut R,
    buffer_size: usize,
    interrupt: &InterruptFlag,
    mut on_chunk: F,
) -> Result<Completion, TransportError>
where
    R: Read,
    F: FnMut(&[u8]) -> io::Result<()>,
{
    let mut buffer = vec![0_u8; buffer_size.max(1)];
    loop {
        if interrupt.is_raised() {
            debug!(target: TRANSPORT_TARGET, "exchange interrupted");
            return Ok(Completion::Interrupted);
        }
        match reader.read(&mut buffer) {
            Ok(0) => {
                debug!(target: TRANSPORT_TARGET, "daemon closed the connection");
                return Ok(Completion::PeerClosed);
            }
            Ok(read) => {
                trace!(target: TRANSPORT_TARGET, bytes = read, "response chunk");
                let chunk = buffer.get(..read).unwrap_or(&buffer);
                on_chunk(chunk).map_err(TransportError::ForwardResponse)?;
            }
            Err(error) if is_retryable(&error) => continue,
            Err(error) => return Err(TransportError::ReadResponse(error)),
        }
    }
}

fn is_retryable(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}
