//! One request/response cycle: catalog lookup, arity check, formatting,
//! encoding, transport and rendering.
//!
//! Validation failures short-circuit before any connection is opened. The
//! connection lives only as long as [`Client::execute`] and is dropped on
//! every exit path.

use std::io::{self, Write};

use taskmaster_config::Config;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, LocalCommand, SignalMode, Target, UsageError};
use crate::format::{FormatError, format_arguments};
use crate::help::write_help;
use crate::interrupt::{InterruptFlag, InterruptGuard};
use crate::render::Renderer;
use crate::request::Request;
use crate::transport::{self, Completion, POLL_INTERVAL, TransportError};

const CLIENT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::client");

/// What a successfully executed command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// A request was exchanged with the daemon.
    Delivered(Completion),
    /// The operator asked to leave the control shell.
    Exit,
    /// Help was printed.
    Help,
}

/// A validated command, ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Handled in-process.
    Local {
        /// The command to run.
        command: LocalCommand,
        /// First argument, naming a help topic.
        topic: Option<String>,
    },
    /// Sent to the daemon.
    Daemon(Request),
}

/// Failures of a single command cycle.
#[derive(Debug, Error)]
pub enum CommandError {
    /// No command has this name.
    #[error("{0}: command not found")]
    UnknownCommand(String),
    /// Wrong number of arguments.
    #[error(transparent)]
    Usage(#[from] UsageError),
    /// An argument was malformed.
    #[error(transparent)]
    Format(#[from] FormatError),
    /// The exchange with the daemon failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Local output could not be written.
    #[error("failed to write output: {0}")]
    WriteOutput(io::Error),
}

/// Executes commands against the configured daemon.
#[derive(Debug)]
pub struct Client {
    catalog: Catalog,
    config: Config,
    interrupt: InterruptFlag,
}

impl Client {
    /// Builds a client whose catalog follows the configured signal mode.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let signal_mode = if config.indexed_signals() {
            SignalMode::Indexed
        } else {
            SignalMode::Group
        };
        Self {
            catalog: Catalog::standard(signal_mode),
            config,
            interrupt: InterruptFlag::new(),
        }
    }

    /// The command table in use.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Flag that ends an in-flight exchange when raised.
    #[must_use]
    pub const fn interrupt_flag(&self) -> &InterruptFlag {
        &self.interrupt
    }

    /// Validates `arguments` for the command called `name` without any I/O.
    pub fn plan(&self, name: &str, arguments: &[String]) -> Result<Plan, CommandError> {
        let command = self
            .catalog
            .get(name)
            .ok_or_else(|| CommandError::UnknownCommand(name.to_owned()))?;
        command.check_arity(arguments.len())?;

        match command.target() {
            Target::Local(local) => Ok(Plan::Local {
                command: *local,
                topic: arguments.first().cloned(),
            }),
            Target::Daemon { identifier } => {
                let payload = format_arguments(command.kind(), arguments)?;
                Ok(Plan::Daemon(Request::new(
                    identifier.clone(),
                    command.kind(),
                    payload,
                )))
            }
        }
    }

    /// Runs one command, printing any daemon response to `out`.
    pub fn execute<W: Write>(
        &self,
        name: &str,
        arguments: &[String],
        out: &mut W,
    ) -> Result<Reply, CommandError> {
        match self.plan(name, arguments)? {
            Plan::Local {
                command: LocalCommand::Exit,
                ..
            } => Ok(Reply::Exit),
            Plan::Local {
                command: LocalCommand::Help,
                topic,
            } => {
                write_help(out, &self.catalog, topic.as_deref())
                    .map_err(CommandError::WriteOutput)?;
                Ok(Reply::Help)
            }
            Plan::Daemon(request) => self.exchange(&request, out).map(Reply::Delivered),
        }
    }

    fn exchange<W: Write>(
        &self,
        request: &Request,
        out: &mut W,
    ) -> Result<Completion, CommandError> {
        let bytes = request.encode().map_err(TransportError::SerialiseRequest)?;
        let mut connection = transport::connect(self.config.daemon_socket())?;
        connection.set_read_timeout(Some(POLL_INTERVAL))?;

        let _guard = self.interrupt.install().unwrap_or_else(|error| {
            warn!(target: CLIENT_TARGET, %error, "interrupts will terminate the client");
            InterruptGuard::detached()
        });

        transport::send(&mut connection, &bytes)?;
        info!(
            target: CLIENT_TARGET,
            request = request.identifier(),
            "request delivered"
        );

        let mut renderer = Renderer::new(out);
        let outcome = transport::receive(
            &mut connection,
            self.config.read_buffer_size(),
            &self.interrupt,
            |chunk| renderer.write_chunk(chunk),
        );
        let finished = renderer
            .finish(request.is_shutdown(), outcome.as_ref().ok().copied())
            .map_err(TransportError::ForwardResponse);

        let completion = outcome?;
        finished?;
        debug!(
            target: CLIENT_TARGET,
            ?completion,
            printed = renderer.printed(),
            "exchange finished"
        );
        Ok(completion)
    }
}
