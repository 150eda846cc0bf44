//! Control client for the taskmaster process supervisor.
//!
//! The crate turns operator commands into JSON requests, validates argument
//! shapes per command, sends each request over the daemon's control socket
//! and streams the textual response back. The runtime can be driven from the
//! binary entrypoint or from tests where configuration loading and the IO
//! streams are substituted.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;

mod catalog;
mod cli;
mod client;
mod config;
mod errors;
mod format;
mod grammar;
mod help;
mod interrupt;
mod render;
mod request;
mod telemetry;
mod transport;

pub use catalog::{
    ArgumentKind, Catalog, CommandSpec, LocalCommand, SignalMode, Target, UsageError, capitalise,
};
pub use client::{Client, CommandError, Plan, Reply};
pub use format::{FormatError, HttpAction, OutputStream, format_arguments};
pub use grammar::{
    SIGNAL_PREFIX, SIGNAL_TABLE_VERSION, TailSpec, parse_index, parse_port, parse_positive,
    parse_tail_spec, resolve_signal, signal_names,
};
pub use help::{write_bare_help, write_command_list, write_help};
pub use interrupt::{InterruptFlag, InterruptGuard};
pub use render::Renderer;
pub use request::{DecodeError, Payload, Request};
pub use telemetry::TelemetryError;
pub use transport::{
    CONNECTION_TIMEOUT, Completion, Connection, POLL_INTERVAL, TransportError, connect, receive,
    send,
};

use cli::Cli;
use config::{ConfigArgumentSplit, split_config_arguments};
pub(crate) use config::{ConfigLoader, SystemConfigLoader};
pub(crate) use errors::AppError;

/// Bundles the IO streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

struct CliRunner<'a, W: Write, E: Write, L: ConfigLoader> {
    io: &'a mut IoStreams<'a, W, E>,
    loader: &'a L,
}

impl<'a, W, E, L> CliRunner<'a, W, E, L>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    fn new(io: &'a mut IoStreams<'a, W, E>, loader: &'a L) -> Self {
        Self { io, loader }
    }

    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&args);
        let cli_arguments = prepare_cli_arguments(&args, &split);

        match self.dispatch(cli_arguments, &split.config_arguments) {
            Ok(exit_code) => exit_code,
            Err(AppError::BareInvocation) => ExitCode::FAILURE,
            Err(error) => {
                let _ = writeln!(self.io.stderr, "{error}");
                ExitCode::FAILURE
            }
        }
    }

    fn dispatch(
        &mut self,
        cli_arguments: Vec<OsString>,
        config_arguments: &[OsString],
    ) -> Result<ExitCode, AppError> {
        let cli = match Cli::try_parse_from(cli_arguments) {
            Ok(cli) => cli,
            Err(error) if is_informational(&error) => {
                let _ = write!(self.io.stdout, "{}", error.render());
                return Ok(ExitCode::SUCCESS);
            }
            Err(error) => return Err(AppError::CliUsage(error)),
        };

        let Some(command) = cli.command else {
            write_bare_help(&mut *self.io.stderr, &Catalog::default())
                .map_err(AppError::WriteHelp)?;
            return Err(AppError::BareInvocation);
        };

        let config = self.loader.load(config_arguments)?;
        telemetry::initialise(&config)?;

        let client = Client::new(config);
        client.execute(&command, &cli.arguments, &mut *self.io.stdout)?;
        Ok(ExitCode::SUCCESS)
    }
}

fn is_informational(error: &clap::Error) -> bool {
    matches!(
        error.kind(),
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
    )
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr);
    run_with_loader(args, &mut io, &SystemConfigLoader)
}

fn prepare_cli_arguments(args: &[OsString], split: &ConfigArgumentSplit) -> Vec<OsString> {
    args.first()
        .into_iter()
        .chain(args.get(split.command_start..).unwrap_or_default())
        .cloned()
        .collect()
}

/// Runs the CLI with a custom configuration loader.
#[must_use]
pub(crate) fn run_with_loader<'a, I, W, E, L>(
    args: I,
    io: &'a mut IoStreams<'a, W, E>,
    loader: &'a L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    CliRunner::new(io, loader).run(args)
}

#[cfg(test)]
mod tests;
