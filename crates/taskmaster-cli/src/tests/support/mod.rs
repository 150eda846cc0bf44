//! Test support utilities for control client coverage.
//!
//! Supplies harness types for starting fake daemons and capturing CLI output
//! so step definitions and unit tests stay focused on their assertions.

mod fake_daemon;

use std::cell::RefCell;
use std::ffi::OsString;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, ensure};
use rstest::fixture;
use taskmaster_config::{Config, SocketEndpoint};
use tempfile::TempDir;

use crate::{AppError, Client, ConfigLoader, IoStreams, Reply, Request, run_with_loader};

pub(super) use fake_daemon::{FakeDaemon, Script};

/// Delay before a scripted interrupt is raised.
const INTERRUPT_DELAY: Duration = Duration::from_millis(300);

/// A config loader that returns a fixed configuration for tests.
pub(super) struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    pub(super) fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

/// Test world holding CLI state, the daemon instance and captured output.
#[derive(Default)]
pub(super) struct TestWorld {
    pub config: Config,
    pub daemon: Option<FakeDaemon>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: Option<ExitCode>,
    pub reply: Option<Reply>,
    pub requests: Vec<String>,
    pub missing_socket_directory: Option<TempDir>,
}

impl TestWorld {
    pub fn start_daemon(&mut self, script: Script) -> Result<()> {
        let daemon = FakeDaemon::spawn(script)?;
        let path = daemon
            .socket()
            .to_str()
            .context("socket path must be UTF-8")?;
        self.config.daemon_socket = SocketEndpoint::unix(path);
        self.daemon = Some(daemon);
        Ok(())
    }

    /// Points the configuration at a socket path that does not exist.
    pub fn point_at_missing_socket(&mut self) -> Result<()> {
        let directory = tempfile::tempdir().context("create socket directory")?;
        let path = directory.path().join("absent.sock");
        let path = path.to_str().context("socket path must be UTF-8")?;
        self.config.daemon_socket = SocketEndpoint::unix(path);
        self.missing_socket_directory = Some(directory);
        Ok(())
    }

    /// Runs the CLI runner with `command_line` split on whitespace.
    pub fn run(&mut self, command_line: &str) -> Result<()> {
        self.stdout.clear();
        self.stderr.clear();
        let args = Self::build_args(command_line);
        let loader = StaticConfigLoader::new(self.config.clone());
        let mut io = IoStreams::new(&mut self.stdout, &mut self.stderr);
        let exit = run_with_loader(args, &mut io, &loader);
        self.exit_code = Some(exit);
        self.collect_requests()
    }

    /// Executes `command_line` through a [`Client`] and raises its interrupt
    /// flag once the exchange is under way.
    pub fn run_and_interrupt(&mut self, command_line: &str) -> Result<()> {
        self.stdout.clear();
        let mut tokens = command_line.split_whitespace().map(str::to_owned);
        let name = tokens.next().context("command line must name a command")?;
        let arguments: Vec<String> = tokens.collect();

        let client = Client::new(self.config.clone());
        let flag = client.interrupt_flag().clone();
        let interrupter = thread::spawn(move || {
            thread::sleep(INTERRUPT_DELAY);
            flag.raise();
        });
        let reply = client.execute(&name, &arguments, &mut self.stdout);
        interrupter
            .join()
            .map_err(|_| anyhow!("interrupter thread panicked"))?;
        self.reply = Some(reply?);
        self.collect_requests()
    }

    fn build_args(command_line: &str) -> Vec<OsString> {
        std::iter::once("taskmasterctl")
            .chain(command_line.split_whitespace())
            .map(OsString::from)
            .collect()
    }

    fn collect_requests(&mut self) -> Result<()> {
        self.requests = match self.daemon.as_mut() {
            Some(daemon) => daemon.take_requests()?,
            None => Vec::new(),
        };
        Ok(())
    }

    pub fn stdout_text(&self) -> Result<String> {
        String::from_utf8(self.stdout.clone()).context("stdout utf8")
    }

    pub fn stderr_text(&self) -> Result<String> {
        String::from_utf8(self.stderr.clone()).context("stderr utf8")
    }

    pub fn assert_exit(&self, expected: ExitCode) -> Result<()> {
        let exit = self.exit_code.context("CLI has not run")?;
        ensure!(
            exit == expected,
            "unexpected exit code {exit:?}; stderr: {}",
            self.stderr_text()?
        );
        Ok(())
    }

    /// Decodes the single recorded request with the client's catalog.
    pub fn decoded_request(&self) -> Result<Request> {
        let [request] = self.requests.as_slice() else {
            return Err(anyhow!(
                "expected exactly one request, found {:?}",
                self.requests
            ));
        };
        let catalog = Client::new(self.config.clone()).catalog().clone();
        Ok(Request::decode(request.as_bytes(), &catalog)?)
    }
}

/// Strips one pair of surrounding quotes from a step argument and expands
/// `\n`.
pub(super) fn step_text(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(trimmed);
    unquoted.replace("\\n", "\n")
}

#[fixture]
pub(super) fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}
