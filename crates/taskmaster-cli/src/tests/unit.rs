//! Unit tests for the CLI runner.

use std::ffi::OsString;
use std::process::ExitCode;

use taskmaster_config::Config;

use super::support::{FakeDaemon, Script, StaticConfigLoader};
use crate::{AppError, ConfigLoader, IoStreams, run_with_loader};

/// A config loader that panics if called, proving that an invocation
/// short-circuits before configuration loading.
struct PanickingLoader;

impl ConfigLoader for PanickingLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        panic!("configuration must not be loaded");
    }
}

/// A loader that records the arguments it was given.
#[derive(Default)]
struct RecordingLoader {
    seen: std::cell::RefCell<Vec<OsString>>,
}

impl ConfigLoader for RecordingLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        self.seen.borrow_mut().extend_from_slice(args);
        Ok(Config::default())
    }
}

struct Captured {
    exit: ExitCode,
    stdout: String,
    stderr: String,
}

fn run_captured<L: ConfigLoader>(args: &[&str], loader: &L) -> Captured {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut io = IoStreams::new(&mut stdout, &mut stderr);
    let exit = run_with_loader(args.iter().map(OsString::from), &mut io, loader);
    Captured {
        exit,
        stdout: String::from_utf8(stdout).expect("stdout utf8"),
        stderr: String::from_utf8(stderr).expect("stderr utf8"),
    }
}

#[test]
fn bare_invocation_prints_command_list_to_stderr() {
    let captured = run_captured(&["taskmasterctl"], &PanickingLoader);
    assert_eq!(captured.exit, ExitCode::FAILURE);
    assert!(captured.stdout.is_empty());
    assert!(captured.stderr.contains("Usage: taskmasterctl"));
    assert!(captured.stderr.contains("maintail"));
    assert!(captured.stderr.contains("shutdown"));
}

#[test]
fn help_flag_prints_to_stdout_and_succeeds() {
    let captured = run_captured(&["taskmasterctl", "--help"], &PanickingLoader);
    assert_eq!(captured.exit, ExitCode::SUCCESS);
    assert!(captured.stdout.contains("Configuration flags"));
}

#[test]
fn configuration_flags_are_split_from_the_command() {
    let loader = RecordingLoader::default();
    let captured = run_captured(
        &["taskmasterctl", "--log-filter", "debug", "help", "status"],
        &loader,
    );
    assert_eq!(captured.exit, ExitCode::SUCCESS);
    assert_eq!(
        loader.seen.borrow().as_slice(),
        [
            OsString::from("taskmasterctl"),
            OsString::from("--log-filter"),
            OsString::from("debug"),
        ]
    );
    assert!(captured.stdout.starts_with("status        :"));
}

#[test]
fn help_command_lists_commands_on_stdout() {
    let captured = run_captured(&["taskmasterctl", "help"], &RecordingLoader::default());
    assert_eq!(captured.exit, ExitCode::SUCCESS);
    assert!(captured.stdout.starts_with("Commands:"));
}

#[test]
fn unknown_command_fails_without_contacting_daemon() {
    let mut daemon = FakeDaemon::spawn(Script::replying(&["unused"])).expect("spawn daemon");
    let mut config = Config::default();
    config.daemon_socket =
        taskmaster_config::SocketEndpoint::unix(daemon.socket().to_str().expect("utf-8 path"));
    let captured = run_captured(
        &["taskmasterctl", "frobnicate"],
        &StaticConfigLoader::new(config),
    );
    assert_eq!(captured.exit, ExitCode::FAILURE);
    assert_eq!(captured.stderr, "frobnicate: command not found\n");
    assert!(daemon.take_requests().expect("daemon result").is_empty());
}
