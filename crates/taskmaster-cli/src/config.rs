//! Configuration loading helpers for the control client.
//!
//! Configuration flags lead the command line. They are split off here so
//! the configuration loader sees only the flags it understands while the
//! remaining tokens name the command and its arguments.

use std::ffi::{OsStr, OsString};

use taskmaster_config::Config;

use crate::AppError;

/// Configuration flags recognised ahead of the command, with whether each
/// takes a value.
const CONFIG_CLI_FLAGS: &[(&str, bool)] = &[
    ("--socket", true),
    ("--read-buffer-size", true),
    ("--indexed-signals", false),
    ("--log-filter", true),
    ("--log-format", true),
];

pub(crate) trait ConfigLoader {
    /// Loads configuration for the client.
    ///
    /// # Flag Ordering
    ///
    /// Configuration flags must appear before the command name. Flags after
    /// it are passed to the command as ordinary arguments.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

/// Loads configuration from the process environment and the split flags.
pub(crate) struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::from)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Skip,
}

fn classify_flag(argument: &OsStr) -> FlagAction {
    let argument_text = argument.to_string_lossy();
    if !argument_text.starts_with("--") {
        return FlagAction::Skip;
    }

    let (flag, inline_value) = match argument_text.split_once('=') {
        Some((flag, _)) => (flag, true),
        None => (&*argument_text, false),
    };

    CONFIG_CLI_FLAGS
        .iter()
        .find(|(known, _)| *known == flag)
        .map_or(FlagAction::Skip, |(_, takes_value)| FlagAction::Include {
            needs_value: *takes_value && !inline_value,
        })
}

#[derive(Debug)]
pub(crate) struct ConfigArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) command_start: usize,
}

/// Separates leading configuration flags (plus the binary name) from the
/// command tokens that follow.
pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some((binary, rest)) = args.split_first() else {
        return ConfigArgumentSplit {
            config_arguments: Vec::new(),
            command_start: 0,
        };
    };

    let mut config_arguments = vec![binary.clone()];
    let mut command_start = 1_usize;
    let mut pending_value = false;

    for argument in rest {
        if pending_value {
            pending_value = false;
        } else {
            match classify_flag(argument) {
                FlagAction::Include { needs_value } => pending_value = needs_value,
                FlagAction::Skip => break,
            }
        }
        config_arguments.push(argument.clone());
        command_start += 1;
    }

    ConfigArgumentSplit {
        config_arguments,
        command_start,
    }
}
