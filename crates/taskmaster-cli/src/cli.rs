//! Command-line surface of `taskmasterctl`.

use clap::Parser;

const CONFIGURATION_HELP: &str = "\
Configuration flags (must precede the command):
  --socket <ENDPOINT>          Daemon control socket [env: TASKMASTER_SOCKET]
  --read-buffer-size <BYTES>   Response read size [env: TASKMASTER_READ_BUFFER_SIZE]
  --indexed-signals            Accept an instance index after `signal <sig> <task>`
  --log-filter <FILTER>        Diagnostic log filter [env: TASKMASTER_LOG_FILTER]
  --log-format <FORMAT>        json or compact [env: TASKMASTER_LOG_FORMAT]

Run `taskmasterctl help` for the list of commands.";

/// Control client for the taskmaster process supervisor.
#[derive(Parser, Debug)]
#[command(
    name = "taskmasterctl",
    version,
    disable_help_subcommand = true,
    after_help = CONFIGURATION_HELP
)]
pub(crate) struct Cli {
    /// The command to run (for example `status`).
    #[arg(value_name = "COMMAND")]
    pub(crate) command: Option<String>,
    /// Arguments passed to the command.
    #[arg(
        value_name = "ARG",
        num_args = 0..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub(crate) arguments: Vec<String>,
}
