//! The fixed table of commands understood by the client.
//!
//! Every entry carries its own name, documentation and [`ArgumentKind`], so
//! validation never has to recover which command is running. Daemon-bound
//! entries also carry the capitalised wire identifier, derived once when the
//! catalog is built.

use thiserror::Error;

/// Argument shapes accepted by commands. Each kind pairs an arity predicate
/// with a usage phrase and a formatter in [`crate::format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentKind {
    /// No arguments.
    Zero,
    /// Exactly one argument, sent verbatim.
    One,
    /// Zero or one argument, sent verbatim.
    OptionalString,
    /// Zero or one strictly positive integer.
    OptionalPositive,
    /// Optional task name, then an optional instance index.
    ZeroToTwo,
    /// A signal and a task name.
    SignalGroup,
    /// A signal, a task name and an optional instance index.
    SignalIndexed,
    /// A task name, an output stream and an optional tail specification.
    Tail,
    /// An optional tail specification for the daemon's own log.
    Maintail,
    /// `enable <port>`, `disable` or `status`.
    Http,
}

impl ArgumentKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Zero,
        Self::One,
        Self::OptionalString,
        Self::OptionalPositive,
        Self::ZeroToTwo,
        Self::SignalGroup,
        Self::SignalIndexed,
        Self::Tail,
        Self::Maintail,
        Self::Http,
    ];

    /// Returns whether `count` arguments are admissible for this kind.
    #[must_use]
    pub const fn accepts(self, count: usize) -> bool {
        match self {
            Self::Zero => count == 0,
            Self::One => count == 1,
            Self::OptionalString
            | Self::OptionalPositive
            | Self::Maintail => count <= 1,
            Self::ZeroToTwo => count <= 2,
            Self::SignalGroup => count == 2,
            Self::SignalIndexed | Self::Tail => 2 <= count && count <= 3,
            Self::Http => 1 <= count && count <= 2,
        }
    }

    /// Human-readable description of the admissible arguments.
    #[must_use]
    pub const fn usage(self) -> &'static str {
        match self {
            Self::Zero => "doesn't accept an argument",
            Self::One => "requires exactly one argument",
            Self::OptionalString => "accepts zero or one argument",
            Self::OptionalPositive => "accepts zero or one unsigned integer argument",
            Self::ZeroToTwo => "requires zero, one or two arguments",
            Self::SignalGroup => "requires a signal number or name, followed by a task name",
            Self::SignalIndexed => {
                "requires a signal number or name, followed by a task name and an optional index"
            }
            Self::Tail => {
                "requires a task name, an output stream and an optional tail specification"
            }
            Self::Maintail => "accepts zero or one tail specification",
            Self::Http => "requires one of: enable <port>, disable, status",
        }
    }
}

/// Commands handled without contacting the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalCommand {
    /// Ends an interactive session. A no-op for one-shot invocations.
    Exit,
    /// Prints the command list or one command's documentation.
    Help,
}

/// Where a command is executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Sent to the daemon under the given wire identifier.
    Daemon {
        /// Capitalised command name, the key the daemon dispatches on.
        identifier: String,
    },
    /// Handled in-process.
    Local(LocalCommand),
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    name: &'static str,
    summary: &'static str,
    doc: &'static str,
    kind: ArgumentKind,
    target: Target,
}

impl CommandSpec {
    fn daemon(
        name: &'static str,
        kind: ArgumentKind,
        summary: &'static str,
        doc: &'static str,
    ) -> Self {
        Self {
            name,
            summary,
            doc,
            kind,
            target: Target::Daemon {
                identifier: capitalise(name),
            },
        }
    }

    const fn local(
        name: &'static str,
        command: LocalCommand,
        kind: ArgumentKind,
        summary: &'static str,
        doc: &'static str,
    ) -> Self {
        Self {
            name,
            summary,
            doc,
            kind,
            target: Target::Local(command),
        }
    }

    /// Name typed by the operator.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// One-line description used in command listings.
    #[must_use]
    pub const fn summary(&self) -> &'static str {
        self.summary
    }

    /// Full usage documentation.
    #[must_use]
    pub const fn doc(&self) -> &'static str {
        self.doc
    }

    /// Argument shape of the command.
    #[must_use]
    pub const fn kind(&self) -> ArgumentKind {
        self.kind
    }

    /// Execution target.
    #[must_use]
    pub const fn target(&self) -> &Target {
        &self.target
    }

    /// Wire identifier for daemon-bound commands.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        match &self.target {
            Target::Daemon { identifier } => Some(identifier),
            Target::Local(_) => None,
        }
    }

    /// Checks the argument count against the command's kind.
    pub fn check_arity(&self, count: usize) -> Result<(), UsageError> {
        if self.kind.accepts(count) {
            Ok(())
        } else {
            Err(UsageError {
                command: self.name,
                usage: self.kind.usage(),
                doc: self.doc,
            })
        }
    }
}

/// Which `signal` variant the daemon expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignalMode {
    /// `signal <signal> <task>`, delivered to every instance.
    #[default]
    Group,
    /// `signal <signal> <task> [index]`, optionally targeting one instance.
    Indexed,
}

/// The complete command table.
#[derive(Debug, Clone)]
pub struct Catalog {
    commands: Vec<CommandSpec>,
}

impl Catalog {
    /// Builds the standard command surface.
    #[must_use]
    pub fn standard(signal_mode: SignalMode) -> Self {
        use ArgumentKind as K;

        let signal = match signal_mode {
            SignalMode::Group => CommandSpec::daemon(
                "signal",
                K::SignalGroup,
                "Send a signal to a task",
                "signal <signal> <name> : Send a signal, by number or name, to every instance of a task",
            ),
            SignalMode::Indexed => CommandSpec::daemon(
                "signal",
                K::SignalIndexed,
                "Send a signal to a task",
                "signal <signal> <name>         : Send a signal, by number or name, to every instance of a task\n\
                 signal <signal> <name> <index> : Send a signal to a single instance",
            ),
        };

        let commands = vec![
            CommandSpec::daemon(
                "config",
                K::One,
                "Print the configuration of a task",
                "config <name> : Print the configuration of a task as JSON",
            ),
            CommandSpec::daemon(
                "http",
                K::Http,
                "Control log streaming over HTTP",
                "http enable <port> : Serve the daemon logs over HTTP on <port>\n\
                 http disable       : Stop serving logs over HTTP\n\
                 http status        : Report whether logs are served over HTTP",
            ),
            CommandSpec::daemon(
                "maintail",
                K::Maintail,
                "Print the tail of the daemon log",
                "maintail [f][<lines>] : Print the daemon log, or its last <lines>;\n\
                 \x20                       a leading f keeps following new output",
            ),
            CommandSpec::daemon(
                "restart",
                K::ZeroToTwo,
                "Restart tasks",
                "restart                : Restart every task\n\
                 restart <name>         : Restart every instance of a task\n\
                 restart <name> <index> : Restart a single instance",
            ),
            CommandSpec::daemon(
                "shutdown",
                K::Zero,
                "Shut the daemon down",
                "shutdown : Shut the remote taskmasterd down",
            ),
            signal,
            CommandSpec::daemon(
                "start",
                K::ZeroToTwo,
                "Start tasks",
                "start                : Start every task\n\
                 start <name>         : Start every instance of a task\n\
                 start <name> <index> : Start a single instance",
            ),
            CommandSpec::daemon(
                "status",
                K::OptionalString,
                "Print task status",
                "status        : Print the status of every task\n\
                 status <name> : Print the status of a single task",
            ),
            CommandSpec::daemon(
                "stop",
                K::ZeroToTwo,
                "Stop tasks",
                "stop                : Stop every task\n\
                 stop <name>         : Stop every instance of a task\n\
                 stop <name> <index> : Stop a single instance",
            ),
            CommandSpec::daemon(
                "tail",
                K::Tail,
                "Print the tail of a task log",
                "tail <name> <stdout|stderr> [f][<lines>] : Print a task log, or its last <lines>;\n\
                 \x20                                          a leading f keeps following new output",
            ),
            CommandSpec::daemon(
                "update",
                K::OptionalString,
                "Reload the daemon configuration",
                "update            : Reload the configuration file\n\
                 update <filename> : Load another configuration file, adding and removing tasks as needed",
            ),
            CommandSpec::local(
                "exit",
                LocalCommand::Exit,
                K::Zero,
                "Leave the control shell",
                "exit : Leave the control shell",
            ),
            CommandSpec::local(
                "quit",
                LocalCommand::Exit,
                K::Zero,
                "Leave the control shell",
                "quit : Leave the control shell",
            ),
            CommandSpec::local(
                "help",
                LocalCommand::Help,
                K::OptionalString,
                "List commands or describe one",
                "help           : List the available commands\n\
                 help <command> : Describe a command",
            ),
        ];

        Self { commands }
    }

    /// Finds a command by the name the operator typed.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.iter().find(|command| command.name == name)
    }

    /// Finds a daemon-bound command by its wire identifier.
    #[must_use]
    pub fn by_identifier(&self, identifier: &str) -> Option<&CommandSpec> {
        self.commands
            .iter()
            .find(|command| command.identifier() == Some(identifier))
    }

    /// All commands in listing order.
    pub fn iter(&self) -> impl Iterator<Item = &CommandSpec> {
        self.commands.iter()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard(SignalMode::default())
    }
}

/// Derives the wire identifier from a command name: first letter upper-cased.
#[must_use]
pub fn capitalise(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Raised when a command receives an inadmissible number of arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{command} {usage}\nusage:\n{doc}")]
pub struct UsageError {
    command: &'static str,
    usage: &'static str,
    doc: &'static str,
}
