//! Command listings and per-command documentation.

use std::io::{self, Write};

use crate::catalog::{ArgumentKind, Catalog};
use crate::grammar::{SIGNAL_PREFIX, SIGNAL_TABLE_VERSION, signal_names};

const USAGE: &str = "Usage: taskmasterctl [OPTIONS] <COMMAND> [ARG]...";
const POINTER: &str = "Run 'taskmasterctl help <command>' for details on a command.";

/// Writes the short help shown when no command was given.
pub fn write_bare_help<W: Write>(writer: &mut W, catalog: &Catalog) -> io::Result<()> {
    writeln!(writer, "{USAGE}\n")?;
    write_command_list(writer, catalog)?;
    writeln!(writer, "\n{POINTER}")
}

/// Writes every command with its one-line summary.
pub fn write_command_list<W: Write>(writer: &mut W, catalog: &Catalog) -> io::Result<()> {
    let width = catalog
        .iter()
        .map(|command| command.name().len())
        .max()
        .unwrap_or(0);
    writeln!(writer, "Commands:")?;
    for command in catalog.iter() {
        writeln!(
            writer,
            "  {name:<width$}  {summary}",
            name = command.name(),
            summary = command.summary()
        )?;
    }
    Ok(())
}

/// Handles `help [command]`.
pub fn write_help<W: Write>(
    writer: &mut W,
    catalog: &Catalog,
    topic: Option<&str>,
) -> io::Result<()> {
    match topic {
        None => write_command_list(writer, catalog),
        Some(name) => match catalog.get(name) {
            Some(command) => {
                writeln!(writer, "{}", command.doc())?;
                if matches!(
                    command.kind(),
                    ArgumentKind::SignalGroup | ArgumentKind::SignalIndexed
                ) {
                    write_signal_table(writer)?;
                }
                Ok(())
            }
            None => writeln!(writer, "*** No help on {name}"),
        },
    }
}

fn write_signal_table<W: Write>(writer: &mut W) -> io::Result<()> {
    let names: Vec<&str> = signal_names()
        .map(|name| name.strip_prefix(SIGNAL_PREFIX).unwrap_or(name))
        .collect();
    writeln!(
        writer,
        "signal names (table revision {SIGNAL_TABLE_VERSION}): {}",
        names.join(" ")
    )
}
