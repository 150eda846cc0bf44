//! Token grammars shared by the argument formatters.
//!
//! Each parser takes one raw token as typed by the operator and either
//! returns a typed value or a [`FormatError`] naming the offending token.

mod numbers;
mod signal;
mod tail;

pub use numbers::{parse_index, parse_port, parse_positive};
pub use signal::{SIGNAL_PREFIX, SIGNAL_TABLE_VERSION, resolve_signal, signal_names};
pub use tail::{TailSpec, parse_tail_spec};
