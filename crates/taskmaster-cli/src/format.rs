//! Per-kind argument formatting.
//!
//! [`format_arguments`] turns the operator's tokens into the payload sent to
//! the daemon. Callers check arity first with
//! [`CommandSpec::check_arity`](crate::catalog::CommandSpec::check_arity);
//! the formatter matches on slice shapes, so it can never index past the
//! tokens it was given.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::ArgumentKind;
use crate::grammar::{parse_index, parse_port, parse_positive, parse_tail_spec, resolve_signal};
use crate::request::Payload;

/// Output streams a task log can be tailed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputStream {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
}

impl OutputStream {
    /// Parses a stream name after normalising it to title case, so `stdout`,
    /// `STDOUT` and `Stdout` are all accepted.
    pub fn parse(token: &str) -> Result<Self, FormatError> {
        match title_case(token).as_str() {
            "Stdout" => Ok(Self::Stdout),
            "Stderr" => Ok(Self::Stderr),
            _ => Err(FormatError::InvalidOutputStream {
                token: token.to_owned(),
            }),
        }
    }
}

fn title_case(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Sub-actions of the `http` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpAction {
    /// Start serving logs on the given port.
    Enable(u16),
    /// Stop serving logs.
    Disable,
    /// Report the current state.
    Status,
}

impl HttpAction {
    fn parse(keyword: &str, argument: Option<&str>) -> Result<Self, FormatError> {
        match (keyword, argument) {
            ("enable", Some(port)) => parse_port(port).map(Self::Enable),
            ("enable", None) => Err(FormatError::MissingPort),
            ("disable", None) => Ok(Self::Disable),
            ("status", None) => Ok(Self::Status),
            (action @ ("disable" | "status"), Some(_)) => {
                Err(FormatError::UnexpectedHttpArgument {
                    action: action.to_owned(),
                })
            }
            (other, _) => Err(FormatError::UnknownKeyword {
                token: other.to_owned(),
            }),
        }
    }
}

/// A token failed its domain grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Expected a strictly positive integer.
    #[error("\"{token}\" is not a positive number")]
    NotPositive { token: String },
    /// Expected a non-negative instance index.
    #[error("invalid index: \"{token}\"")]
    InvalidIndex { token: String },
    /// The signal token matched neither a number nor a known name.
    #[error("\"{token}\" is not a valid signal")]
    InvalidSignal { token: String },
    /// The stream name was neither stdout nor stderr.
    #[error("invalid output type: \"{token}\"")]
    InvalidOutputStream { token: String },
    /// A tail specification asked for zero lines.
    #[error("can't request 0 lines")]
    ZeroLines,
    /// A tail specification carried a non-numeric count.
    #[error("\"{token}\" is not a valid number of lines")]
    InvalidLineCount { token: String },
    /// `http enable` without a port.
    #[error("http enabling requires a port")]
    MissingPort,
    /// The port was not an integer in `0..=65535`.
    #[error("\"{token}\" is not a valid port")]
    InvalidPort { token: String },
    /// `http disable` or `http status` followed by an extra token.
    #[error("http {action} does not accept an argument")]
    UnexpectedHttpArgument { action: String },
    /// The `http` sub-action was not recognised.
    #[error("http: unknown keyword: {token}")]
    UnknownKeyword { token: String },
    /// The formatter was handed a count its kind's predicate rejects.
    #[error("{count} arguments are not admissible here")]
    Arity { kind: ArgumentKind, count: usize },
}

/// Builds the payload for `kind` from validated tokens.
///
/// Returns `Ok(None)` when the request carries no payload.
pub fn format_arguments(
    kind: ArgumentKind,
    tokens: &[String],
) -> Result<Option<Payload>, FormatError> {
    use ArgumentKind as K;

    let payload = match (kind, tokens) {
        (K::Zero, []) => None,
        (K::One, [value]) => Some(Payload::Text(value.clone())),
        (K::OptionalString, []) | (K::OptionalPositive, []) | (K::ZeroToTwo, []) => None,
        (K::OptionalString, [value]) => Some(Payload::Text(value.clone())),
        (K::OptionalPositive, [value]) => Some(Payload::Count(parse_positive(value)?)),
        (K::ZeroToTwo, [task]) => Some(Payload::Task(task.clone(), None)),
        (K::ZeroToTwo, [task, index]) => {
            Some(Payload::Task(task.clone(), Some(parse_index(index)?)))
        }
        (K::SignalGroup, [signal, task]) => {
            Some(Payload::Signal(signal_number(signal)?, task.clone()))
        }
        (K::SignalIndexed, [signal, task]) => Some(Payload::IndexedSignal(
            signal_number(signal)?,
            task.clone(),
            None,
        )),
        (K::SignalIndexed, [signal, task, index]) => {
            let signal = signal_number(signal)?;
            Some(Payload::IndexedSignal(
                signal,
                task.clone(),
                Some(parse_index(index)?),
            ))
        }
        (K::Maintail, []) => Some(Payload::TailSpec(parse_tail_spec("")?)),
        (K::Maintail, [spec]) => Some(Payload::TailSpec(parse_tail_spec(spec)?)),
        (K::Tail, [task, stream, rest @ ..]) if rest.len() <= 1 => {
            let stream = OutputStream::parse(stream)?;
            let spec = parse_tail_spec(rest.first().map_or("", String::as_str))?;
            Some(Payload::Tail(task.clone(), stream, spec))
        }
        (K::Http, [keyword]) => Some(Payload::Http(HttpAction::parse(keyword, None)?)),
        (K::Http, [keyword, argument]) => Some(Payload::Http(HttpAction::parse(
            keyword,
            Some(argument.as_str()),
        )?)),
        (kind, tokens) => {
            return Err(FormatError::Arity {
                kind,
                count: tokens.len(),
            });
        }
    };
    Ok(payload)
}

fn signal_number(token: &str) -> Result<u8, FormatError> {
    resolve_signal(token).ok_or_else(|| FormatError::InvalidSignal {
        token: token.to_owned(),
    })
}
