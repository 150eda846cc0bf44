//! Wire encoding of daemon requests.
//!
//! A request is one JSON value per connection. Commands without arguments
//! travel as a bare string (`"Shutdown"`); every other command is a
//! single-key object mapping the wire identifier to its payload, with `null`
//! standing in for an absent payload.

use std::num::NonZeroU64;

use serde::de::DeserializeOwned;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::catalog::{ArgumentKind, Catalog};
use crate::format::{HttpAction, OutputStream};
use crate::grammar::TailSpec;

const SHUTDOWN_IDENTIFIER: &str = "Shutdown";

/// Typed request payload. The variant is fixed by the command's kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    /// A verbatim token (`config`, `status`, `update`).
    Text(String),
    /// A strictly positive integer.
    Count(NonZeroU64),
    /// `[task, index]`; the index is `null` for every instance.
    Task(String, Option<usize>),
    /// `[signal, task]`.
    Signal(u8, String),
    /// `[signal, task, index]`.
    IndexedSignal(u8, String, Option<usize>),
    /// `[task, stream, tail]`.
    Tail(String, OutputStream, TailSpec),
    /// A tail specification for the daemon log.
    TailSpec(TailSpec),
    /// An HTTP log streaming toggle.
    Http(HttpAction),
}

/// A request ready to be written to the daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    identifier: String,
    kind: ArgumentKind,
    payload: Option<Payload>,
}

impl Request {
    /// Builds a request for the command known to the daemon as `identifier`.
    #[must_use]
    pub fn new(
        identifier: impl Into<String>,
        kind: ArgumentKind,
        payload: Option<Payload>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            kind,
            payload,
        }
    }

    /// Capitalised wire identifier.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Argument kind of the originating command.
    #[must_use]
    pub const fn kind(&self) -> ArgumentKind {
        self.kind
    }

    /// Payload, when the command carries one.
    #[must_use]
    pub const fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    /// Whether this request asks the daemon to shut down.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.identifier == SHUTDOWN_IDENTIFIER
    }

    /// Serialises the request to its JSON wire form.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Recovers a request from its wire form using the catalog to learn the
    /// payload shape of each identifier.
    pub fn decode(bytes: &[u8], catalog: &Catalog) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_slice(bytes)?;
        let (identifier, payload) = match value {
            Value::String(identifier) => (identifier, None),
            Value::Object(map) if map.len() == 1 => match map.into_iter().next() {
                Some((identifier, payload)) => (identifier, Some(payload)),
                None => return Err(DecodeError::Shape),
            },
            _ => return Err(DecodeError::Shape),
        };

        let kind = catalog
            .by_identifier(&identifier)
            .map(|command| command.kind())
            .ok_or_else(|| DecodeError::UnknownIdentifier(identifier.clone()))?;

        let payload = match (kind, payload) {
            (ArgumentKind::Zero, None) => None,
            (ArgumentKind::Zero, Some(_)) | (_, None) => return Err(DecodeError::Shape),
            (_, Some(Value::Null)) => None,
            (kind, Some(value)) => Some(decode_payload(kind, value)?),
        };

        Ok(Self {
            identifier,
            kind,
            payload,
        })
    }
}

impl Serialize for Request {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.kind == ArgumentKind::Zero {
            return serializer.serialize_str(&self.identifier);
        }
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.identifier, &self.payload)?;
        map.end()
    }
}

fn decode_payload(kind: ArgumentKind, value: Value) -> Result<Payload, DecodeError> {
    use ArgumentKind as K;

    let payload = match kind {
        K::Zero => return Err(DecodeError::Shape),
        K::One | K::OptionalString => Payload::Text(typed(value)?),
        K::OptionalPositive => Payload::Count(typed(value)?),
        K::ZeroToTwo => {
            let (task, index) = typed(value)?;
            Payload::Task(task, index)
        }
        K::SignalGroup => {
            let (signal, task) = typed(value)?;
            Payload::Signal(signal, task)
        }
        K::SignalIndexed => {
            let (signal, task, index) = typed(value)?;
            Payload::IndexedSignal(signal, task, index)
        }
        K::Tail => {
            let (task, stream, spec) = typed(value)?;
            Payload::Tail(task, stream, spec)
        }
        K::Maintail => Payload::TailSpec(typed(value)?),
        K::Http => Payload::Http(typed(value)?),
    };
    Ok(payload)
}

fn typed<T: DeserializeOwned>(value: Value) -> Result<T, DecodeError> {
    serde_json::from_value(value).map_err(DecodeError::Payload)
}

/// Failures while decoding a request from its wire form.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes were not a JSON value.
    #[error("request is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The value was neither a string nor a single-key object, or disagreed
    /// with its kind about carrying a payload.
    #[error("request has an unexpected shape")]
    Shape,
    /// The identifier is not a daemon command.
    #[error("unknown request identifier: {0}")]
    UnknownIdentifier(String),
    /// The payload did not match the identifier's kind.
    #[error("request payload does not match its command: {0}")]
    Payload(serde_json::Error),
}
