//! Status decoding.
//!
//! One poll issues the monitor queries of the active profile in a fixed
//! order, then turns the positional replies into a [`StatusSnapshot`].
//! Fetching and decoding are split so that decoding stays a pure function
//! of the raw replies.
//!
//! ```text
//!   state(v0,v1,...)   ─┐
//!   di(0101...)         │   decode(profile, raw)
//!   do(1100...)         ├─────────────────────────►  StatusSnapshot
//!   di2 / position /    │
//!   message (per model)─┘
//! ```

use crate::command::Query;
use crate::connection::Connection;
use crate::profile::{Field, FieldKind, FieldSpec, IoEncoding, IoSlot, ModelProfile};
use cats_common::robot::consts::FLOAT_PRECISION;
use cats_common::robot::error::ClientError;
use cats_common::robot::status::{StatusSnapshot, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Replies of one poll, `\r` already stripped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTelemetry {
    pub state: String,
    pub digital_inputs: String,
    pub digital_outputs: String,
    pub secondary_inputs: Option<String>,
    pub position: Option<String>,
    pub message: Option<String>,
}

/// Decoded poll.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Telemetry {
    pub snapshot: StatusSnapshot,
    /// Content of the `di2` reply, when the model polls it.
    pub secondary_inputs: Option<String>,
}

/// Fetch and decode one poll.
///
/// Any failure marks the connection down and surfaces as
/// `StatusUnavailable`; no partial snapshot is returned.
pub fn poll(connection: &Connection, profile: &ModelProfile) -> Result<Telemetry, ClientError> {
    let raw = fetch(connection, profile)?;
    decode(profile, &raw)
}

/// Issue the poll queries of `profile`.
pub fn fetch(connection: &Connection, profile: &ModelProfile) -> Result<RawTelemetry, ClientError> {
    let mut raw = RawTelemetry::default();
    for query in profile.poll_plan() {
        let reply = connection.monitor(query.wire_name()).map_err(|e| {
            connection.mark_down();
            ClientError::StatusUnavailable(format!("{} query failed: {}", query.wire_name(), e))
        })?;
        match query {
            Query::State => raw.state = reply,
            Query::DigitalInputs => raw.digital_inputs = reply,
            Query::DigitalOutputs => raw.digital_outputs = reply,
            Query::SecondaryInputs => raw.secondary_inputs = Some(reply),
            Query::Position => raw.position = Some(reply),
            Query::Message => raw.message = Some(reply),
            Query::Config => {}
        }
    }
    Ok(raw)
}

/// Build a snapshot from raw replies.
///
/// Values beyond a table are ignored, missing trailing values leave their
/// fields absent. Fails with `StatusUnavailable` on an unparsable number or
/// when one of the signals the client depends on is missing.
pub fn decode(profile: &ModelProfile, raw: &RawTelemetry) -> Result<Telemetry, ClientError> {
    let mut fields = BTreeMap::new();

    decode_positional(profile.state, unwrap_reply(&raw.state), &mut fields)?;
    decode_io(
        profile.digital_inputs,
        profile.io_encoding,
        unwrap_reply(&raw.digital_inputs),
        &mut fields,
    )?;
    decode_io(
        profile.digital_outputs,
        profile.io_encoding,
        unwrap_reply(&raw.digital_outputs),
        &mut fields,
    )?;

    if let Some(position) = &raw.position {
        decode_positional(profile.position, unwrap_reply(position), &mut fields)?;
    }
    if profile.polls_message {
        if let Some(message) = &raw.message {
            fields.insert("Message", Value::Text(message.clone()));
        }
    }

    for (source, alias) in profile.aliases {
        if let Some(value) = fields.get(source).cloned() {
            fields.insert(*alias, value);
        }
    }

    for field in Field::REQUIRED {
        let key = profile.key(field);
        if !fields.contains_key(key) {
            return Err(ClientError::StatusUnavailable(format!(
                "{} status lacks {}",
                profile.model, key
            )));
        }
    }

    let secondary_inputs = raw
        .secondary_inputs
        .as_deref()
        .map(|reply| unwrap_reply(reply).to_string());

    debug!("Decoded {} status fields", fields.len());
    Ok(Telemetry {
        snapshot: StatusSnapshot::from(fields),
        secondary_inputs,
    })
}

/// Content between the first `(` and the last `)`.
///
/// A reply without parentheses is returned unchanged.
pub fn unwrap_reply(reply: &str) -> &str {
    let Some(open) = reply.find('(') else {
        return reply;
    };
    let inner = &reply[open + 1..];
    match inner.rfind(')') {
        Some(close) => &inner[..close],
        None => inner,
    }
}

/// Round to the telemetry precision.
#[inline]
pub fn round_value(value: f64) -> f64 {
    let scale = 10f64.powi(FLOAT_PRECISION);
    (value * scale).round() / scale
}

/// Decode a comma-separated reply against `specs`.
///
/// When the reply carries more tokens than the table and the table has a
/// free-text slot, the surplus belongs to that slot: an ISARA2 controller
/// message may contain commas. Otherwise surplus tokens are ignored.
fn decode_positional(
    specs: &[FieldSpec],
    content: &str,
    fields: &mut BTreeMap<&'static str, Value>,
) -> Result<(), ClientError> {
    let tokens: Vec<&str> = content.split(',').collect();
    let surplus = tokens.len().saturating_sub(specs.len());
    let mut next = 0;
    for spec in specs {
        if next >= tokens.len() {
            break;
        }
        if spec.kind == FieldKind::FreeText && surplus > 0 {
            let end = next + surplus + 1;
            fields.insert(spec.name, Value::Text(tokens[next..end].join(",")));
            next = end;
        } else {
            fields.insert(spec.name, decode_value(spec, tokens[next])?);
            next += 1;
        }
    }
    Ok(())
}

fn decode_value(spec: &FieldSpec, text: &str) -> Result<Value, ClientError> {
    let trimmed = text.trim();
    let bad = |what: &str| {
        ClientError::StatusUnavailable(format!("{} is not {}: {:?}", spec.name, what, text))
    };

    match spec.kind {
        FieldKind::Flag => Ok(Value::Flag(
            trimmed == "1" || trimmed.parse::<i64>().is_ok_and(|v| v != 0),
        )),
        FieldKind::Int if trimmed.is_empty() => Ok(Value::Int(-1)),
        FieldKind::Int => trimmed
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| bad("an integer")),
        FieldKind::Float if trimmed.is_empty() => Ok(Value::Float(-1.0)),
        FieldKind::Float => trimmed
            .parse::<f64>()
            .map(|v| Value::Float(round_value(v)))
            .map_err(|_| bad("a number")),
        FieldKind::Text | FieldKind::FreeText => Ok(Value::Text(text.to_string())),
    }
}

fn decode_io(
    slots: &[IoSlot],
    encoding: IoEncoding,
    content: &str,
    fields: &mut BTreeMap<&'static str, Value>,
) -> Result<(), ClientError> {
    match encoding {
        IoEncoding::Dense => {
            let bits = content.as_bytes();
            for slot in slots {
                if let Some(bit) = bits.get(slot.index) {
                    fields.insert(slot.name, Value::Flag(*bit == b'1'));
                }
            }
        }
        IoEncoding::Csv => {
            let values: Vec<&str> = content.split(',').collect();
            for slot in slots {
                let Some(text) = values.get(slot.index) else {
                    continue;
                };
                let value = text.trim().parse::<i64>().map_err(|_| {
                    ClientError::StatusUnavailable(format!(
                        "{} is not an integer: {:?}",
                        slot.name, text
                    ))
                })?;
                fields.insert(slot.name, Value::Flag(value != 0));
            }
        }
    }
    Ok(())
}
