//! Typed status snapshot.
//!
//! A [`StatusSnapshot`] holds one decoded poll of the controller: every
//! telemetry field keyed by its logical name. Snapshots are immutable; each
//! successful poll produces a new one.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// One decoded telemetry value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean flag (`"1"` on the wire).
    Flag(bool),
    /// Signed integer, `-1` when the controller sent an empty field.
    Int(i64),
    /// Floating-point value rounded to the telemetry precision.
    Float(f64),
    /// Free text.
    Text(String),
}

impl Value {
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Immutable mapping from logical field name to typed value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StatusSnapshot {
    fields: BTreeMap<&'static str, Value>,
}

impl StatusSnapshot {
    /// Value of a field, if the active model reports it.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_flag)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_int)
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_float)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_text)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }

    /// Fields whose value differs from `previous` (or are new).
    ///
    /// This is what a supervisory layer turns into change notifications.
    pub fn changes_since<'a>(
        &'a self,
        previous: &'a StatusSnapshot,
    ) -> impl Iterator<Item = (&'static str, &'a Value)> + 'a {
        self.fields
            .iter()
            .filter(move |(k, v)| previous.fields.get(*k) != Some(*v))
            .map(|(k, v)| (*k, v))
    }
}

impl From<BTreeMap<&'static str, Value>> for StatusSnapshot {
    fn from(fields: BTreeMap<&'static str, Value>) -> Self {
        Self { fields }
    }
}

impl FromIterator<(&'static str, Value)> for StatusSnapshot {
    fn from_iter<I: IntoIterator<Item = (&'static str, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StatusSnapshot {
        [
            ("Powered", Value::Flag(true)),
            ("Path", Value::Text(String::new())),
            ("NumSampleOnDiff", Value::Int(-1)),
            ("Xpos", Value::Float(12.345)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn typed_accessors() {
        let snap = sample();
        assert_eq!(snap.flag("Powered"), Some(true));
        assert_eq!(snap.text("Path"), Some(""));
        assert_eq!(snap.int("NumSampleOnDiff"), Some(-1));
        assert_eq!(snap.float("Xpos"), Some(12.345));
        assert_eq!(snap.flag("Path"), None);
        assert!(snap.get("Missing").is_none());
    }

    #[test]
    fn changes_since_reports_only_differences() {
        let old = sample();
        let new: StatusSnapshot = [
            ("Powered", Value::Flag(false)),
            ("Path", Value::Text(String::new())),
            ("NumSampleOnDiff", Value::Int(-1)),
            ("Xpos", Value::Float(12.345)),
            ("Message", Value::Text("ok".into())),
        ]
        .into_iter()
        .collect();

        let changed: Vec<_> = new.changes_since(&old).map(|(k, _)| k).collect();
        assert_eq!(changed, vec!["Message", "Powered"]);
    }

    #[test]
    fn serializes_as_flat_json_object() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("\"Powered\":true"));
        assert!(json.contains("\"NumSampleOnDiff\":-1"));
    }
}
