//! Human-readable status for the supervisory layer.

use crate::client::CatsClient;
use cats_common::robot::model::Model;
use cats_common::robot::status::StatusSnapshot;
use serde::Serialize;
use std::fmt::{self, Write};

/// Coarse device state derived from the running path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeviceState {
    On,
    Running,
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::On => "ON",
            Self::Running => "RUNNING",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub state: DeviceState,
    /// One `Label = value` line per reported field.
    pub text: String,
}

/// `(label, snapshot key)`
type Line = (&'static str, &'static str);

const HEAD: &[Line] = &[
    ("Powered", "Powered"),
    ("Tool", "Tool"),
    ("Path", "Path"),
    ("PathRunning", "PathRunning"),
];

const CATS_TAIL: &[Line] = &[
    ("LidSampleOnTool", "LidSampleOnTool"),
    ("NumSampleOnTool", "NumSampleOnTool"),
    ("Barcode", "Barcode"),
    ("LidSampleOnDiff", "LidSampleOnDiff"),
    ("NumSampleOnDiff", "NumSampleOnDiff"),
    ("NumPlateOnTool", "NumPlateOnTool"),
    ("Well", "Well"),
    ("LN2Regulating", "LN2Regulating"),
    ("LN2Warming", "LN2Warming"),
    ("AutoMode", "AutoMode"),
    ("DefaultStatus", "DefaultStatus"),
    ("SpeedRatio", "SpeedRatio"),
    ("PuckDetectionDewar1", "PuckDetectionDewar1"),
    ("PuckDetectionDewar2", "PuckDetectionDewar2"),
    ("PositionNumberDewar1", "PositionNumberDewar1"),
    ("PositionNumberDewar2", "PositionNumberDewar2"),
];

const ISARA_TAIL: &[Line] = &[
    ("PuckNumberOnTool", "PuckNumberOnTool"),
    ("NumSampleOnTool", "NumSampleOnTool"),
    ("PuckNumberOnTool2", "PuckNumberOnTool2"),
    ("NumSampleOnTool2", "NumSampleOnTool2"),
    ("Barcode", "Barcode"),
    ("PuckNumberOnDiff", "PuckSampleOnDiff"),
    ("NumSampleOnDiff", "NumSampleOnDiff"),
    ("NumPlateOnTool", "NumPlateOnTool"),
    ("LN2Regulating", "LN2Regulating"),
    ("AutoMode", "AutoMode"),
    ("DefaultStatus", "DefaultStatus"),
    ("SpeedRatio", "SpeedRatio"),
    ("PositionNumberDewar1", "PositionNumberDewar1"),
    ("CurrentNumberOfSoaking", "CurrentNumberOfSoaking"),
];

const ISARA2_TAIL: &[Line] = &[
    ("PuckNumberOnTool", "NumPuckOnTool"),
    ("NumSampleOnTool", "NumSampleOnTool"),
    ("PuckNumberOnTool2", "NumPuckOnTool2"),
    ("NumSampleOnTool2", "NumSampleOnTool2"),
    ("Barcode", "Barcode"),
    ("PuckNumberOnDiff", "NumPuckOnDiff"),
    ("NumSampleOnDiff", "NumSampleOnDiff"),
    ("NumPlateOnTool", "NumPlateOnTool"),
    ("LN2Regulating", "LN2Regulating"),
    ("RemoteMode", "RemoteMode"),
    ("FaultStatus", "FaultStatus"),
    ("SpeedRatio", "SpeedRatio"),
    ("CurrentNumberOfSoaking", "CurrentNumberOfSoaking"),
];

/// Build the status text for `snapshot`.
///
/// Fields missing from the snapshot print as `n/a`. The state is
/// `Running` while a path name is reported.
pub fn summarize(model: Model, snapshot: &StatusSnapshot, safe: bool) -> StatusSummary {
    let tail = match model {
        Model::Cats => CATS_TAIL,
        Model::Isara => ISARA_TAIL,
        Model::Isara2 => ISARA2_TAIL,
    };

    let mut text = String::new();
    write_lines(&mut text, snapshot, HEAD);
    let _ = writeln!(text, "PathSafe = {safe}");
    write_lines(&mut text, snapshot, tail);

    let state = match snapshot.text("Path") {
        Some(path) if !path.is_empty() => DeviceState::Running,
        _ => DeviceState::On,
    };
    StatusSummary { state, text }
}

fn write_lines(out: &mut String, snapshot: &StatusSnapshot, lines: &[Line]) {
    for (label, key) in lines {
        let _ = match snapshot.get(key) {
            Some(value) => writeln!(out, "{label} = {value}"),
            None => writeln!(out, "{label} = n/a"),
        };
    }
}

impl CatsClient {
    /// Summary of the last successful poll, `None` before the first one.
    pub fn status_summary(&self) -> Option<StatusSummary> {
        let snapshot = self.last_snapshot()?;
        Some(summarize(self.model(), &snapshot, self.is_safe()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cats_common::robot::status::Value;

    fn snapshot(path: &str) -> StatusSnapshot {
        [
            ("Powered", Value::Flag(true)),
            ("Tool", Value::Text("Double".into())),
            ("Path", Value::Text(path.into())),
            ("PathRunning", Value::Flag(!path.is_empty())),
            ("NumPuckOnTool", Value::Int(3)),
            ("NumPuckOnDiff", Value::Int(-1)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn idle_controller_is_on() {
        let summary = summarize(Model::Isara2, &snapshot(""), true);
        assert_eq!(summary.state, DeviceState::On);
        assert!(summary.text.starts_with("Powered = true\nTool = Double\nPath = \n"));
        assert!(summary.text.contains("PathSafe = true\n"));
        assert!(summary.text.contains("PuckNumberOnTool = 3\n"));
        assert!(summary.text.contains("PuckNumberOnDiff = -1\n"));
        assert!(summary.text.contains("FaultStatus = n/a\n"));
    }

    #[test]
    fn named_path_is_running() {
        let summary = summarize(Model::Cats, &snapshot("getput"), false);
        assert_eq!(summary.state, DeviceState::Running);
        assert!(summary.text.contains("PathSafe = false\n"));
        assert!(summary.text.contains("PositionNumberDewar2 = n/a\n"));
        assert!(!summary.text.contains("CurrentNumberOfSoaking"));
    }

    #[test]
    fn isara_reads_puck_aliases() {
        let summary = summarize(Model::Isara, &snapshot(""), true);
        assert!(summary.text.contains("PuckNumberOnDiff = n/a\n"));
        assert!(summary.text.contains("CurrentNumberOfSoaking = n/a\n"));
        assert!(!summary.text.contains("Well"));
    }

    #[test]
    fn state_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&DeviceState::Running).unwrap(),
            "\"RUNNING\""
        );
    }
}
