//! Per-model protocol profiles.
//!
//! Everything that differs between the three controller generations lives
//! behind a [`ModelProfile`]: the telemetry field tables, the digital I/O
//! position maps, the puck layout and the command dialect. The decoder and
//! encoder are written once against this data.
//!
//! # Module Structure
//!
//! - `cats` - CATS (lid addressing, 20-slot trajectories)
//! - `isara` - ISARA (puck addressing, masked 20-slot trajectories)
//! - `isara2` - ISARA2 (compact trajectories, CSV digital I/O)

mod cats;
mod isara;
mod isara2;

use crate::command::{Command, Query, Trajectory, TrajectoryArgs};
use cats_common::robot::model::Model;
use std::fmt;

// ─── Field Tables ───────────────────────────────────────────────────

/// How a positional telemetry value is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Flag,
    Int,
    Float,
    Text,
    /// Operator text that may itself contain commas. A table holds at most
    /// one; the surplus tokens of an over-long reply are joined back into it.
    FreeText,
}

/// One positional value of a `state` or `position` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn flag(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Flag }
    }

    pub const fn int(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Int }
    }

    pub const fn float(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Float }
    }

    pub const fn text(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Text }
    }

    pub const fn free_text(name: &'static str) -> Self {
        Self { name, kind: FieldKind::FreeText }
    }
}

/// Named position inside a digital I/O reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoSlot {
    pub index: usize,
    pub name: &'static str,
}

impl IoSlot {
    pub const fn new(index: usize, name: &'static str) -> Self {
        Self { index, name }
    }
}

/// Wire shape of the `di` / `do` replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoEncoding {
    /// One `'0'`/`'1'` character per position.
    Dense,
    /// Comma-separated integers, non-zero is true.
    Csv,
}

/// Where puck presence bits come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceSource {
    /// Named I/O flags `{prefix}{slot}{suffix}`, slots counted from 1.
    Signals {
        prefix: &'static str,
        suffix: &'static str,
    },
    /// The raw `di2` reply, one character per slot.
    SecondaryInputs,
}

// ─── Logical Signals ────────────────────────────────────────────────

/// Signals the client reads regardless of model.
///
/// Each profile maps them onto its own field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Powered,
    PathName,
    PathRunning,
    Tool,
    SampleOnMagnet,
    Idle,
    Home,
    Area1,
    Area2,
    PuckOrLidOnDiff,
    SampleOnDiff,
}

impl Field {
    pub const COUNT: usize = 11;

    /// Signals without which a poll is not usable.
    pub const REQUIRED: [Field; 6] = [
        Field::PathRunning,
        Field::PathName,
        Field::Idle,
        Field::Area1,
        Field::Area2,
        Field::SampleOnMagnet,
    ];
}

// ─── Dialect ────────────────────────────────────────────────────────

/// Command rules of one controller generation.
pub trait Dialect: Send + Sync + fmt::Debug {
    /// Whether the controller knows this command at all.
    fn supports(&self, command: &Command) -> bool;

    /// Whether `tool` may drive `trajectory`.
    fn tool_allowed(&self, trajectory: Trajectory, tool: i64) -> bool;

    /// Positional wire arguments of a trajectory.
    fn layout(&self, trajectory: Trajectory, args: &TrajectoryArgs) -> Vec<String>;
}

/// Static description of one controller generation.
#[derive(Debug)]
pub struct ModelProfile {
    pub model: Model,
    /// Positional layout of the `state` reply.
    pub state: &'static [FieldSpec],
    pub digital_inputs: &'static [IoSlot],
    pub digital_outputs: &'static [IoSlot],
    pub io_encoding: IoEncoding,
    /// Layout of the `position` reply, empty when not polled.
    pub position: &'static [FieldSpec],
    /// Store the raw `message` reply as the `Message` field.
    pub polls_message: bool,
    /// Poll `di2` for puck presence.
    pub polls_secondary_inputs: bool,
    /// `(source, alias)` pairs copied after decoding.
    pub aliases: &'static [(&'static str, &'static str)],
    pub presence: PresenceSource,
    /// One puck type character per dewar slot.
    pub default_puck_types: &'static str,
    /// Highest puck (or lid) number accepted by sample commands.
    pub max_puck_lid: i64,
    signals: [&'static str; Field::COUNT],
    dialect: &'static dyn Dialect,
}

impl ModelProfile {
    pub fn for_model(model: Model) -> &'static ModelProfile {
        match model {
            Model::Cats => &cats::PROFILE,
            Model::Isara => &isara::PROFILE,
            Model::Isara2 => &isara2::PROFILE,
        }
    }

    /// Field name carrying a logical signal.
    #[inline]
    pub fn key(&self, field: Field) -> &'static str {
        self.signals[field as usize]
    }

    #[inline]
    pub fn supports(&self, command: &Command) -> bool {
        self.dialect.supports(command)
    }

    #[inline]
    pub fn tool_allowed(&self, trajectory: Trajectory, tool: i64) -> bool {
        self.dialect.tool_allowed(trajectory, tool)
    }

    #[inline]
    pub fn layout(&self, trajectory: Trajectory, args: &TrajectoryArgs) -> Vec<String> {
        self.dialect.layout(trajectory, args)
    }

    /// Number of dewar puck slots.
    #[inline]
    pub fn puck_slots(&self) -> usize {
        self.default_puck_types.len()
    }

    /// Queries issued by one poll, in order.
    pub fn poll_plan(&self) -> Vec<Query> {
        let mut plan = vec![Query::State, Query::DigitalInputs, Query::DigitalOutputs];
        if self.polls_secondary_inputs {
            plan.push(Query::SecondaryInputs);
        }
        if !self.position.is_empty() {
            plan.push(Query::Position);
        }
        if self.polls_message {
            plan.push(Query::Message);
        }
        plan
    }

    /// Every field name a complete poll can produce.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.state
            .iter()
            .map(|f| f.name)
            .chain(self.digital_inputs.iter().map(|s| s.name))
            .chain(self.digital_outputs.iter().map(|s| s.name))
            .chain(self.position.iter().map(|f| f.name))
            .chain(self.polls_message.then_some("Message"))
            .chain(self.aliases.iter().map(|(_, alias)| *alias))
    }
}

// ─── Shared Layout ──────────────────────────────────────────────────

/// Slot count of the CATS/ISARA trajectory argument list.
pub(crate) const GENERIC_ARG_COUNT: usize = 20;

/// The 20 positional arguments shared by CATS and ISARA.
///
/// tool, puck/lid, sample, new puck/lid, new sample, plate, well, type,
/// drop, toolcal, x, y, z, angle, oscillations, exposure, step, final
/// angle and two reserved zeros.
pub(crate) fn generic_layout(args: &TrajectoryArgs) -> Vec<String> {
    let layout = vec![
        args.tool.to_string(),
        args.puck_lid.to_string(),
        args.sample.to_string(),
        args.new_puck_lid.to_string(),
        args.new_sample.to_string(),
        args.plate.to_string(),
        args.well.to_string(),
        args.sample_type.to_string(),
        args.drop.to_string(),
        args.toolcal.to_string(),
        args.x_shift.to_string(),
        args.y_shift.to_string(),
        args.z_shift.to_string(),
        args.angle.to_string(),
        args.oscillations.to_string(),
        args.exp_time.to_string(),
        args.step.to_string(),
        args.final_angle.to_string(),
        "0".to_string(),
        "0".to_string(),
    ];
    debug_assert_eq!(layout.len(), GENERIC_ARG_COUNT);
    layout
}
