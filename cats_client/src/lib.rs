//! # CATS Client Library
//!
//! Protocol client for the CATS, ISARA and ISARA2 sample changer
//! controllers. The controller exposes two TCP channels: an operate channel
//! for commands and a monitor channel for telemetry. This crate encodes
//! commands in each model's dialect, decodes telemetry into typed snapshots,
//! and runs the path-safety and failed-get recovery logic on every poll.
//!
//! # Module Structure
//!
//! - [`profile`] - Per-model field tables, supported commands, argument layouts
//! - [`connection`] - Two-channel TCP transport with echo verification
//! - [`command`] - Command model and encoder
//! - [`decoder`] - Telemetry polling and decoding
//! - [`inventory`] - Puck layout and presence
//! - [`safety`] - Diffractometer clearance tracking
//! - [`recovery`] - Failed-get recovery automaton
//! - [`client`] - `CatsClient` façade
//! - [`operations`] - One method per robot operation
//! - [`summary`] - Status text for supervisory layers
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                          CatsClient                            │
//! │                                                                │
//! │  execute ──► CommandEncoder ──┐                                │
//! │                 (profile)     │                                │
//! │                               ▼                                │
//! │                        ┌─────────────┐   operate  :1000        │
//! │                        │ Connection  │◄─────────────────────►  │
//! │                        └─────────────┘   monitor  :10000       │
//! │                               │                                │
//! │  poll ──► decoder ◄───────────┘                                │
//! │             │                                                  │
//! │             ▼                                                  │
//! │   PuckInventory ─► SafetyTracker ─► RecoveryAutomaton          │
//! │                                        │ (abort, setdiffr,     │
//! │                                        ▼  home)                │
//! │                                   CommandEncoder               │
//! └────────────────────────────────────────────────────────────────┘
//! ```

pub mod client;
pub mod command;
pub mod connection;
pub mod decoder;
pub mod inventory;
pub mod operations;
pub mod profile;
pub mod recovery;
pub mod safety;
pub mod summary;

// Re-export key types for convenience
pub use crate::client::CatsClient;
pub use crate::command::{Command, CommandEncoder, Query, SampleSlot, Shift, Trajectory, TrajectoryArgs};
pub use crate::profile::{Field, ModelProfile};
pub use crate::recovery::StartOutcome;
pub use crate::safety::PathInfo;
pub use crate::summary::{DeviceState, StatusSummary};
