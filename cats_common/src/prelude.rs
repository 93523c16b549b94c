//! Prelude module for common re-exports.
//!
//! This module provides convenient re-exports of commonly used types
//! so that consumers can do `use cats_common::prelude::*;` and get
//! the most important types without listing individual paths.
//!
//! # Usage
//!
//! ```rust
//! use cats_common::prelude::*;
//! ```

use std::time::Duration;

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, SharedConfig};
pub use crate::robot::config::{FramingMode, MonitorConfig, RobotConfig, SafetyConfig};

// ─── Robot ──────────────────────────────────────────────────────────
pub use crate::robot::error::ClientError;
pub use crate::robot::model::{Model, PuckType};
pub use crate::robot::status::{StatusSnapshot, Value};

/// Default status polling period.
pub const DEFAULT_UPDATE_INTERVAL: Duration =
    Duration::from_millis(crate::robot::consts::DEFAULT_UPDATE_INTERVAL_MS);
