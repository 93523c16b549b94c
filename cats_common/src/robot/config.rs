//! Robot connection configuration types.
//!
//! This module contains the configuration consumed by the client and the
//! monitor binary:
//! - `MonitorConfig` - Top-level file layout (`[shared]` + `[robot]`)
//! - `RobotConfig` - Controller address, model, puck layout and timing
//! - `SafetyConfig` - Pass-counting thresholds of the path safety tracker
//! - `FramingMode` - How one reply frame is read from a socket

use crate::config::{ConfigError, SharedConfig};
use crate::robot::consts::{
    DEFAULT_MONITOR_PORT, DEFAULT_OPERATE_PORT, DEFAULT_READ_TIMEOUT_MS,
    DEFAULT_RECONNECT_INTERVAL_S, DEFAULT_RECONNECT_TIMEOUT_S, DEFAULT_UPDATE_INTERVAL_MS,
    MAX_PUCK_SLOTS,
};
use crate::robot::model::Model;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_operate_port() -> u16 {
    DEFAULT_OPERATE_PORT
}

fn default_monitor_port() -> u16 {
    DEFAULT_MONITOR_PORT
}

fn default_update_interval_ms() -> u64 {
    DEFAULT_UPDATE_INTERVAL_MS
}

fn default_reconnect_interval_s() -> u64 {
    DEFAULT_RECONNECT_INTERVAL_S
}

fn default_reconnect_timeout_s() -> u64 {
    DEFAULT_RECONNECT_TIMEOUT_S
}

fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT_MS
}

/// Complete configuration file of the monitor.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "info"
/// service_name = "cats-monitor"
///
/// [robot]
/// host = "192.168.1.10"
/// model = "isara"
/// puck_types = "22222222222222222222222222222"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub shared: SharedConfig,
    pub robot: RobotConfig,
}

impl MonitorConfig {
    /// Validate both sections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.robot.validate()
    }
}

/// How a reply frame is delimited on the socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FramingMode {
    /// One bounded read is assumed to hold the complete reply.
    #[default]
    SingleRead,
    /// Accumulate reads until the carriage return terminator.
    Delimited,
}

/// Thresholds of the path safety tracker.
///
/// A path becomes safe on an area2 exit once `ri2_count` exceeds the
/// threshold of its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyConfig {
    /// Threshold for paths crossing the diffractometer area once.
    #[serde(default)]
    pub single_pass_threshold: u32,

    /// Threshold for paths crossing the diffractometer area twice.
    #[serde(default = "default_double_pass_threshold")]
    pub double_pass_threshold: u32,
}

fn default_double_pass_threshold() -> u32 {
    1
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            single_pass_threshold: 0,
            double_pass_threshold: default_double_pass_threshold(),
        }
    }
}

/// Controller connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotConfig {
    /// Controller host name or address.
    pub host: String,

    /// Port of the operate (command) channel.
    #[serde(default = "default_operate_port")]
    pub operate_port: u16,

    /// Port of the monitor (telemetry) channel.
    #[serde(default = "default_monitor_port")]
    pub monitor_port: u16,

    /// Controller generation.
    #[serde(default)]
    pub model: Model,

    /// One character per puck slot (`0`=ignore, `1`=spine, `2`=unipuck).
    /// The model default is used when omitted.
    #[serde(default)]
    pub puck_types: Option<String>,

    /// Status polling period in milliseconds.
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,

    /// Wait between reconnection attempts in seconds.
    #[serde(default = "default_reconnect_interval_s")]
    pub reconnect_interval_s: u64,

    /// Give up reconnecting after this many seconds without a connection.
    #[serde(default = "default_reconnect_timeout_s")]
    pub reconnect_timeout_s: u64,

    /// Socket read/write timeout in milliseconds.
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    #[serde(default)]
    pub framing: FramingMode,

    #[serde(default)]
    pub safety: SafetyConfig,
}

impl RobotConfig {
    /// Configuration with defaults for everything but the host.
    pub fn new(host: impl Into<String>, model: Model) -> Self {
        Self {
            host: host.into(),
            operate_port: DEFAULT_OPERATE_PORT,
            monitor_port: DEFAULT_MONITOR_PORT,
            model,
            puck_types: None,
            update_interval_ms: DEFAULT_UPDATE_INTERVAL_MS,
            reconnect_interval_s: DEFAULT_RECONNECT_INTERVAL_S,
            reconnect_timeout_s: DEFAULT_RECONNECT_TIMEOUT_S,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            framing: FramingMode::default(),
            safety: SafetyConfig::default(),
        }
    }

    /// Validate the robot configuration.
    ///
    /// # Validation Rules
    /// 1. `host` is not empty
    /// 2. both ports are non-zero
    /// 3. `update_interval_ms` and `read_timeout_ms` > 0
    /// 4. `puck_types`, when given, has 1..=MAX_PUCK_SLOTS characters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "robot.host cannot be empty".to_string(),
            ));
        }

        if self.operate_port == 0 || self.monitor_port == 0 {
            return Err(ConfigError::ValidationError(format!(
                "robot ports must be non-zero (operate={}, monitor={})",
                self.operate_port, self.monitor_port
            )));
        }

        if self.update_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "robot.update_interval_ms must be greater than 0".to_string(),
            ));
        }

        if self.read_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "robot.read_timeout_ms must be greater than 0".to_string(),
            ));
        }

        if let Some(types) = &self.puck_types {
            let slots = types.chars().count();
            if slots == 0 || slots > MAX_PUCK_SLOTS {
                return Err(ConfigError::ValidationError(format!(
                    "robot.puck_types must describe 1..={} slots, got {}",
                    MAX_PUCK_SLOTS, slots
                )));
            }
        }

        Ok(())
    }

    #[inline]
    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    #[inline]
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_secs(self.reconnect_interval_s)
    }

    #[inline]
    pub fn reconnect_timeout(&self) -> Duration {
        Duration::from_secs(self.reconnect_timeout_s)
    }

    #[inline]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}
