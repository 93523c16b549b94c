//! Protocol and client constants.
//!
//! Port numbers, timing defaults and wire-level limits shared by the
//! client library and the monitor binary.

/// Canonical monitor service name (used for logging).
pub const MONITOR_SERVICE_NAME: &str = "cats-monitor";

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "/etc/cats/monitor.toml";

/// Default TCP port of the operate (command) channel.
pub const DEFAULT_OPERATE_PORT: u16 = 1000;

/// Default TCP port of the monitor (telemetry) channel.
pub const DEFAULT_MONITOR_PORT: u16 = 10000;

/// Default status polling period in milliseconds.
pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 300;

/// Default wait between reconnection attempts in seconds.
pub const DEFAULT_RECONNECT_INTERVAL_S: u64 = 5;

/// Default time without a connection before giving up, in seconds.
pub const DEFAULT_RECONNECT_TIMEOUT_S: u64 = 30;

/// Default socket read/write timeout in milliseconds.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 2000;

/// Upper bound of a single reply frame in bytes.
pub const MAX_FRAME_LEN: usize = 4096;

/// Terminator appended to every command and stripped from every reply.
pub const COMMAND_TERMINATOR: char = '\r';

/// Decimal places kept for floating-point telemetry.
pub const FLOAT_PRECISION: i32 = 3;

/// Maximum number of puck slots accepted in a puck type string.
pub const MAX_PUCK_SLOTS: usize = 32;

/// Lid number the controller uses for the hot puck.
pub const HOT_PUCK_LID: i64 = 100;

/// Tool used by the puck detection trajectory.
pub const PUCK_DETECT_TOOL: i64 = 4;

/// Tool sent home at the end of a recovery.
pub const RECOVERY_HOME_TOOL: i64 = 2;

/// Samples held by a spine puck.
pub const SPINE_CAPACITY: u8 = 10;

/// Samples held by a unipuck.
pub const UNIPUCK_CAPACITY: u8 = 16;
