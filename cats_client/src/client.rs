//! Client façade.
//!
//! [`CatsClient`] ties the connection, the active model profile and the
//! poll-driven state machines together. It is `Send + Sync`: operator
//! commands may be issued from any thread while one loop polls.

use crate::command::{Command, CommandEncoder, Query};
use crate::connection::Connection;
use crate::decoder;
use crate::inventory::PuckInventory;
use crate::profile::{Field, ModelProfile};
use crate::recovery::{CommandSink, RecoveryAutomaton, RecoveryContext, SampleRef, StartOutcome};
use crate::safety::{PathInfo, PathSample, SafetyTracker};
use cats_common::robot::config::RobotConfig;
use cats_common::robot::consts::MAX_PUCK_SLOTS;
use cats_common::robot::error::ClientError;
use cats_common::robot::model::Model;
use cats_common::robot::status::StatusSnapshot;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// State owned by the poll sequence.
#[derive(Debug)]
struct PollState {
    tracker: SafetyTracker,
    recovery: RecoveryAutomaton,
    inventory: PuckInventory,
    last_snapshot: Option<StatusSnapshot>,
}

impl PollState {
    fn new(config: &RobotConfig, profile: &ModelProfile) -> Self {
        Self {
            tracker: SafetyTracker::new(config.safety),
            recovery: RecoveryAutomaton::new(),
            inventory: PuckInventory::from_config(profile, config.puck_types.as_deref()),
            last_snapshot: None,
        }
    }
}

#[derive(Debug)]
pub struct CatsClient {
    config: RobotConfig,
    connection: Connection,
    profile: RwLock<&'static ModelProfile>,
    /// Single-flight guard, held for the whole poll.
    poll_guard: Mutex<()>,
    /// Held only while telemetry is applied, never across network queries.
    state: Mutex<PollState>,
}

impl CatsClient {
    /// Client for the controller described by `config`. Nothing is opened
    /// until [`connect`](Self::connect).
    pub fn new(config: RobotConfig) -> Self {
        let profile = ModelProfile::for_model(config.model);
        let state = PollState::new(&config, profile);
        Self {
            connection: Connection::new(config.read_timeout(), config.framing),
            profile: RwLock::new(profile),
            poll_guard: Mutex::new(()),
            state: Mutex::new(state),
            config,
        }
    }

    pub fn config(&self) -> &RobotConfig {
        &self.config
    }

    // ─── Connection ─────────────────────────────────────────────────

    /// Open both channels to the configured host.
    pub fn connect(&self) -> Result<(), ClientError> {
        self.connection.connect(
            &self.config.host,
            self.config.operate_port,
            self.config.monitor_port,
        )
    }

    pub fn disconnect(&self) {
        self.connection.disconnect();
    }

    /// One reconnection attempt with the configured interval and timeout.
    pub fn reconnect(&self) -> Result<bool, ClientError> {
        self.connection
            .reconnect(self.config.reconnect_interval(), self.config.reconnect_timeout())
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Error of the last failed reconnection attempt.
    pub fn last_error(&self) -> Option<String> {
        self.connection.last_error()
    }

    pub fn get_last_command_sent(&self) -> String {
        self.connection.last_command()
    }

    // ─── Model ──────────────────────────────────────────────────────

    pub fn model(&self) -> Model {
        self.profile.read().model
    }

    pub fn profile(&self) -> &'static ModelProfile {
        *self.profile.read()
    }

    /// Switch controller generation. Only allowed while disconnected.
    ///
    /// Tracker, recovery and puck layout start over with the new model's
    /// defaults.
    pub fn set_model(&self, model: Model) -> Result<(), ClientError> {
        if self.is_connected() {
            return Err(ClientError::ModelLocked);
        }
        let profile = ModelProfile::for_model(model);
        let _poll = self.poll_guard.lock();
        let mut state = self.state.lock();
        *self.profile.write() = profile;
        *state = PollState {
            inventory: PuckInventory::for_profile(profile),
            ..PollState::new(&self.config, profile)
        };
        info!("Model set to {}", model);
        Ok(())
    }

    // ─── Pucks ──────────────────────────────────────────────────────

    /// Replace the puck layout (`0` ignore, `1` spine, `2` unipuck per slot).
    pub fn set_puck_types(&self, puck_types: &str) -> Result<(), ClientError> {
        let slots = puck_types.chars().count();
        if slots == 0 || slots > MAX_PUCK_SLOTS {
            return Err(ClientError::InvalidArgument(format!(
                "puck types must describe 1..={MAX_PUCK_SLOTS} slots, got {slots}"
            )));
        }
        self.state.lock().inventory.set_types(puck_types);
        debug!("Puck types set to {}", puck_types);
        Ok(())
    }

    pub fn puck_inventory(&self) -> PuckInventory {
        self.state.lock().inventory.clone()
    }

    // ─── Polling ────────────────────────────────────────────────────

    /// Poll the controller once and run the safety and recovery logic.
    ///
    /// # Errors
    ///
    /// - `PollInProgress` if another thread is polling
    /// - `StatusUnavailable` if the poll failed; the connection is then down
    ///
    /// Readers such as [`is_safe`](Self::is_safe) never make a poll fail and
    /// never wait on the network queries.
    pub fn poll(&self) -> Result<StatusSnapshot, ClientError> {
        let _poll = self.poll_guard.try_lock().ok_or(ClientError::PollInProgress)?;

        let profile = self.profile();
        let telemetry = decoder::poll(&self.connection, profile)?;

        let mut guard = self.state.lock();
        let PollState {
            tracker,
            recovery,
            inventory,
            last_snapshot,
        } = &mut *guard;
        inventory.refresh(profile, &telemetry);

        let snap = &telemetry.snapshot;
        let flag = |field| snap.flag(profile.key(field)).unwrap_or(false);
        let running = flag(Field::PathRunning);
        let idle = flag(Field::Idle);
        let sample_on_magnet = flag(Field::SampleOnMagnet);
        let pathname = snap.text(profile.key(Field::PathName)).unwrap_or_default();
        let tool = snap.text(profile.key(Field::Tool)).unwrap_or_default();

        if running && !tracker.info().running && !recovery.is_executing() {
            recovery.capture_path_start(SampleRef {
                puck_lid: snap.int(profile.key(Field::PuckOrLidOnDiff)).unwrap_or(-1),
                sample: snap.int(profile.key(Field::SampleOnDiff)).unwrap_or(-1),
            });
        }

        let executing = recovery.is_executing();
        tracker.update(&PathSample {
            running: running || executing,
            pathname: if executing { "recovery" } else { pathname },
            idle,
            home: flag(Field::Home),
            in_area1: flag(Field::Area1),
            in_area2: flag(Field::Area2),
            tool,
        });
        recovery.detect(tracker.info(), sample_on_magnet);

        if recovery.is_executing() {
            let before = recovery.before_path();
            let sample_type = match profile.model {
                Model::Cats => inventory.type_for_lid(before.puck_lid),
                Model::Isara | Model::Isara2 => 0,
            };
            let mut sink = OperateSink {
                connection: &self.connection,
                profile,
            };
            if let Err(e) = recovery.tick(RecoveryContext { idle, sample_type }, &mut sink) {
                warn!("Recovery halted ({}), start it again once the cause is cleared", e);
            }
        }

        *last_snapshot = Some(telemetry.snapshot.clone());
        Ok(telemetry.snapshot)
    }

    /// Snapshot of the last successful poll.
    pub fn last_snapshot(&self) -> Option<StatusSnapshot> {
        self.state.lock().last_snapshot.clone()
    }

    pub fn is_safe(&self) -> bool {
        self.state.lock().tracker.is_safe()
    }

    pub fn path_info(&self) -> PathInfo {
        self.state.lock().tracker.info().clone()
    }

    pub fn is_recovery_needed(&self) -> bool {
        self.state.lock().recovery.is_needed()
    }

    /// True once a recovery command failed, until recovery is started again.
    pub fn recovery_failed(&self) -> bool {
        self.state.lock().recovery.has_failed()
    }

    /// Why the last recovery attempt stopped.
    pub fn recovery_error(&self) -> Option<String> {
        self.state.lock().recovery.last_error().map(str::to_owned)
    }

    /// Arm the failed-get recovery. It advances on the following polls.
    pub fn start_recovery(&self) -> StartOutcome {
        self.state.lock().recovery.start()
    }

    // ─── Commands ───────────────────────────────────────────────────

    /// Validate, encode and send a command on the operate channel.
    ///
    /// Unsupported or out-of-range commands are rejected before any I/O.
    pub fn execute(&self, command: &Command) -> Result<String, ClientError> {
        send_command(&self.connection, self.profile(), command)
    }

    /// Send a raw status query on the monitor channel.
    pub fn query(&self, query: Query) -> Result<String, ClientError> {
        self.connection.monitor(query.wire_name())
    }
}

impl Drop for CatsClient {
    fn drop(&mut self) {
        if self.connection.is_connected() {
            self.connection.disconnect();
        }
    }
}

fn send_command(
    connection: &Connection,
    profile: &ModelProfile,
    command: &Command,
) -> Result<String, ClientError> {
    let text = CommandEncoder::new(profile).encode(command)?;
    debug!("operate -> {}", text);
    connection.operate(&text)
}

/// Routes recovery commands through the operate channel.
struct OperateSink<'a> {
    connection: &'a Connection,
    profile: &'a ModelProfile,
}

impl CommandSink for OperateSink<'_> {
    fn send(&mut self, command: &Command) -> Result<String, ClientError> {
        send_command(self.connection, self.profile, command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Trajectory, TrajectoryArgs};

    fn client(model: Model) -> CatsClient {
        CatsClient::new(RobotConfig::new("127.0.0.1", model))
    }

    #[test]
    fn client_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CatsClient>();
    }

    #[test]
    fn unsupported_command_fails_before_io() {
        let client = client(Model::Isara2);
        let cmd = Command::Trajectory(Trajectory::Transfer, TrajectoryArgs::with_tool(2));
        assert!(matches!(
            client.execute(&cmd),
            Err(ClientError::UnsupportedOperation { .. })
        ));
        assert_eq!(client.get_last_command_sent(), "");
    }

    #[test]
    fn supported_command_needs_a_connection() {
        let client = client(Model::Cats);
        let cmd = Command::Trajectory(Trajectory::Home, TrajectoryArgs::with_tool(2));
        assert!(matches!(client.execute(&cmd), Err(ClientError::NotConnected)));
    }

    #[test]
    fn poll_while_disconnected_is_unavailable() {
        let client = client(Model::Cats);
        assert!(matches!(
            client.poll(),
            Err(ClientError::StatusUnavailable(_))
        ));
        assert!(client.is_safe());
        assert!(client.last_snapshot().is_none());
    }

    #[test]
    fn model_switch_resets_puck_layout() {
        let client = client(Model::Cats);
        assert_eq!(client.puck_inventory().slots(), 9);
        client.set_model(Model::Isara).unwrap();
        assert_eq!(client.model(), Model::Isara);
        assert_eq!(client.puck_inventory().slots(), 29);
    }

    #[test]
    fn puck_types_are_checked() {
        let client = client(Model::Isara);
        assert!(client.set_puck_types("").is_err());
        assert!(client.set_puck_types(&"1".repeat(33)).is_err());
        client.set_puck_types("2221").unwrap();
        assert_eq!(client.puck_inventory().type_string(), "2221");
    }

    #[test]
    fn recovery_start_without_need() {
        let client = client(Model::Cats);
        assert_eq!(client.start_recovery(), StartOutcome::NothingToDo);
        assert!(!client.is_recovery_needed());
        assert!(!client.recovery_failed());
        assert!(client.recovery_error().is_none());
    }

    #[test]
    fn readers_do_not_block_the_poll_guard() {
        let client = client(Model::Cats);
        let _state = client.state.lock();
        // A reader holding the state lock must not look like a second poller.
        assert!(client.poll_guard.try_lock().is_some());
    }

    #[test]
    fn concurrent_poll_is_rejected() {
        let client = client(Model::Cats);
        let _poll = client.poll_guard.lock();
        assert!(matches!(client.poll(), Err(ClientError::PollInProgress)));
    }
}
