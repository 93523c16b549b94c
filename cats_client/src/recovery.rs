//! Failed-get recovery.
//!
//! A get that fails part way leaves the sample on the gripper magnet while
//! the controller believes the diffractometer is empty. The automaton
//! detects that situation and, once started, repairs it over several poll
//! ticks:
//!
//! 1. `Abort` - stop the running path
//! 2. `WaitIdle` - wait for the controller to report idle
//! 3. `Restore` - re-declare the sample on the diffractometer, send the arm home
//! 4. `Finish` - clear the recovery flag
//!
//! A failing command stops the sequence; the flag stays raised until the
//! operator starts the recovery again.

use crate::command::{Command, Memory, SampleSlot, Simple, Trajectory, TrajectoryArgs};
use crate::safety::{is_get_path, PathInfo};
use cats_common::robot::consts::RECOVERY_HOME_TOOL;
use cats_common::robot::error::ClientError;
use tracing::{error, info, warn};

/// Something that can issue operate-channel commands.
pub trait CommandSink {
    fn send(&mut self, command: &Command) -> Result<String, ClientError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryKind {
    /// A get path left the sample on the magnet.
    GetFailed,
}

/// Current step of the repair sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryPhase {
    #[default]
    Abort,
    WaitIdle,
    Restore,
    Finish,
}

/// Outcome of [`RecoveryAutomaton::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    NothingToDo,
}

/// Sample identity saved when a path starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleRef {
    pub puck_lid: i64,
    pub sample: i64,
}

impl Default for SampleRef {
    fn default() -> Self {
        Self {
            puck_lid: -1,
            sample: -1,
        }
    }
}

/// Per-tick inputs of the repair sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryContext {
    pub idle: bool,
    /// Sample type code for the restored sample.
    pub sample_type: i64,
}

#[derive(Debug, Clone, Default)]
pub struct RecoveryAutomaton {
    needed: bool,
    kind: Option<RecoveryKind>,
    phase: RecoveryPhase,
    executing: bool,
    failed: bool,
    before_path: SampleRef,
    last_error: Option<String>,
}

impl RecoveryAutomaton {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_needed(&self) -> bool {
        self.needed
    }

    #[inline]
    pub fn is_executing(&self) -> bool {
        self.executing
    }

    #[inline]
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    #[inline]
    pub fn phase(&self) -> RecoveryPhase {
        self.phase
    }

    pub fn kind(&self) -> Option<RecoveryKind> {
        self.kind
    }

    pub fn before_path(&self) -> SampleRef {
        self.before_path
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Remember what sat on the diffractometer when a path started.
    pub fn capture_path_start(&mut self, sample: SampleRef) {
        self.before_path = sample;
    }

    /// Re-evaluate the failed-get condition.
    ///
    /// Skipped while a recovery runs or after one failed.
    pub fn detect(&mut self, info: &PathInfo, sample_on_magnet: bool) {
        if self.executing || self.failed {
            return;
        }
        let needed = info.ri1_count == 1 && is_get_path(&info.pathname) && sample_on_magnet;
        if needed && !self.needed {
            warn!("Sample left on magnet after '{}', recovery needed", info.pathname);
        }
        self.needed = needed;
        self.kind = needed.then_some(RecoveryKind::GetFailed);
    }

    pub fn start(&mut self) -> StartOutcome {
        if !self.needed {
            return StartOutcome::NothingToDo;
        }
        info!(
            "Starting failed-get recovery (puck/lid {}, sample {})",
            self.before_path.puck_lid, self.before_path.sample
        );
        self.executing = true;
        self.failed = false;
        self.last_error = None;
        self.phase = RecoveryPhase::Abort;
        StartOutcome::Started
    }

    /// Advance the sequence by at most one phase.
    pub fn tick(&mut self, ctx: RecoveryContext, sink: &mut dyn CommandSink) -> Result<(), ClientError> {
        if !self.executing {
            return Ok(());
        }
        self.advance(ctx, sink).inspect_err(|e| {
            error!("Recovery failed in phase {:?}: {}", self.phase, e);
            self.executing = false;
            self.failed = true;
            self.last_error = Some(e.to_string());
        })
    }

    fn advance(&mut self, ctx: RecoveryContext, sink: &mut dyn CommandSink) -> Result<(), ClientError> {
        match self.phase {
            RecoveryPhase::Abort => {
                sink.send(&Command::Simple(Simple::Abort))?;
                info!("Recovery: path aborted");
                self.phase = RecoveryPhase::WaitIdle;
            }
            RecoveryPhase::WaitIdle => {
                if ctx.idle {
                    self.phase = RecoveryPhase::Restore;
                }
            }
            RecoveryPhase::Restore => {
                let slot = SampleSlot {
                    puck_lid: self.before_path.puck_lid,
                    sample: self.before_path.sample,
                    sample_type: ctx.sample_type,
                };
                info!(
                    "Recovery: restoring sample {}/{} (type {}) on diffractometer",
                    slot.puck_lid, slot.sample, slot.sample_type
                );
                sink.send(&Command::Memory(Memory::SetOnDiff, slot))?;
                sink.send(&Command::Trajectory(
                    Trajectory::Home,
                    TrajectoryArgs::with_tool(RECOVERY_HOME_TOOL),
                ))?;
                self.phase = RecoveryPhase::Finish;
            }
            RecoveryPhase::Finish => {
                info!("Recovery finished");
                self.executing = false;
                self.needed = false;
                self.kind = None;
                self.phase = RecoveryPhase::Abort;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        sent: Vec<Command>,
        fail_on: Option<usize>,
    }

    impl CommandSink for Recorder {
        fn send(&mut self, command: &Command) -> Result<String, ClientError> {
            if self.fail_on == Some(self.sent.len()) {
                return Err(ClientError::Connection("link down".into()));
            }
            self.sent.push(command.clone());
            Ok(command.operation())
        }
    }

    fn failed_get() -> PathInfo {
        PathInfo {
            running: true,
            safe: false,
            pathname: "get".into(),
            ri1_count: 1,
            ..PathInfo::default()
        }
    }

    const IDLE: RecoveryContext = RecoveryContext {
        idle: true,
        sample_type: 1,
    };

    #[test]
    fn detection_requires_get_path_area1_exit_and_magnet() {
        let mut automaton = RecoveryAutomaton::new();
        automaton.detect(&failed_get(), false);
        assert!(!automaton.is_needed());

        let put = PathInfo {
            pathname: "put".into(),
            ..failed_get()
        };
        automaton.detect(&put, true);
        assert!(!automaton.is_needed());

        automaton.detect(&failed_get(), true);
        assert!(automaton.is_needed());
        assert_eq!(automaton.kind(), Some(RecoveryKind::GetFailed));
    }

    #[test]
    fn start_without_need_does_nothing() {
        let mut automaton = RecoveryAutomaton::new();
        assert_eq!(automaton.start(), StartOutcome::NothingToDo);
        assert!(!automaton.is_executing());
    }

    #[test]
    fn four_ticks_complete_the_sequence() {
        let mut automaton = RecoveryAutomaton::new();
        automaton.capture_path_start(SampleRef {
            puck_lid: 2,
            sample: 7,
        });
        automaton.detect(&failed_get(), true);
        assert_eq!(automaton.start(), StartOutcome::Started);

        let mut sink = Recorder::default();
        automaton.tick(IDLE, &mut sink).unwrap();
        assert_eq!(automaton.phase(), RecoveryPhase::WaitIdle);
        automaton.tick(IDLE, &mut sink).unwrap();
        assert_eq!(automaton.phase(), RecoveryPhase::Restore);
        automaton.tick(IDLE, &mut sink).unwrap();
        assert_eq!(automaton.phase(), RecoveryPhase::Finish);
        assert!(automaton.is_needed());
        automaton.tick(IDLE, &mut sink).unwrap();

        assert!(!automaton.is_needed());
        assert!(!automaton.is_executing());
        assert_eq!(
            sink.sent,
            vec![
                Command::Simple(Simple::Abort),
                Command::Memory(
                    Memory::SetOnDiff,
                    SampleSlot {
                        puck_lid: 2,
                        sample: 7,
                        sample_type: 1
                    }
                ),
                Command::Trajectory(Trajectory::Home, TrajectoryArgs::with_tool(2)),
            ]
        );
    }

    #[test]
    fn waits_for_idle() {
        let mut automaton = RecoveryAutomaton::new();
        automaton.detect(&failed_get(), true);
        automaton.start();
        let mut sink = Recorder::default();
        let busy = RecoveryContext {
            idle: false,
            ..IDLE
        };
        automaton.tick(busy, &mut sink).unwrap();
        automaton.tick(busy, &mut sink).unwrap();
        automaton.tick(busy, &mut sink).unwrap();
        assert_eq!(automaton.phase(), RecoveryPhase::WaitIdle);
        assert_eq!(sink.sent.len(), 1);
    }

    #[test]
    fn command_failure_stops_and_keeps_flag() {
        let mut automaton = RecoveryAutomaton::new();
        automaton.detect(&failed_get(), true);
        automaton.start();
        let mut sink = Recorder {
            fail_on: Some(1),
            ..Recorder::default()
        };
        automaton.tick(IDLE, &mut sink).unwrap();
        automaton.tick(IDLE, &mut sink).unwrap();
        assert!(automaton.tick(IDLE, &mut sink).is_err());

        assert!(automaton.is_needed());
        assert!(automaton.has_failed());
        assert!(!automaton.is_executing());
        assert!(automaton.last_error().is_some());

        // detection is frozen until the operator retries
        automaton.detect(&PathInfo::default(), false);
        assert!(automaton.is_needed());

        sink.fail_on = None;
        assert_eq!(automaton.start(), StartOutcome::Started);
        assert!(!automaton.has_failed());
    }

    #[test]
    fn idle_tick_is_a_no_op() {
        let mut automaton = RecoveryAutomaton::new();
        let mut sink = Recorder::default();
        automaton.tick(IDLE, &mut sink).unwrap();
        assert!(sink.sent.is_empty());
    }
}
