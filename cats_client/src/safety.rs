//! Path safety tracking.
//!
//! Decides, poll after poll, whether the arm is clear of the
//! diffractometer. Paths that enter the diffractometer area are tracked by
//! counting falling edges of the two area sensors:
//!
//! ```text
//!   area1  ___/‾‾‾\_____________      ri1 += 1 on each falling edge
//!   area2  _______/‾‾‾‾‾\_______      ri2 += 1 on each falling edge,
//!                        ^            then the pass rule is checked
//! ```
//!
//! A single-pass path (get, put) is safe once the arm left area1 once and
//! area2 more than `single_pass_threshold` times. A double-pass path
//! (getput) needs two area1 exits and more than `double_pass_threshold`
//! area2 exits. The double gripper always counts as single-pass.

use cats_common::robot::config::SafetyConfig;
use serde::Serialize;

/// How many diffractometer passes a path makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    /// Not tracked; safe for its whole duration.
    Unchecked,
    SinglePass,
    DoublePass,
}

impl PathClass {
    pub fn of(pathname: &str) -> Self {
        match pathname {
            "get" | "put" | "put_bcrd" | "get_bcrd" | "get_HT" | "put_HT" => Self::SinglePass,
            "getput" | "getput_bcrd" | "getput_HT" => Self::DoublePass,
            _ => Self::Unchecked,
        }
    }

    /// Area1 exits required before area2 exits are considered.
    pub const fn passes(self) -> u32 {
        match self {
            Self::Unchecked => 0,
            Self::SinglePass => 1,
            Self::DoublePass => 2,
        }
    }
}

/// Paths that take a sample off the diffractometer.
pub fn is_get_path(pathname: &str) -> bool {
    matches!(
        pathname,
        "getput" | "getput_bcrd" | "getput_HT" | "get" | "get_bcrd" | "get_HT"
    )
}

/// Signals of one poll the tracker looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSample<'a> {
    pub running: bool,
    pub pathname: &'a str,
    pub idle: bool,
    pub home: bool,
    pub in_area1: bool,
    pub in_area2: bool,
    /// Tool name as reported in the `state` reply.
    pub tool: &'a str,
}

/// Tracker state, carried across polls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathInfo {
    pub running: bool,
    pub safe: bool,
    pub pathname: String,
    pub idle: bool,
    pub home: bool,
    pub in_area1: bool,
    pub in_area2: bool,
    pub double_gripper: bool,
    pub ri1_count: u32,
    pub ri2_count: u32,
    pub is_in_area1: bool,
    pub is_in_area2: bool,
}

impl Default for PathInfo {
    fn default() -> Self {
        Self {
            running: false,
            safe: true,
            pathname: String::new(),
            idle: false,
            home: false,
            in_area1: false,
            in_area2: false,
            double_gripper: false,
            ri1_count: 0,
            ri2_count: 0,
            is_in_area1: false,
            is_in_area2: false,
        }
    }
}

impl PathInfo {
    fn reset_counters(&mut self) {
        self.ri1_count = 0;
        self.ri2_count = 0;
        self.is_in_area1 = false;
        self.is_in_area2 = false;
    }
}

#[derive(Debug, Clone)]
pub struct SafetyTracker {
    info: PathInfo,
    thresholds: SafetyConfig,
}

impl SafetyTracker {
    pub fn new(thresholds: SafetyConfig) -> Self {
        Self {
            info: PathInfo::default(),
            thresholds,
        }
    }

    #[inline]
    pub fn info(&self) -> &PathInfo {
        &self.info
    }

    #[inline]
    pub fn is_safe(&self) -> bool {
        self.info.safe
    }

    /// Feed one poll and return the new safety verdict.
    pub fn update(&mut self, sample: &PathSample<'_>) -> bool {
        let was_running = self.info.running;
        let info = &mut self.info;

        info.running = sample.running;
        info.pathname.clear();
        info.pathname.push_str(sample.pathname);
        info.idle = sample.idle;
        info.home = sample.home;
        info.in_area1 = sample.in_area1;
        info.in_area2 = sample.in_area2;
        info.double_gripper = sample.tool.trim().eq_ignore_ascii_case("double");

        if !sample.running {
            info.reset_counters();
            info.safe = true;
            return true;
        }

        let class = PathClass::of(sample.pathname);
        if !was_running {
            info.reset_counters();
            info.safe = class == PathClass::Unchecked;
        }
        if class == PathClass::Unchecked {
            return info.safe;
        }

        if sample.in_area1 && !info.is_in_area1 {
            info.is_in_area1 = true;
        } else if !sample.in_area1 && info.is_in_area1 {
            info.ri1_count += 1;
            info.is_in_area1 = false;
        }

        if sample.in_area2 && !info.is_in_area2 {
            info.is_in_area2 = true;
        } else if !sample.in_area2 && info.is_in_area2 {
            info.ri2_count += 1;
            info.is_in_area2 = false;

            let effective = if info.double_gripper {
                PathClass::SinglePass
            } else {
                class
            };
            let threshold = match effective {
                PathClass::DoublePass => self.thresholds.double_pass_threshold,
                _ => self.thresholds.single_pass_threshold,
            };
            if info.ri1_count >= effective.passes() && info.ri2_count > threshold {
                info.safe = true;
            }
        }

        info.safe
    }
}

impl Default for SafetyTracker {
    fn default() -> Self {
        Self::new(SafetyConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample<'a>(pathname: &'a str, area1: bool, area2: bool) -> PathSample<'a> {
        PathSample {
            running: true,
            pathname,
            idle: false,
            home: false,
            in_area1: area1,
            in_area2: area2,
            tool: "Single",
        }
    }

    /// Drive one full area1 pass then one full area2 pass.
    fn pass(tracker: &mut SafetyTracker, path: &str) -> bool {
        tracker.update(&sample(path, true, false));
        tracker.update(&sample(path, false, false));
        tracker.update(&sample(path, false, true));
        tracker.update(&sample(path, false, false))
    }

    #[test]
    fn idle_is_safe() {
        let mut tracker = SafetyTracker::default();
        assert!(tracker.is_safe());
        let idle = PathSample {
            running: false,
            ..sample("", false, false)
        };
        assert!(tracker.update(&idle));
    }

    #[test]
    fn unchecked_path_is_safe_immediately() {
        let mut tracker = SafetyTracker::default();
        assert!(tracker.update(&sample("home", false, false)));
        assert!(tracker.update(&sample("home", true, true)));
    }

    #[test]
    fn single_pass_needs_area1_then_area2_exit() {
        let mut tracker = SafetyTracker::default();
        assert!(!tracker.update(&sample("get", false, false)));

        // area2 exit before any area1 exit does not count as safe
        assert!(!tracker.update(&sample("get", false, true)));
        assert!(!tracker.update(&sample("get", false, false)));
        assert_eq!(tracker.info().ri2_count, 1);

        assert!(!tracker.update(&sample("get", true, false)));
        assert!(!tracker.update(&sample("get", false, false)));
        assert_eq!(tracker.info().ri1_count, 1);
        assert!(!tracker.update(&sample("get", false, true)));
        assert!(tracker.update(&sample("get", false, false)));
    }

    #[test]
    fn double_pass_needs_two_area1_exits() {
        let mut tracker = SafetyTracker::default();
        assert!(!tracker.update(&sample("getput", false, false)));
        assert!(!pass(&mut tracker, "getput"));
        assert_eq!(tracker.info().ri1_count, 1);
        assert!(pass(&mut tracker, "getput"));
        assert_eq!(tracker.info().ri2_count, 2);
    }

    #[test]
    fn double_gripper_counts_as_single_pass() {
        let mut tracker = SafetyTracker::default();
        let double = |a1, a2| PathSample {
            tool: " DOUBLE ",
            ..sample("getput", a1, a2)
        };
        assert!(!tracker.update(&double(false, false)));
        tracker.update(&double(true, false));
        tracker.update(&double(false, false));
        tracker.update(&double(false, true));
        assert!(tracker.update(&double(false, false)));
        assert!(tracker.info().double_gripper);
    }

    #[test]
    fn stopping_resets_everything() {
        let mut tracker = SafetyTracker::default();
        tracker.update(&sample("getput", false, false));
        pass(&mut tracker, "getput");
        tracker.update(&sample("getput", true, false));
        let stopped = PathSample {
            running: false,
            ..sample("", false, false)
        };
        assert!(tracker.update(&stopped));
        let info = tracker.info();
        assert_eq!((info.ri1_count, info.ri2_count), (0, 0));
        assert!(!info.is_in_area1 && !info.is_in_area2);
    }

    #[test]
    fn thresholds_are_configurable() {
        let mut tracker = SafetyTracker::new(SafetyConfig {
            single_pass_threshold: 1,
            double_pass_threshold: 1,
        });
        tracker.update(&sample("put", false, false));
        assert!(!pass(&mut tracker, "put"));
        assert!(pass(&mut tracker, "put"));
    }

    #[test]
    fn path_classes() {
        assert_eq!(PathClass::of("put_HT"), PathClass::SinglePass);
        assert_eq!(PathClass::of("getput_bcrd"), PathClass::DoublePass);
        assert_eq!(PathClass::of("recovery"), PathClass::Unchecked);
        assert!(is_get_path("get_bcrd"));
        assert!(!is_get_path("put"));
    }
}
