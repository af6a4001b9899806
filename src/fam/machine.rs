// src/fam/machine.rs
//
// Finite automation machine: one instance per (pedestrian, AGV) pair,
// fed frames in chronological order.
//
// Per frame:
//   transition current state → commit if confident → check admissibility
//   → push outcome into the violation window → drop into Error when the
//   window holds no admissible outcome.

use super::recovery::{RecoveryTable, FITTED_RECOVERY_TABLE};
use super::state::{rules_for, BehaviorState};
use super::thresholds::Thresholds;
use super::transitions::Transition;
use super::violation_window::ViolationWindow;
use crate::types::{FeatureFrame, StateKind};
use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Violation window length.
    pub error_flag_size: usize,
    /// Starting state; `None` starts cold in Error.
    pub initial_state: Option<StateKind>,
    /// Transitions are committed only above this probability.
    pub commit_probability: f64,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            error_flag_size: 3,
            initial_state: None,
            commit_probability: 0.8,
        }
    }
}

impl MachineConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.commit_probability.is_finite() && (0.0..=1.0).contains(&self.commit_probability),
            "commit_probability must be within [0, 1], got {}",
            self.commit_probability
        );
        Ok(())
    }
}

/// What happened on one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    pub state: StateKind,
    pub admissible: bool,
    /// The state label changed through a committed transition.
    pub transitioned: bool,
    /// The violation window forced entry into Error.
    pub recovery_triggered: bool,
}

pub struct FiniteAutomationMachine {
    config: MachineConfig,
    thresholds: Thresholds,
    recovery: RecoveryTable,
    state: BehaviorState,
    window: ViolationWindow,
    last_timestamp: Option<i64>,
}

impl FiniteAutomationMachine {
    /// Start in `config.initial_state`, or cold in Error.
    pub fn new(config: MachineConfig, thresholds: Thresholds) -> Self {
        let initial = config.initial_state.unwrap_or(StateKind::Error);
        Self {
            config,
            thresholds,
            recovery: FITTED_RECOVERY_TABLE,
            state: BehaviorState::new(initial),
            window: ViolationWindow::new(config.error_flag_size),
            last_timestamp: None,
        }
    }

    /// Start in `kind`, anchored at `frame`'s position in the sequence.
    pub fn with_initial_state(
        config: MachineConfig,
        thresholds: Thresholds,
        kind: StateKind,
        frame: &FeatureFrame,
    ) -> Self {
        let mut machine = Self::new(config, thresholds);
        machine.state = BehaviorState::new(kind);
        machine.last_timestamp = Some(frame.timestamp_id);
        machine
    }

    pub fn with_recovery_table(mut self, table: RecoveryTable) -> Self {
        self.recovery = table;
        self
    }

    /// Advance by one frame.
    pub fn run(&mut self, frame: &FeatureFrame) -> TickOutcome {
        self.step(frame, None)
    }

    /// Re-seed into `kind` before processing `frame`, bypassing the
    /// transition rules of the current state.
    pub fn run_forced(&mut self, frame: &FeatureFrame, kind: StateKind) -> TickOutcome {
        self.step(frame, Some(kind))
    }

    fn step(&mut self, frame: &FeatureFrame, forced: Option<StateKind>) -> TickOutcome {
        self.observe_timestamp(frame);

        if let Some(kind) = forced {
            debug!("⏩ [{}] forced restart into {}", frame.agv_name, kind);
            self.state = BehaviorState::new(kind);
        }

        let from = self.state.kind();
        let proposal = self.propose(frame);
        let mut transitioned = false;
        if proposal.probability > self.config.commit_probability && proposal.next != from {
            debug!(
                "🚶 [{}] {} → {} (t={})",
                frame.agv_name, from, proposal.next, frame.timestamp_id
            );
            self.state = BehaviorState::new(proposal.next);
            transitioned = true;
        }

        let admissible = self.check(frame);
        self.state.set_admissible(admissible);
        self.window.push(admissible);

        let mut recovery_triggered = false;
        if self.window.is_exhausted() {
            let lost = self.state.kind();
            info!(
                "⚠️  [{}] no admissible state for {} frames, {} → Error (t={})",
                frame.agv_name,
                self.window.len(),
                lost,
                frame.timestamp_id
            );
            self.state = BehaviorState::recovering_from(lost);
            self.window.reset();
            recovery_triggered = true;
        }

        TickOutcome {
            state: self.state.kind(),
            admissible: self.state.is_admissible(),
            transitioned,
            recovery_triggered,
        }
    }

    fn propose(&self, frame: &FeatureFrame) -> Transition {
        match rules_for(self.state.kind()) {
            Some(rules) => (rules.transition)(frame, &self.thresholds),
            None => {
                let resolved = self
                    .recovery
                    .resolve(self.state.prior(), frame, &self.thresholds);
                if !resolved.next.is_error() {
                    info!(
                        "✓ [{}] recovered into {} (prior: {})",
                        frame.agv_name,
                        resolved.next,
                        self.state.prior().map_or("none", |p| p.as_str())
                    );
                }
                resolved
            }
        }
    }

    fn check(&self, frame: &FeatureFrame) -> bool {
        rules_for(self.state.kind()).map_or(true, |rules| (rules.check)(frame, &self.thresholds))
    }

    fn observe_timestamp(&mut self, frame: &FeatureFrame) {
        if let Some(last) = self.last_timestamp {
            if frame.timestamp_id < last {
                warn!(
                    "⏪ [{}] frame {} arrived after {}; classification assumes chronological order",
                    frame.agv_name, frame.timestamp_id, last
                );
            }
        }
        self.last_timestamp = Some(frame.timestamp_id);
    }

    pub fn current_state(&self) -> &BehaviorState {
        &self.state
    }

    pub fn state_name(&self) -> &'static str {
        self.state.kind().as_str()
    }

    pub fn is_admissible(&self) -> bool {
        self.state.is_admissible()
    }

    /// Last known-good state while in Error.
    pub fn prior_state(&self) -> Option<StateKind> {
        self.state.prior()
    }

    pub(crate) fn window(&self) -> &ViolationWindow {
        &self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> FiniteAutomationMachine {
        FiniteAutomationMachine::new(MachineConfig::default(), Thresholds::default())
    }

    fn machine_in(kind: StateKind) -> FiniteAutomationMachine {
        FiniteAutomationMachine::with_initial_state(
            MachineConfig::default(),
            Thresholds::default(),
            kind,
            &FeatureFrame::default(),
        )
    }

    fn at_station_frame() -> FeatureFrame {
        FeatureFrame {
            user_speed: 0.0,
            distance_to_closest_station_x: Some(100.0),
            distance_to_closest_station_y: Some(100.0),
            on_road: false,
            ..FeatureFrame::default()
        }
    }

    fn wait_or_cross() -> FeatureFrame {
        FeatureFrame {
            user_speed: 0.2,
            user_speed_y: 0.5,
            on_road: true,
            facing_to_road: true,
            ..FeatureFrame::default()
        }
    }

    #[test]
    fn test_starts_cold_in_error() {
        let m = machine();
        assert_eq!(m.current_state().kind(), StateKind::Error);
        assert_eq!(m.prior_state(), None);
        assert!(!m.is_admissible());
        assert_eq!(m.window().flags(), vec![true, true, false]);
    }

    #[test]
    fn test_configured_initial_state() {
        let config = MachineConfig {
            initial_state: Some(StateKind::Cross),
            ..MachineConfig::default()
        };
        let m = FiniteAutomationMachine::new(config, Thresholds::default());
        assert_eq!(m.state_name(), "Cross");
    }

    // ────────────────────────────────────────────────────────────
    // Scenarios
    // ────────────────────────────────────────────────────────────

    #[test]
    fn test_still_pedestrian_near_station_is_at_station() {
        let mut m = machine();
        let f = at_station_frame();

        let outcome = m.run(&f);
        assert_eq!(outcome.state, StateKind::AtStation);
        assert!(outcome.admissible);
        assert!(outcome.transitioned);

        let outcome = m.run(&f);
        assert_eq!(outcome.state, StateKind::AtStation);
        assert!(!outcome.transitioned);
    }

    #[test]
    fn test_leaving_station_onto_sidewalk() {
        let mut m = machine_in(StateKind::AtStation);
        let f = FeatureFrame {
            user_speed: 0.5,
            on_sidewalks: true,
            ..FeatureFrame::default()
        };

        let outcome = m.run(&f);
        assert_eq!(outcome.state, StateKind::ApproachSidewalk);
        assert!(outcome.transitioned);
    }

    #[test]
    fn test_waiting_pedestrian_steps_onto_road() {
        let mut m = machine_in(StateKind::Wait);
        let f = FeatureFrame {
            user_speed: 0.3,
            on_road: true,
            facing_to_road: true,
            ..FeatureFrame::default()
        };

        assert_eq!(m.run(&f).state, StateKind::Cross);
    }

    #[test]
    fn test_sustained_inadmissibility_enters_error() {
        let mut m = machine_in(StateKind::Wait);
        let lost = FeatureFrame::default();

        let first = m.run(&lost);
        assert_eq!(first.state, StateKind::Wait);
        assert!(!first.admissible);
        assert!(!first.recovery_triggered);

        // Seed already holds one false, so the second failure empties it.
        let second = m.run(&lost);
        assert_eq!(second.state, StateKind::Error);
        assert!(second.recovery_triggered);
        assert_eq!(m.prior_state(), Some(StateKind::Wait));
        assert_eq!(m.window().flags(), vec![true, true, false]);

        // Nothing admissible: stays in Error, prior is kept.
        let third = m.run(&lost);
        assert_eq!(third.state, StateKind::Error);
        assert!(third.admissible);
        assert_eq!(m.prior_state(), Some(StateKind::Wait));
    }

    #[test]
    fn test_cold_start_priority_order() {
        let mut m = machine();
        let outcome = m.run(&wait_or_cross());
        assert_eq!(outcome.state, StateKind::Wait);
        assert!(outcome.admissible);
    }

    #[test]
    fn test_warm_recovery_uses_prior_state() {
        let mut m = machine_in(StateKind::Cross);
        let lost = FeatureFrame::default();
        m.run(&lost);
        m.run(&lost);
        assert_eq!(m.prior_state(), Some(StateKind::Cross));

        // Wait and Cross both admissible; Cross row favours Cross.
        assert_eq!(m.run(&wait_or_cross()).state, StateKind::Cross);
        assert_eq!(m.prior_state(), None);
    }

    #[test]
    fn test_recovered_state_keeps_running() {
        let mut m = machine_in(StateKind::Wait);
        let lost = FeatureFrame::default();
        m.run(&lost);
        m.run(&lost);

        let f = wait_or_cross();
        assert_eq!(m.run(&f).state, StateKind::Wait);
        // Wait → Cross needs speed above 0.8 × threshold
        assert_eq!(m.run(&f).state, StateKind::Wait);
    }

    #[test]
    fn test_repeated_frame_is_idempotent() {
        let mut m = machine();
        let f = at_station_frame();
        m.run(&f);
        for _ in 0..5 {
            let outcome = m.run(&f);
            assert_eq!(outcome.state, StateKind::AtStation);
            assert!(!outcome.transitioned);
            assert!(!outcome.recovery_triggered);
        }
    }

    #[test]
    fn test_window_length_constant_across_ticks() {
        let config = MachineConfig {
            error_flag_size: 5,
            ..MachineConfig::default()
        };
        let mut m = FiniteAutomationMachine::new(config, Thresholds::default());
        let frames = [
            at_station_frame(),
            FeatureFrame::default(),
            wait_or_cross(),
            FeatureFrame::default(),
        ];
        for f in frames.iter().cycle().take(20) {
            m.run(f);
            assert_eq!(m.window().len(), 5);
        }
    }

    #[test]
    fn test_single_slot_window_recovers_immediately() {
        let config = MachineConfig {
            error_flag_size: 1,
            ..MachineConfig::default()
        };
        let mut m = FiniteAutomationMachine::with_initial_state(
            config,
            Thresholds::default(),
            StateKind::Wait,
            &FeatureFrame::default(),
        );
        let outcome = m.run(&FeatureFrame::default());
        assert_eq!(outcome.state, StateKind::Error);
        assert_eq!(m.prior_state(), Some(StateKind::Wait));
    }

    #[test]
    fn test_empty_window_disables_recovery() {
        let config = MachineConfig {
            error_flag_size: 0,
            ..MachineConfig::default()
        };
        let mut m = FiniteAutomationMachine::with_initial_state(
            config,
            Thresholds::default(),
            StateKind::Wait,
            &FeatureFrame::default(),
        );
        for _ in 0..10 {
            let outcome = m.run(&FeatureFrame::default());
            assert_eq!(outcome.state, StateKind::Wait);
            assert!(!outcome.admissible);
        }
    }

    #[test]
    fn test_forced_restart_bypasses_transition() {
        let mut m = machine();
        let f = FeatureFrame {
            user_speed: 0.5,
            user_speed_y: 0.5,
            on_road: true,
            facing_to_road: true,
            ..FeatureFrame::default()
        };
        let outcome = m.run_forced(&f, StateKind::Cross);
        assert_eq!(outcome.state, StateKind::Cross);
        assert!(outcome.admissible);
    }

    #[test]
    fn test_commit_gate_blocks_low_confidence() {
        let config = MachineConfig {
            commit_probability: 1.0,
            ..MachineConfig::default()
        };
        let mut m = FiniteAutomationMachine::with_initial_state(
            config,
            Thresholds::default(),
            StateKind::AtStation,
            &FeatureFrame::default(),
        );
        let f = FeatureFrame {
            user_speed: 0.5,
            on_sidewalks: true,
            ..FeatureFrame::default()
        };
        let outcome = m.run(&f);
        assert_eq!(outcome.state, StateKind::AtStation);
        assert!(!outcome.transitioned);
    }

    #[test]
    fn test_out_of_order_frames_still_classified() {
        let mut m = machine();
        let later = FeatureFrame {
            timestamp_id: 10,
            ..at_station_frame()
        };
        let earlier = FeatureFrame {
            timestamp_id: 5,
            ..at_station_frame()
        };
        m.run(&later);
        assert_eq!(m.run(&earlier).state, StateKind::AtStation);
    }

    #[test]
    fn test_custom_recovery_table() {
        let mut rows = [[0.0; 6]; 6];
        rows[2][1] = 1.0; // prior Cross → Wait
        let table = RecoveryTable::from_rows(rows).unwrap();

        let mut m = machine_in(StateKind::Cross).with_recovery_table(table);
        let lost = FeatureFrame::default();
        m.run(&lost);
        m.run(&lost);
        assert_eq!(m.run(&wait_or_cross()).state, StateKind::Wait);
    }

    #[test]
    fn test_config_rejects_bad_commit_probability() {
        let config = MachineConfig {
            commit_probability: 1.5,
            ..MachineConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(MachineConfig::default().validate().is_ok());
    }
}
