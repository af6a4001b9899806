// src/fam/mod.rs
//
// Pedestrian behavior state machine.
//
// Signal flow:
//   FeatureFrame → machine → state rules (transition) ─┐
//                           predicates (check) ────────┼→ violation_window
//   Error state → recovery table ──────────────────────┘
//
// Orchestrated by machine::FiniteAutomationMachine.

pub mod machine;
pub mod predicates;
pub mod recovery;
pub mod state;
pub mod thresholds;
pub mod transitions;
pub mod violation_window;

pub use machine::{FiniteAutomationMachine, MachineConfig, TickOutcome};
pub use predicates::check;
pub use recovery::{RecoveryTable, FITTED_RECOVERY_TABLE};
pub use state::{rules_for, BehaviorState, StateRules, ORDINARY_RULES};
pub use thresholds::Thresholds;
pub use transitions::Transition;
pub use violation_window::ViolationWindow;
