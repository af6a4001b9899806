// src/fam/state.rs
//
// Dispatch table from state label to its check/transition pair, plus the
// per-instance state record the controller owns.

use super::predicates;
use super::thresholds::Thresholds;
use super::transitions::{self, Transition};
use crate::types::{FeatureFrame, StateKind, ORDINARY_STATE_COUNT};

pub type CheckFn = fn(&FeatureFrame, &Thresholds) -> bool;
pub type TransitionFn = fn(&FeatureFrame, &Thresholds) -> Transition;

pub struct StateRules {
    pub kind: StateKind,
    pub check: CheckFn,
    pub transition: TransitionFn,
}

/// Rules for every ordinary state, in recovery evaluation order.
pub static ORDINARY_RULES: [StateRules; ORDINARY_STATE_COUNT] = [
    StateRules {
        kind: StateKind::AtStation,
        check: predicates::at_station,
        transition: transitions::from_at_station,
    },
    StateRules {
        kind: StateKind::Wait,
        check: predicates::wait,
        transition: transitions::from_wait,
    },
    StateRules {
        kind: StateKind::Cross,
        check: predicates::cross,
        transition: transitions::from_cross,
    },
    StateRules {
        kind: StateKind::ApproachSidewalk,
        check: predicates::approach_sidewalk,
        transition: transitions::from_approach_sidewalk,
    },
    StateRules {
        kind: StateKind::MoveAlongSidewalk,
        check: predicates::move_along_sidewalk,
        transition: transitions::from_move_along_sidewalk,
    },
    StateRules {
        kind: StateKind::ApproachTargetStation,
        check: predicates::approach_target_station,
        transition: transitions::from_approach_target_station,
    },
];

/// Rules for an ordinary state; `None` for Error, which is resolved by the
/// recovery table instead.
pub fn rules_for(kind: StateKind) -> Option<&'static StateRules> {
    kind.ordinal().map(|idx| &ORDINARY_RULES[idx])
}

/// The controller's current state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehaviorState {
    kind: StateKind,
    admissible: bool,
    prior: Option<StateKind>,
}

impl BehaviorState {
    pub fn new(kind: StateKind) -> Self {
        Self {
            kind,
            admissible: false,
            prior: None,
        }
    }

    /// Error state remembering the last known-good state. An Error prior
    /// collapses to a cold start.
    pub fn recovering_from(prior: StateKind) -> Self {
        Self {
            kind: StateKind::Error,
            admissible: false,
            prior: (!prior.is_error()).then_some(prior),
        }
    }

    pub fn kind(&self) -> StateKind {
        self.kind
    }

    pub fn is_admissible(&self) -> bool {
        self.admissible
    }

    /// Last known-good state recorded on entry to Error.
    pub fn prior(&self) -> Option<StateKind> {
        self.prior
    }

    pub(crate) fn set_admissible(&mut self, admissible: bool) {
        self.admissible = admissible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_ordinals() {
        for (idx, rules) in ORDINARY_RULES.iter().enumerate() {
            assert_eq!(rules.kind.ordinal(), Some(idx));
            assert_eq!(rules_for(rules.kind).map(|r| r.kind), Some(rules.kind));
        }
        assert!(rules_for(StateKind::Error).is_none());
    }

    #[test]
    fn test_table_agrees_with_check_dispatch() {
        let f = FeatureFrame {
            user_speed: 0.2,
            user_speed_y: 0.5,
            on_road: true,
            facing_to_road: true,
            ..FeatureFrame::default()
        };
        let t = Thresholds::default();
        for rules in &ORDINARY_RULES {
            assert_eq!((rules.check)(&f, &t), predicates::check(rules.kind, &f, &t));
        }
    }

    #[test]
    fn test_new_state_starts_inadmissible() {
        let state = BehaviorState::new(StateKind::Wait);
        assert!(!state.is_admissible());
        assert_eq!(state.prior(), None);
    }

    #[test]
    fn test_recovering_from_error_is_cold() {
        assert_eq!(BehaviorState::recovering_from(StateKind::Error).prior(), None);

        let state = BehaviorState::recovering_from(StateKind::Cross);
        assert_eq!(state.kind(), StateKind::Error);
        assert_eq!(state.prior(), Some(StateKind::Cross));
    }
}
