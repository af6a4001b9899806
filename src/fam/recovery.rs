// src/fam/recovery.rs
//
// Error-state resolution. Cold start takes the first admissible state in
// evaluation order; warm recovery ranks admissible states by how likely
// they are to follow the last known-good state.

use super::state::{StateRules, ORDINARY_RULES};
use super::thresholds::Thresholds;
use super::transitions::Transition;
use crate::types::{FeatureFrame, StateKind, ORDINARY_STATE_COUNT};
use anyhow::{ensure, Result};
use tracing::debug;

type Weights = [[f64; ORDINARY_STATE_COUNT]; ORDINARY_STATE_COUNT];

// Rows: prior state. Columns: candidate. Both in StateKind::ORDINARY order
// (At Station, Wait, Cross, Approach Sidewalk, Move Along Sidewalk,
// Approach Target Station).
const FITTED_WEIGHTS: Weights = [
    [0.950089, 0.022282, 0.000000, 0.023619, 0.000446, 0.003565],
    [0.018987, 0.805907, 0.040084, 0.126582, 0.008439, 0.000000],
    [0.000000, 0.015152, 0.850168, 0.000000, 0.003367, 0.131313],
    [0.000000, 0.087452, 0.262357, 0.562738, 0.087452, 0.000000],
    [0.000000, 0.007500, 0.002500, 0.005000, 0.920000, 0.065000],
    [0.252874, 0.000000, 0.000000, 0.000000, 0.004598, 0.000000],
];

/// Likelihood of each ordinary state given the last known-good one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecoveryTable {
    weights: Weights,
}

/// Empirically fitted table shared by every controller.
pub static FITTED_RECOVERY_TABLE: RecoveryTable = RecoveryTable::fitted();

impl RecoveryTable {
    pub const fn fitted() -> Self {
        Self {
            weights: FITTED_WEIGHTS,
        }
    }

    /// Build a table from custom rows, rejecting cells outside `[0, 1]`.
    pub fn from_rows(weights: Weights) -> Result<Self> {
        for (row, kind) in weights.iter().zip(StateKind::ORDINARY) {
            for (&w, candidate) in row.iter().zip(StateKind::ORDINARY) {
                ensure!(
                    w.is_finite() && (0.0..=1.0).contains(&w),
                    "recovery weight {} -> {} must be within [0, 1], got {}",
                    kind,
                    candidate,
                    w
                );
            }
        }
        Ok(Self { weights })
    }

    /// Weight of `candidate` following `prior`; `None` if either is Error.
    pub fn weight(&self, prior: StateKind, candidate: StateKind) -> Option<f64> {
        Some(self.weights[prior.ordinal()?][candidate.ordinal()?])
    }

    /// Resolve the Error state against `frame`.
    ///
    /// Without a prior the first admissible state in evaluation order wins.
    /// With one, the admissible state with the highest weight in the prior's
    /// row wins, ties going to the earlier state. No admissible state keeps
    /// the machine in Error.
    pub fn resolve(
        &self,
        prior: Option<StateKind>,
        frame: &FeatureFrame,
        thresholds: &Thresholds,
    ) -> Transition {
        let admissible = |rules: &StateRules| (rules.check)(frame, thresholds);

        let chosen = match prior.and_then(|p| p.ordinal()) {
            None => ORDINARY_RULES
                .iter()
                .find(|rules| admissible(*rules))
                .map(|rules| rules.kind),
            Some(row) => {
                let mut best: Option<(StateKind, f64)> = None;
                for (col, rules) in ORDINARY_RULES.iter().enumerate() {
                    if !admissible(rules) {
                        continue;
                    }
                    let w = self.weights[row][col];
                    debug!("   candidate {} (w={:.6})", rules.kind, w);
                    if best.map_or(true, |(_, best_w)| w > best_w) {
                        best = Some((rules.kind, w));
                    }
                }
                best.map(|(kind, _)| kind)
            }
        };

        match chosen {
            Some(kind) => Transition::certain(kind),
            None => Transition::certain(StateKind::Error),
        }
    }
}

impl Default for RecoveryTable {
    fn default() -> Self {
        Self::fitted()
    }
}
