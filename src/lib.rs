// src/lib.rs

pub mod config;
pub mod fam;
pub mod pipeline;
pub mod types;

pub use fam::{FiniteAutomationMachine, MachineConfig, RecoveryTable, Thresholds, TickOutcome};
pub use types::{Config, FeatureFrame, StateKind};
