//! Threshold Accepting, Simulated Annealing and Fast Threshold Accepting.
//!
//! A single-solution local search over Kempe chain moves. Threshold
//! Accepting takes any feasible move that worsens the fitness by at most the
//! current threshold; Simulated Annealing uses the threshold as temperature.
//! Fast TA additionally skips chains pivoted on exams that the move
//! statistics predict are settled, saving their evaluation.
//!
//! # References
//!
//! - Dueck & Scheuer (1990), "Threshold accepting: a general purpose
//!   optimization algorithm"
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Leite, Melício & Rosa (2019), "A fast threshold acceptance algorithm for
//!   the examination timetabling problem"

mod config;
mod engine;
mod runner;
mod types;

pub use config::{SaScaling, StatisticsConfig, Strategy, TaConfig};
pub use engine::{Step, StepOutcome, TaEngine, Termination};
pub use runner::{TaResult, TaRunner};
pub use types::{AcceptanceStrategy, Acceptor, SimulatedAnnealing, ThresholdAccepting};
