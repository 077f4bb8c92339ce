//! Error types.
//!
//! Candidates that violate a secondary constraint are not errors: the
//! engine reports them as [`StepOutcome::Infeasible`](crate::ta::StepOutcome)
//! and moves on.

use thiserror::Error;

/// Invalid configuration, detected before a run starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid cooling schedule: {0}")]
    Cooling(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Invalid problem data or timetable.
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("problem must have at least one period")]
    NoPeriods,

    #[error("exam {exam} out of range (num_exams = {num_exams})")]
    ExamOutOfRange { exam: usize, num_exams: usize },

    #[error("period {period} out of range (num_periods = {num_periods})")]
    PeriodOutOfRange { period: usize, num_periods: usize },

    #[error("assignment covers {got} exams, problem has {expected}")]
    AssignmentLength { expected: usize, got: usize },

    #[error("exam {exam} is assigned more than once")]
    DuplicateExam { exam: usize },

    #[error("exam {exam} has no period")]
    MissingExam { exam: usize },

    #[error("chain with pivot {pivot} was applied before being evaluated")]
    UnevaluatedChain { pivot: usize },

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// Fatal conditions raised while searching.
#[derive(Debug, Error)]
pub enum SearchError {
    /// No pivot exam can be selected: fewer than two periods, or every
    /// period is empty.
    #[error("degenerate neighborhood: {0}")]
    DegenerateNeighborhood(String),

    /// Incrementally tracked fitness diverged from a full recomputation.
    #[error(
        "evaluation drift at iteration {iteration}: tracked {tracked}, recomputed {recomputed}"
    )]
    EvaluationDrift {
        iteration: u64,
        tracked: f64,
        recomputed: f64,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Model(#[from] ModelError),
}
