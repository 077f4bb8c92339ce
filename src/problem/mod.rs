//! Problem data: exams, periods, rooms, conflicts and pair constraints.
//!
//! Everything here is immutable once [`ProblemBuilder::build`] returns.
//! Parsing of benchmark file formats is left to callers; they feed the
//! builder with counts, enrolments and constraints.

mod conflict;
mod data;

pub use conflict::ConflictGraph;
pub use data::{Exam, PairConstraint, ProblemBuilder, ProblemData, Room};
