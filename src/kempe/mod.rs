//! Kempe chain neighbourhood.
//!
//! A Kempe chain is a set of exams, connected by conflicts, split between
//! two periods. Swapping the whole set between the periods keeps a
//! conflict-free timetable conflict-free, which is why this is the only
//! move type the search needs.
//!
//! # References
//!
//! - Thompson & Dowsland (1998), "A robust simulated annealing based
//!   examination timetabling system"
//! - Demeester et al. (2012), "A hyperheuristic approach to examination
//!   timetabling problems"

mod chain;
mod generator;

pub use chain::KempeChain;
pub use generator::{KempeChainGenerator, MoveGenerator, Pivot};
