//! Fitness evaluation.
//!
//! [`ProximityCost`] defines the soft objective and can recompute it from
//! scratch; [`IncrementalEvaluator`] scores a [`KempeChain`](crate::kempe::KempeChain)
//! by touching only the pairs the chain changes.

mod incremental;
mod proximity;

pub use incremental::{Evaluation, EvaluationCounter, Evaluator, IncrementalEvaluator};
pub use proximity::ProximityCost;
