//! Signal combination and trade rules for the ronda engine.
//!
//! This crate turns the four dislocation signals into one composite score per
//! ticker under a fixed sign convention, and maps that score to a discrete
//! action with a human-readable rationale.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ronda_combine::{Combiner, CompositeScorer, RulesEngine, SignalScore};
//! use ronda_traits::SignalKind;
//! use ndarray::Array1;
//!
//! let scorer = CompositeScorer::default();
//! let signals = vec![
//!     SignalScore::new(SignalKind::PremiumDiscount, Array1::from_vec(vec![-2.5, 0.2])),
//!     SignalScore::new(SignalKind::Volume, Array1::from_vec(vec![2.0, -0.1])),
//! ];
//!
//! let composite = scorer.combine(&signals).unwrap();
//! let actions: Vec<_> = composite.iter().map(|s| RulesEngine::default().action(*s)).collect();
//! ```

mod combiner;
mod composite;
mod rules;

// Re-export main types
pub use combiner::{Combiner, SignalScore};
pub use composite::{CompositeScorer, SignalReports};
pub use rules::{Action, NO_TRIGGERS, RulesEngine, action};
