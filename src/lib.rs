//! # decision-splitter
//!
//! `decision-splitter` grows binary regression trees over tables of named numeric
//! columns. Each node thresholds one feature so that the target means on the two
//! sides differ as much as possible, and a feature used on a path is never reused
//! further down that path.
//!
//! Every construction and every splitting decision is reported to a
//! [`SplitObserver`](trees::SplitObserver), which can log it, record it or ignore it.
//!
//! ## Example Usage
//!
//! ```rust
//! use decision_splitter::data::dataset::Dataset;
//! use decision_splitter::trees::{EventTrace, SplitterNode, SplitterParams};
//!
//! let rows: Vec<Vec<f64>> = (1..=40)
//!     .map(|x| vec![x as f64, if x > 20 { 1.0 } else { 0.0 }])
//!     .collect();
//! let dataset = Dataset::from_rows(vec!["x", "y"], &rows).unwrap();
//!
//! let params = SplitterParams::with_params(1, 10).unwrap();
//! let mut trace = EventTrace::new();
//!
//! let mut root = SplitterNode::root(dataset, "y", &params, &mut trace).unwrap();
//! root.split(&mut trace);
//!
//! assert_eq!(root.split_feature(), Some("x"));
//! assert_eq!(root.nodes().len(), 3);
//! ```

/// Dataset and data manipulation utilities
pub mod data;
/// Error type shared by the crate
pub mod error;
/// Splitter nodes, candidate evaluation and build events
pub mod trees;

pub use error::SplitterError;
