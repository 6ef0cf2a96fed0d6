//! Series preparation ahead of simulation.
//!
//! - `spreads`: per-node price series, sink-minus-source spreads and the
//!   contract-hour curve

pub mod spreads;

pub use spreads::{compute_spread_series, flat_curve, prepare_curve, prepare_node_prices};
