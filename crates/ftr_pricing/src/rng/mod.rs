//! # Random Number Generation
//!
//! Seeded random number generation for the block bootstrap.
//!
//! ## Design Rationale
//!
//! - **Reproducibility**: every generator is built from an explicit seed at
//!   the start of a pricing call and threaded through by `&mut`
//! - **Portability**: the stream is ChaCha12, whose output is fixed across
//!   `rand` releases and platforms
//! - **No globals**: there is no shared generator, so contracts priced on
//!   different threads never interleave draws
//!
//! ## Usage Example
//!
//! ```rust
//! use ftr_pricing::rng::PricerRng;
//!
//! let mut rng = PricerRng::from_seed(123);
//! let start = rng.gen_index(168);
//! assert!(start < 168);
//! ```

pub mod prng;

pub use prng::PricerRng;
