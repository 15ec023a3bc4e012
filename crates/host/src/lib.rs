//! Single-threaded match driver for [`sim_core::Game`] implementations.

mod host;

pub use host::{MatchHost, RunResult};
