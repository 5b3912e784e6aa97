//! Physics module for overlap detection
//!
//! Axis-aligned box overlaps only; there is no rigid body simulation or
//! collision response. Overlap transitions are delivered to scripts as
//! collision and trigger callbacks.

pub mod overlap;

pub use overlap::{OverlapPair, OverlapTracker};
