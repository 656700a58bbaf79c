//! Quadrant application support
//!
//! Holds the layered configuration used by the demo binary.

pub mod config;
