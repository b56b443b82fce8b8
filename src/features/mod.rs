//! Feature implementations for habitkit.

pub mod stats;
