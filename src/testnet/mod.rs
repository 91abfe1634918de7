//! Test support shared by the unit tests
//!
//! Provides a deterministic crypto gateway and a scripted mock node so that
//! every operation can be exercised end to end without a live network.

pub mod test_utils;

pub use test_utils::*;
