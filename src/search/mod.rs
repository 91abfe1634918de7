//! Vanity identity search
//!
//! Brute force over random seeds until an identity starts with the wanted
//! prefix, spread over a fixed pool of worker threads.

pub mod prefix;

pub use prefix::{default_workers, search_prefix, validate_prefix, BruteForceJob};
