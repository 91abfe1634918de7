//! Wallet derivation
//!
//! A wallet is a pure function of its 55 letter seed. This module turns a
//! seed into the key material and display forms through the crypto gateway.

#[allow(clippy::module_inception)]
pub mod wallet;

pub use wallet::Wallet;
