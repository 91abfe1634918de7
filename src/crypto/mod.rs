//! Identity and signature primitives
//!
//! The curve arithmetic and the sponge hash live outside this crate. Everything
//! here talks to them through the [`CryptoGateway`] trait; the only thing
//! implemented locally is seed validation and secure seed generation.

pub mod gateway;
pub mod seed;

pub use gateway::CryptoGateway;
pub use seed::{
    is_valid_seed, random_seed, validate_identity, validate_seed, IDENTITY_LENGTH, SEED_LENGTH,
};
