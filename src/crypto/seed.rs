use crate::error::{Error, Result, ValidationError};
use ring::rand::{SecureRandom, SystemRandom};

/// Number of lowercase letters in a seed
pub const SEED_LENGTH: usize = 55;

/// Number of characters in an encoded identity or key
pub const IDENTITY_LENGTH: usize = 60;

// Largest multiple of 26 below 256, so `byte % 26` stays uniform
const REJECTION_LIMIT: u8 = 234;

/// Check the seed is exactly 55 characters from `a` to `z`
pub fn validate_seed(seed: &str) -> std::result::Result<(), ValidationError> {
    if seed.len() != SEED_LENGTH {
        return Err(ValidationError::SeedLength(seed.len()));
    }
    if !seed.bytes().all(|b| b.is_ascii_lowercase()) {
        return Err(ValidationError::SeedCharacters);
    }
    Ok(())
}

pub fn is_valid_seed(seed: &str) -> bool {
    validate_seed(seed).is_ok()
}

/// Only the length is checked here; the gateway decides if it decodes
pub fn validate_identity(identity: &str) -> std::result::Result<(), ValidationError> {
    if identity.len() != IDENTITY_LENGTH {
        return Err(ValidationError::IdentityLength(identity.len()));
    }
    Ok(())
}

/// Draw a fresh seed from the operating system's secure generator
pub fn random_seed() -> Result<String> {
    let rng = SystemRandom::new();
    let mut seed = String::with_capacity(SEED_LENGTH);
    let mut pool = [0u8; 64];

    while seed.len() < SEED_LENGTH {
        rng.fill(&mut pool)
            .map_err(|_| Error::Crypto("Failed to draw random bytes for seed".to_string()))?;
        for &byte in pool.iter().filter(|&&b| b < REJECTION_LIMIT) {
            if seed.len() == SEED_LENGTH {
                break;
            }
            seed.push(char::from(b'a' + byte % 26));
        }
    }

    Ok(seed)
}
