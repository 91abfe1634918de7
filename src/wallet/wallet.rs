use crate::crypto::{validate_seed, CryptoGateway};
use crate::error::{Error, ValidationError};
use crate::network::messages::PublicKey;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Key material derived from one seed.
///
/// `private_key` and `public_key` hold the lowercase 60 character encodings,
/// `identity` the uppercase encoding of the public key. Secrets are wiped
/// when the wallet is dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Wallet {
    seed: String,
    private_key: String,
    public_key: String,
    identity: String,
    raw_public_key: PublicKey,
    subseed: [u8; 32],
}

impl Wallet {
    pub fn from_seed(gateway: &dyn CryptoGateway, seed: &str) -> Result<Wallet, ValidationError> {
        validate_seed(seed)?;

        let subseed = gateway.derive_subseed(seed).ok_or_else(|| {
            ValidationError::Crypto("Failed to compute subseed from seed".to_string())
        })?;
        let mut private_key = gateway.derive_private_key(&subseed);
        let raw_public_key = gateway.derive_public_key(&private_key);

        let wallet = Wallet {
            seed: seed.to_string(),
            private_key: gateway.encode_identity(&private_key, true),
            public_key: gateway.encode_identity(&raw_public_key, true),
            identity: gateway.encode_identity(&raw_public_key, false),
            raw_public_key,
            subseed,
        };
        private_key.zeroize();

        Ok(wallet)
    }

    /// Create a wallet from a freshly generated seed
    pub fn generate(gateway: &dyn CryptoGateway) -> Result<Wallet, Error> {
        let seed = gateway.random_seed()?;
        Ok(Wallet::from_seed(gateway, &seed)?)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn raw_public_key(&self) -> &PublicKey {
        &self.raw_public_key
    }

    pub(crate) fn subseed(&self) -> &[u8; 32] {
        &self.subseed
    }

    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.identity.starts_with(prefix)
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}
