use crate::error::Result;
use crate::network::messages::{Digest, PublicKey, DIGEST_SIZE, SIGNATURE_SIZE};

/// Bridge to the external key derivation, signature and hash primitives.
///
/// Implementations must be pure: the same inputs always give the same
/// outputs. The trait is object safe and shared between search workers, so
/// it has to be `Send + Sync`.
pub trait CryptoGateway: Send + Sync {
    /// `None` when the seed is rejected
    fn derive_subseed(&self, seed: &str) -> Option<[u8; 32]>;

    fn derive_private_key(&self, subseed: &[u8; 32]) -> [u8; 32];

    fn derive_public_key(&self, private_key: &[u8; 32]) -> PublicKey;

    /// 60 character encoding of a 32 byte key, uppercase unless `lowercase`
    fn encode_identity(&self, key: &[u8; 32], lowercase: bool) -> String;

    fn sign(
        &self,
        subseed: &[u8; 32],
        public_key: &PublicKey,
        digest: &Digest,
    ) -> [u8; SIGNATURE_SIZE];

    /// Sponge hash of `bytes` squeezed to `out_len` bytes
    fn digest(&self, bytes: &[u8], out_len: usize) -> Vec<u8>;

    /// `None` when the identity does not decode
    fn public_key_from_identity(&self, identity: &str) -> Option<PublicKey>;

    /// 32 byte digest of `bytes`
    fn digest32(&self, bytes: &[u8]) -> Digest {
        let mut out = [0u8; DIGEST_SIZE];
        let digest = self.digest(bytes, DIGEST_SIZE);
        let len = digest.len().min(DIGEST_SIZE);
        out[..len].copy_from_slice(&digest[..len]);
        out
    }

    /// Fresh random seed; defaults to the operating system generator
    fn random_seed(&self) -> Result<String> {
        crate::crypto::seed::random_seed()
    }
}
