//! Hashing primitives.
//!
//! - SHA-256 for transaction hashes, block hashes and proposer seeds
//! - BLAKE3 for Merkle nodes (state root and transaction root)
//!
//! All operations are deterministic.

use crate::types::Hash;

/// Compute BLAKE3 hash of the input data.
pub fn hash_blake3(data: &[u8]) -> Hash {
    *blake3::hash(data).as_bytes()
}

/// Compute SHA-256 hash of the input data.
pub fn hash_sha256(data: &[u8]) -> Hash {
    use sha2::Digest;
    let result = sha2::Sha256::digest(data);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blake3_deterministic() {
        let h1 = hash_blake3(b"hello ledger");
        let h2 = hash_blake3(b"hello ledger");
        assert_eq!(h1, h2);
        assert_ne!(h1, hash_blake3(b"hello ledger!"));
    }

    #[test]
    fn test_sha256_known_vector() {
        // SHA-256("") = e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855
        let h = hash_sha256(b"");
        assert_eq!(h[0], 0xe3);
        assert_eq!(h[1], 0xb0);
        assert_eq!(h[31], 0x55);
    }
}
