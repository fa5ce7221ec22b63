//! Core type aliases and constants for the chainbridge ledger.

/// 32-byte hash used for block hashes, state roots, and transaction hashes.
pub type Hash = [u8; 32];

/// Block height. `0` means no block has been sealed yet.
pub type BlockHeight = u64;

/// A zero-valued hash (32 zero bytes).
pub const ZERO_HASH: Hash = [0u8; 32];

/// Sentinel returned as the latest hash of a chain with no sealed blocks.
/// It is also the `prev_hash` of the first block.
pub const GENESIS_HASH: Hash = ZERO_HASH;

/// Convert a `Hash` to a `0x`-prefixed lowercase hex string.
pub fn hash_to_hex(hash: &Hash) -> String {
    let mut s = String::with_capacity(66);
    s.push_str("0x");
    for byte in hash {
        use std::fmt::Write;
        let _ = write!(s, "{:02x}", byte);
    }
    s
}

/// Decode a u64 from little-endian bytes.
pub fn u64_from_le_bytes(bytes: &[u8]) -> Option<u64> {
    if bytes.len() < 8 {
        return None;
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    Some(u64::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_to_hex() {
        let hash = [0xab; 32];
        let hex = hash_to_hex(&hash);
        assert_eq!(hex.len(), 66); // "0x" + 64 hex chars
        assert!(hex.starts_with("0x"));
        assert!(hex[2..].chars().all(|c| c == 'a' || c == 'b'));
    }

    #[test]
    fn test_genesis_hex_is_all_zeros() {
        let hex = hash_to_hex(&GENESIS_HASH);
        assert_eq!(&hex[2..], "0".repeat(64));
    }

    #[test]
    fn test_u64_from_short_slice() {
        assert_eq!(u64_from_le_bytes(&[0, 1, 2]), None);
        assert_eq!(u64_from_le_bytes(&7u64.to_le_bytes()), Some(7));
    }
}
