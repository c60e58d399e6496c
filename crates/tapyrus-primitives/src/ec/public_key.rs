//! secp256k1 public key with Tapyrus-specific functionality.
//!
//! Supports compressed/uncompressed SEC1 serialization, the static size
//! check used by output-script template matching, and key identity hashing.

use std::fmt;

use k256::ecdsa::VerifyingKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;

use crate::hash::hash160;
use crate::PrimitivesError;

/// A secp256k1 public key.
///
/// Wraps a k256 `VerifyingKey`. Construction performs full SEC1 point
/// validation; the cheaper [`PublicKey::valid_size`] check is available for
/// callers that only need to recognize plausibly-encoded key bytes.
#[derive(Clone, Debug)]
pub struct PublicKey {
    /// The underlying k256 verifying key.
    inner: VerifyingKey,
}

impl PublicKey {
    /// Length of a compressed public key in bytes (prefix + 32 byte x-coordinate).
    pub const COMPRESSED_SIZE: usize = 33;

    /// Length of an uncompressed public key in bytes (prefix + 32 byte x + 32 byte y).
    pub const UNCOMPRESSED_SIZE: usize = 65;

    /// Length implied by a SEC1 prefix byte, or 0 for an unknown prefix.
    ///
    /// 0x02/0x03 announce a compressed key, 0x04/0x06/0x07 an uncompressed
    /// (or hybrid) key.
    pub fn expected_len(prefix: u8) -> usize {
        match prefix {
            0x02 | 0x03 => Self::COMPRESSED_SIZE,
            0x04 | 0x06 | 0x07 => Self::UNCOMPRESSED_SIZE,
            _ => 0,
        }
    }

    /// Check that the byte slice has a length consistent with its prefix byte.
    ///
    /// This is a syntactic check only; the bytes need not encode a point on
    /// the curve. Template matchers use it to decide whether a pushed value
    /// can be a public key at all.
    ///
    /// # Arguments
    /// * `bytes` - Candidate public key bytes.
    ///
    /// # Returns
    /// `true` if the slice is non-empty and sized per its first byte.
    pub fn valid_size(bytes: &[u8]) -> bool {
        !bytes.is_empty() && Self::expected_len(bytes[0]) == bytes.len()
    }

    /// Create a PublicKey from raw SEC1 encoded bytes.
    ///
    /// Accepts both compressed (33-byte) and uncompressed (65-byte) formats
    /// and validates that the bytes encode a point on the curve.
    ///
    /// # Arguments
    /// * `bytes` - SEC1-encoded public key bytes.
    ///
    /// # Returns
    /// `Ok(PublicKey)` on success, or an error if the bytes don't represent a valid point.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.is_empty() {
            return Err(PrimitivesError::InvalidPublicKey(
                "pubkey bytes are empty".to_string(),
            ));
        }
        let vk = VerifyingKey::from_sec1_bytes(bytes)?;
        Ok(PublicKey { inner: vk })
    }

    /// Create a PublicKey from a hex-encoded SEC1 string.
    ///
    /// # Arguments
    /// * `hex_str` - A hex string of a compressed (66 chars) or uncompressed (130 chars) key.
    ///
    /// # Returns
    /// `Ok(PublicKey)` on success, or an error if the hex or point is invalid.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Serialize the public key in compressed SEC1 format (33 bytes).
    pub fn to_compressed(&self) -> [u8; Self::COMPRESSED_SIZE] {
        let point = self.inner.to_encoded_point(true);
        let mut out = [0u8; Self::COMPRESSED_SIZE];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize the public key in uncompressed SEC1 format (65 bytes).
    pub fn to_uncompressed(&self) -> [u8; Self::UNCOMPRESSED_SIZE] {
        let point = self.inner.to_encoded_point(false);
        let mut out = [0u8; Self::UNCOMPRESSED_SIZE];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize the public key as a lowercase hex string (compressed format).
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_compressed())
    }

    /// Compute the Hash160 of the compressed public key.
    ///
    /// # Returns
    /// A 20-byte key identity digest.
    pub fn hash160(&self) -> [u8; 20] {
        hash160(&self.to_compressed())
    }
}

impl fmt::Display for PublicKey {
    /// Display the public key as its compressed hex string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    //! Tests for public key parsing, size rules, and hashing.

    use super::*;

    /// The secp256k1 generator point, compressed.
    const GENERATOR_COMPRESSED: &str =
        "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

    /// The secp256k1 generator point, uncompressed.
    const GENERATOR_UNCOMPRESSED: &str =
        "0479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798\
         483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8";

    // -----------------------------------------------------------------------
    // valid_size
    // -----------------------------------------------------------------------

    /// valid_size accepts 33 bytes for 0x02/0x03 and 65 bytes for 0x04/0x06/0x07.
    #[test]
    fn test_valid_size_accepts_matching_prefix() {
        let mut compressed = vec![0x02];
        compressed.extend_from_slice(&[0u8; 32]);
        assert!(PublicKey::valid_size(&compressed));
        compressed[0] = 0x03;
        assert!(PublicKey::valid_size(&compressed));

        for prefix in [0x04u8, 0x06, 0x07] {
            let mut uncompressed = vec![prefix];
            uncompressed.extend_from_slice(&[0u8; 64]);
            assert!(PublicKey::valid_size(&uncompressed));
        }
    }

    /// valid_size rejects empty slices, unknown prefixes, and length mismatches.
    #[test]
    fn test_valid_size_rejections() {
        assert!(!PublicKey::valid_size(&[]));
        // Unknown prefix.
        let mut bytes = vec![0x05];
        bytes.extend_from_slice(&[0u8; 32]);
        assert!(!PublicKey::valid_size(&bytes));
        // Compressed prefix with uncompressed length.
        let mut bytes = vec![0x02];
        bytes.extend_from_slice(&[0u8; 64]);
        assert!(!PublicKey::valid_size(&bytes));
        // Truncated.
        assert!(!PublicKey::valid_size(&[0x02, 0x01]));
    }

    // -----------------------------------------------------------------------
    // from_bytes / from_hex
    // -----------------------------------------------------------------------

    /// A known valid compressed key parses and round-trips through to_hex.
    #[test]
    fn test_from_hex_roundtrip() {
        let key = PublicKey::from_hex(GENERATOR_COMPRESSED).expect("valid key");
        assert_eq!(key.to_hex(), GENERATOR_COMPRESSED);
    }

    /// Compressed and uncompressed encodings of the same point are equal keys.
    #[test]
    fn test_compressed_uncompressed_same_point() {
        let compressed = PublicKey::from_hex(GENERATOR_COMPRESSED).expect("valid key");
        let uncompressed = PublicKey::from_hex(GENERATOR_UNCOMPRESSED).expect("valid key");
        assert_eq!(compressed.to_hex(), uncompressed.to_hex());
        assert_eq!(hex::encode(compressed.to_uncompressed()), GENERATOR_UNCOMPRESSED);
    }

    /// Size-valid bytes that are not a curve point are rejected.
    #[test]
    fn test_from_bytes_rejects_non_point() {
        let mut bytes = vec![0x02];
        bytes.extend_from_slice(&[0xFF; 32]);
        assert!(PublicKey::valid_size(&bytes));
        assert!(PublicKey::from_bytes(&bytes).is_err());
    }

    /// Empty input is rejected with an error, not a panic.
    #[test]
    fn test_from_bytes_empty() {
        assert!(PublicKey::from_bytes(&[]).is_err());
    }

    // -----------------------------------------------------------------------
    // hash160
    // -----------------------------------------------------------------------

    /// hash160 of the generator matches the published compressed-key digest.
    #[test]
    fn test_hash160() {
        let key = PublicKey::from_hex(GENERATOR_COMPRESSED).expect("valid key");
        assert_eq!(
            hex::encode(key.hash160()),
            "751e76e8199196d454941c45d1b3a323f1433bd6"
        );
    }
}
