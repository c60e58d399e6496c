/// Error types for primitive operations.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    /// The bytes do not encode a usable public key.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// The bytes do not encode a point on the secp256k1 curve.
    #[error("invalid point encoding: {0}")]
    InvalidPoint(#[from] k256::ecdsa::Error),

    /// Hex decoding error.
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}
