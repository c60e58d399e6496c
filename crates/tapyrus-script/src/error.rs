/// Error types for script operations.
///
/// Covers parsing errors, encoding/decoding failures, address validation,
/// and destination extraction problems.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Invalid opcode data encountered during ASM parsing.
    #[error("invalid opcode data")]
    InvalidOpcodeData,

    /// Attempted to use append_opcodes for a push data opcode.
    #[error("use append_push_data for push data opcodes: {0}")]
    InvalidOpcodeType(String),

    /// Invalid address string.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid address length after Base58 decoding.
    #[error("invalid address length for '{0}'")]
    InvalidAddressLength(String),

    /// Address version byte or destination kind not supported.
    #[error("address not supported: {0}")]
    UnsupportedAddress(String),

    /// Invalid hex string.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Hex decoding error.
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    /// Not enough data in script to complete a push operation.
    #[error("not enough data")]
    DataTooSmall,

    /// Push data exceeds what a push prefix can encode.
    #[error("data too big")]
    DataTooBig,

    /// A push data part exceeds protocol limits.
    #[error("part too big '{0}'")]
    PartTooBig(usize),

    /// Script index is out of range.
    #[error("script index out of range")]
    IndexOutOfRange,

    /// Base58Check checksum does not match.
    #[error("checksum failed")]
    EncodingChecksumFailed,

    /// The script failed syntax validation and matched no template.
    #[error("script is not standard")]
    NonStandard,

    /// The script carries no extractable destination.
    #[error("script has no extractable destination")]
    NoDestination,

    /// A multisig participant count cannot be encoded as a small integer.
    #[error("multisig count out of small-integer range: {0}")]
    InvalidThreshold(usize),

    /// Error from the primitives crate.
    #[error("primitives error: {0}")]
    Primitives(#[from] tapyrus_primitives::PrimitivesError),
}
