//! Tapyrus address handling.
//!
//! Supports P2PKH and P2SH address generation from the 20-byte destination
//! hashes, address validation, and prod/dev network discrimination.
//! Uses Base58Check encoding with SHA-256d checksums.

use std::fmt;

use tapyrus_primitives::hash::{hash160, sha256d};

use crate::standard::{script_for_destination, Destination};
use crate::{Script, ScriptError};

/// Prod network P2PKH address version byte.
const PROD_P2PKH: u8 = 0x00;
/// Prod network P2SH address version byte.
const PROD_P2SH: u8 = 0x05;
/// Dev network P2PKH address version byte.
const DEV_P2PKH: u8 = 0x6f;
/// Dev network P2SH address version byte.
const DEV_P2SH: u8 = 0xc4;

/// Tapyrus network type for address prefix selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Network {
    /// Production network (P2PKH prefix 0x00, P2SH prefix 0x05).
    Prod,
    /// Development network (P2PKH prefix 0x6f, P2SH prefix 0xc4).
    Dev,
}

/// The kind of hash an address commits to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressKind {
    /// A public key hash (P2PKH).
    PubKeyHash,
    /// A script hash (P2SH).
    ScriptHash,
}

/// A Tapyrus Base58Check address.
///
/// Contains the 20-byte hash, the kind of template it commits to, and the
/// network it belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address {
    /// The human-readable Base58Check address string.
    pub address_string: String,
    /// Whether this address commits to a key hash or a script hash.
    pub kind: AddressKind,
    /// The 20-byte hash the address commits to.
    pub hash: [u8; 20],
    /// The network this address belongs to.
    pub network: Network,
}

impl Address {
    /// Parse a Base58Check-encoded address string.
    ///
    /// Decodes the string, validates the checksum, and detects network and
    /// kind from the version byte.
    ///
    /// # Arguments
    /// * `addr` - The Base58Check address string.
    ///
    /// # Returns
    /// An `Address` or an error if the string is invalid.
    pub fn from_string(addr: &str) -> Result<Self, ScriptError> {
        let decoded = bs58::decode(addr)
            .into_vec()
            .map_err(|_| ScriptError::InvalidAddress(format!("bad char for '{}'", addr)))?;

        if decoded.len() != 25 {
            return Err(ScriptError::InvalidAddressLength(addr.to_string()));
        }

        // Verify checksum: last 4 bytes should equal sha256d of first 21 bytes.
        let checksum = sha256d(&decoded[..21]);
        if decoded[21..25] != checksum[..4] {
            return Err(ScriptError::EncodingChecksumFailed);
        }

        let (network, kind) = match decoded[0] {
            PROD_P2PKH => (Network::Prod, AddressKind::PubKeyHash),
            PROD_P2SH => (Network::Prod, AddressKind::ScriptHash),
            DEV_P2PKH => (Network::Dev, AddressKind::PubKeyHash),
            DEV_P2SH => (Network::Dev, AddressKind::ScriptHash),
            _ => return Err(ScriptError::UnsupportedAddress(addr.to_string())),
        };

        let mut hash = [0u8; 20];
        hash.copy_from_slice(&decoded[1..21]);

        Ok(Address {
            address_string: addr.to_string(),
            kind,
            hash,
            network,
        })
    }

    fn encode(hash: &[u8; 20], kind: AddressKind, network: Network) -> Self {
        let version = match (network, kind) {
            (Network::Prod, AddressKind::PubKeyHash) => PROD_P2PKH,
            (Network::Prod, AddressKind::ScriptHash) => PROD_P2SH,
            (Network::Dev, AddressKind::PubKeyHash) => DEV_P2PKH,
            (Network::Dev, AddressKind::ScriptHash) => DEV_P2SH,
        };

        let mut payload = Vec::with_capacity(25);
        payload.push(version);
        payload.extend_from_slice(hash);
        let checksum = sha256d(&payload);
        payload.extend_from_slice(&checksum[..4]);

        Address {
            address_string: bs58::encode(&payload).into_string(),
            kind,
            hash: *hash,
            network,
        }
    }

    /// Create a P2PKH address from a 20-byte public key hash.
    ///
    /// # Arguments
    /// * `hash` - The 20-byte hash160 of the public key.
    /// * `network` - The target network.
    pub fn from_public_key_hash(hash: &[u8; 20], network: Network) -> Self {
        Self::encode(hash, AddressKind::PubKeyHash, network)
    }

    /// Create a P2SH address from a 20-byte script hash.
    ///
    /// # Arguments
    /// * `hash` - The 20-byte hash160 of the redeem script.
    /// * `network` - The target network.
    pub fn from_script_hash(hash: &[u8; 20], network: Network) -> Self {
        Self::encode(hash, AddressKind::ScriptHash, network)
    }

    /// Create a P2PKH address from a hex-encoded public key string.
    ///
    /// Computes hash160 of the decoded public key bytes exactly as given,
    /// compressed or uncompressed.
    ///
    /// # Arguments
    /// * `pub_key_hex` - Hex-encoded public key.
    /// * `network` - The target network.
    ///
    /// # Returns
    /// An `Address`, or an error if the hex is invalid.
    pub fn from_public_key_string(pub_key_hex: &str, network: Network) -> Result<Self, ScriptError> {
        let pub_key_bytes =
            hex::decode(pub_key_hex).map_err(|e| ScriptError::InvalidHex(e.to_string()))?;
        Ok(Self::from_public_key_hash(&hash160(&pub_key_bytes), network))
    }

    /// Create an address for an extracted destination.
    ///
    /// Only key-hash and script-hash destinations have a Base58Check form;
    /// everything else fails.
    ///
    /// # Arguments
    /// * `destination` - The destination to encode.
    /// * `network` - The target network.
    pub fn from_destination(
        destination: &Destination,
        network: Network,
    ) -> Result<Self, ScriptError> {
        match destination {
            Destination::None => Err(ScriptError::NoDestination),
            Destination::KeyHash(hash) => Ok(Self::from_public_key_hash(hash, network)),
            Destination::ScriptHash(hash) => Ok(Self::from_script_hash(hash, network)),
            #[cfg(feature = "segwit")]
            _ => Err(ScriptError::UnsupportedAddress(
                "witness destinations have no base58 form".to_string(),
            )),
        }
    }

    /// The destination this address commits to.
    pub fn destination(&self) -> Destination {
        match self.kind {
            AddressKind::PubKeyHash => Destination::KeyHash(self.hash),
            AddressKind::ScriptHash => Destination::ScriptHash(self.hash),
        }
    }

    /// Build the canonical output script paying to this address.
    pub fn script_pub_key(&self) -> Script {
        script_for_destination(&self.destination())
    }
}

impl fmt::Display for Address {
    /// Display the address as its Base58Check string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address_string)
    }
}
