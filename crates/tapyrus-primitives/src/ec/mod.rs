//! Elliptic curve types for the Tapyrus SDK.

pub mod public_key;

pub use public_key::PublicKey;
