//! Tapyrus SDK - Cryptographic primitives.
//!
//! This crate provides the foundational building blocks for the Tapyrus SDK:
//! - Hash functions (SHA-256, SHA-256d, RIPEMD-160, Hash160)
//! - secp256k1 public keys with Tapyrus size and validity rules

pub mod ec;
pub mod hash;

mod error;
pub use error::PrimitivesError;
