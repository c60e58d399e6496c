#![deny(missing_docs)]

//! Tapyrus SDK - Complete SDK.
//!
//! Re-exports all Tapyrus SDK components for convenient single-crate usage.

pub use tapyrus_primitives as primitives;
pub use tapyrus_script as script;
