//! Tapyrus SDK - Output script parsing, classification, and address handling.
//!
//! Provides the Script type, opcode definitions, script chunk parsing,
//! standard template classification (the solver), destination extraction,
//! canonical script construction, and Base58Check address handling.

pub mod address;
pub mod chunk;
pub mod opcodes;
pub mod script;
pub mod standard;

mod error;
pub use address::{Address, AddressKind, Network};
pub use chunk::ScriptChunk;
pub use error::ScriptError;
pub use script::Script;
pub use standard::{Destination, ScriptSolution, ScriptType};
