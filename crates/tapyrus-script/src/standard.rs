//! Standard output-script templates.
//!
//! Classifies output scripts into the closed set of canonical spending
//! templates (the solver), extracts spendable destinations from a
//! classification, and builds canonical scripts from destinations. The
//! solver is a fixed priority chain of byte-exact matchers backed by a
//! syntax check that mirrors the runtime interpreter's acceptance rules
//! without executing anything. Everything here is pure and operates on an
//! immutable script; identical input always yields identical output.

use std::fmt;

use tapyrus_primitives::ec::PublicKey;
#[cfg(feature = "segwit")]
use tapyrus_primitives::hash::sha256;
use tapyrus_primitives::hash::hash160;

use crate::chunk::{decode_script, read_op};
use crate::opcodes::*;
use crate::{Script, ScriptError};

/// Maximum number of bytes a single pushed element may carry.
pub const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;

/// Maximum number of non-push operations per script.
pub const MAX_OPS_PER_SCRIPT: usize = 201;

/// Serialized size of a color identifier: 1 type byte + 32 byte payload.
pub const COLOR_IDENTIFIER_SIZE: usize = 33;

/// Default for whether relay policy accepts data-carrier outputs.
pub const DEFAULT_ACCEPT_DATA_CARRIER: bool = true;

/// Default ceiling on the size of a data-carrier output script, in bytes.
pub const MAX_DATA_CARRIER_BYTES: usize = 83;

/// The canonical spending templates an output script can classify as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptType {
    /// No template matched, or the script failed syntax validation.
    NonStandard,
    /// Pay directly to a public key.
    PubKey,
    /// Pay to a public key hash.
    PubKeyHash,
    /// Pay to a script hash.
    ScriptHash,
    /// M-of-N checkmultisig.
    Multisig,
    /// Provably unspendable data carrier.
    NullData,
    /// Syntactically valid script outside the canonical templates.
    Custom,
    /// Colored pay-to-pubkey-hash.
    ColorPubKeyHash,
    /// Colored pay-to-script-hash.
    ColorScriptHash,
    /// Version-0 witness key hash.
    #[cfg(feature = "segwit")]
    WitnessV0KeyHash,
    /// Version-0 witness script hash.
    #[cfg(feature = "segwit")]
    WitnessV0ScriptHash,
    /// Witness program with an unrecognized version.
    #[cfg(feature = "segwit")]
    WitnessUnknown,
}

impl ScriptType {
    /// Stable human-readable name for this script type.
    ///
    /// Consumed by logging and RPC layers; the strings are part of the
    /// external interface and must not change.
    pub fn name(&self) -> &'static str {
        match self {
            ScriptType::NonStandard => "nonstandard",
            ScriptType::PubKey => "pubkey",
            ScriptType::PubKeyHash => "pubkeyhash",
            ScriptType::ScriptHash => "scripthash",
            ScriptType::Multisig => "multisig",
            ScriptType::NullData => "nulldata",
            ScriptType::Custom => "custom",
            ScriptType::ColorPubKeyHash => "coloredpubkeyhash",
            ScriptType::ColorScriptHash => "coloredscripthash",
            #[cfg(feature = "segwit")]
            ScriptType::WitnessV0KeyHash => "witness_v0_keyhash",
            #[cfg(feature = "segwit")]
            ScriptType::WitnessV0ScriptHash => "witness_v0_scripthash",
            #[cfg(feature = "segwit")]
            ScriptType::WitnessUnknown => "witness_unknown",
        }
    }
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The result of classifying an output script.
///
/// `valid` is false in exactly one case: the script matched no template and
/// failed syntax validation. Callers detecting malformed input must branch
/// on `valid`, not on the type tag - a witness-shaped script classifies as
/// `NonStandard` with `valid` true.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptSolution {
    /// The matched template, or `NonStandard`/`Custom` fallbacks.
    pub script_type: ScriptType,
    /// Template-specific extracted byte fields, in template order.
    pub solutions: Vec<Vec<u8>>,
    /// False only when the script failed syntax validation.
    pub valid: bool,
}

/// A concrete spending destination extracted from an output script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Destination {
    /// Not a valid or recognized destination.
    None,
    /// A 20-byte public key identity hash.
    KeyHash([u8; 20]),
    /// A 20-byte script hash.
    ScriptHash([u8; 20]),
    /// A version-0 witness key hash.
    #[cfg(feature = "segwit")]
    WitnessKeyHash([u8; 20]),
    /// A version-0 witness script hash.
    #[cfg(feature = "segwit")]
    WitnessScriptHash([u8; 32]),
    /// A witness program with an unrecognized version.
    #[cfg(feature = "segwit")]
    WitnessUnknown {
        /// Witness version, 0..=16.
        version: u8,
        /// Raw program bytes, 2..=40 in well-formed programs.
        program: Vec<u8>,
    },
}

impl Destination {
    /// Whether this is an actual destination rather than the `None` marker.
    pub fn is_valid(&self) -> bool {
        !matches!(self, Destination::None)
    }
}

/// Destinations extracted from a script, with the signature threshold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedDestinations {
    /// The classification the destinations were derived from.
    pub script_type: ScriptType,
    /// One destination per usable key; exactly one for non-multisig types.
    pub destinations: Vec<Destination>,
    /// Signatures required to spend (1 for non-multisig types).
    pub required: usize,
}

/// Relay-policy settings for data-carrier outputs.
///
/// The classifier itself never consults these; they belong to relay-policy
/// callers deciding whether to accept a `NullData` output, and are passed
/// explicitly rather than read from process state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DataCarrierPolicy {
    /// Whether data-carrier outputs are relayed at all.
    pub accept_data_carrier: bool,
    /// Largest acceptable data-carrier script, in bytes.
    pub max_data_carrier_bytes: usize,
}

impl Default for DataCarrierPolicy {
    fn default() -> Self {
        DataCarrierPolicy {
            accept_data_carrier: DEFAULT_ACCEPT_DATA_CARRIER,
            max_data_carrier_bytes: MAX_DATA_CARRIER_BYTES,
        }
    }
}

impl DataCarrierPolicy {
    /// Whether a data-carrier script of `script_len` bytes passes this policy.
    pub fn accepts(&self, script_len: usize) -> bool {
        self.accept_data_carrier && script_len <= self.max_data_carrier_bytes
    }
}

// ---------------------------------------------------------------------------
// Template matchers
// ---------------------------------------------------------------------------

/// Match `<pubkey> OP_CHECKSIG` with a 33- or 65-byte key.
fn match_pay_to_pubkey(script: &Script) -> Option<Vec<u8>> {
    let b = script.to_bytes();
    if b.len() == PublicKey::UNCOMPRESSED_SIZE + 2
        && b[0] as usize == PublicKey::UNCOMPRESSED_SIZE
        && b[b.len() - 1] == OP_CHECKSIG
    {
        let pubkey = b[1..1 + PublicKey::UNCOMPRESSED_SIZE].to_vec();
        return PublicKey::valid_size(&pubkey).then_some(pubkey);
    }
    if b.len() == PublicKey::COMPRESSED_SIZE + 2
        && b[0] as usize == PublicKey::COMPRESSED_SIZE
        && b[b.len() - 1] == OP_CHECKSIG
    {
        let pubkey = b[1..1 + PublicKey::COMPRESSED_SIZE].to_vec();
        return PublicKey::valid_size(&pubkey).then_some(pubkey);
    }
    None
}

/// Match `OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG`.
fn match_pay_to_pubkey_hash(script: &Script) -> Option<Vec<u8>> {
    let b = script.to_bytes();
    if b.len() == 25
        && b[0] == OP_DUP
        && b[1] == OP_HASH160
        && b[2] == OP_DATA_20
        && b[23] == OP_EQUALVERIFY
        && b[24] == OP_CHECKSIG
    {
        return Some(b[3..23].to_vec());
    }
    None
}

/// Match `<color identifier> OP_COLOR OP_DUP OP_HASH160 <20 bytes>
/// OP_EQUALVERIFY OP_CHECKSIG` at fixed offsets.
///
/// The color identifier is a 33-byte token (type byte 1, 2, or 3 plus a
/// 32-byte payload) pushed with a 0x21 length byte.
///
/// # Returns
/// `Some((pubkey_hash, color_id))` on a match.
pub fn match_colored_pay_to_pubkey_hash(script: &Script) -> Option<(Vec<u8>, Vec<u8>)> {
    let b = script.to_bytes();
    if b.len() == 60
        && b[0] == OP_DATA_33
        && matches!(b[1], 0x01..=0x03)
        && b[34] == OP_COLOR
        && b[35] == OP_DUP
        && b[36] == OP_HASH160
        && b[37] == OP_DATA_20
        && b[58] == OP_EQUALVERIFY
        && b[59] == OP_CHECKSIG
    {
        return Some((b[38..58].to_vec(), b[1..34].to_vec()));
    }
    None
}

/// Heuristically locate a color identifier anywhere in a script.
///
/// Byte-scans for the first literal 0x21 and op-scans for the first
/// OP_COLOR; succeeds when the op cursor ends exactly 34 bytes past the
/// 0x21, extracting the 33 bytes after it. The 0x21 found this way need not
/// be a push marker at all - it can sit inside unrelated push data - so
/// this matcher has known false positives and false negatives that callers
/// rely on staying stable.
///
/// # Returns
/// `Some(color_id)` when the pattern distance matches.
pub fn match_custom_colored_script(script: &Script) -> Option<Vec<u8>> {
    let bytes = script.to_bytes();
    let marker = bytes.iter().position(|&b| b == OP_DATA_33)?;

    let mut cursor = 0usize;
    let mut found = false;
    while cursor < bytes.len() {
        let chunk = read_op(bytes, &mut cursor).ok()?;
        if chunk.op == OP_COLOR {
            found = true;
            break;
        }
    }
    if !found {
        return None;
    }

    if cursor == marker + 34 {
        return Some(bytes[marker + 1..marker + 34].to_vec());
    }
    None
}

/// Match `OP_m <pubkey>... OP_n OP_CHECKMULTISIG`.
///
/// Consumes key pushes while they pass the static public key size check;
/// the op that breaks the run must be the small-integer key count. Rejects
/// unless the collected key count equals that count, the threshold does not
/// exceed it, and the final OP_CHECKMULTISIG is the very last byte.
fn match_multisig(script: &Script) -> Option<(u8, Vec<Vec<u8>>)> {
    let bytes = script.to_bytes();
    if bytes.is_empty() || bytes[bytes.len() - 1] != OP_CHECKMULTISIG {
        return None;
    }
    let chunks = decode_script(bytes).ok()?;

    let first = chunks.first()?;
    if !is_small_int_op(first.op) {
        return None;
    }
    let required = decode_op_n(first.op);

    let mut keys = Vec::new();
    let mut i = 1;
    while i < chunks.len() {
        match &chunks[i].data {
            Some(data) if PublicKey::valid_size(data) => {
                keys.push(data.clone());
                i += 1;
            }
            _ => break,
        }
    }

    let count_op = chunks.get(i)?;
    if !is_small_int_op(count_op.op) {
        return None;
    }
    let count = decode_op_n(count_op.op) as usize;
    if keys.len() != count || count < required as usize {
        return None;
    }
    if chunks.len() != i + 2 || chunks[i + 1].op != OP_CHECKMULTISIG {
        return None;
    }
    Some((required, keys))
}

// ---------------------------------------------------------------------------
// Syntax validation
// ---------------------------------------------------------------------------

/// Check an output script against the interpreter's structural rules.
///
/// Single forward pass. Fails on a decode error, on any pushed element
/// larger than [`MAX_SCRIPT_ELEMENT_SIZE`], when the count of non-push
/// opcodes exceeds [`MAX_OPS_PER_SCRIPT`], or on any disabled opcode. This
/// mirrors the checks the interpreter applies while executing, without
/// running the script.
pub fn check_script_syntax(script: &Script) -> bool {
    let chunks = match decode_script(script.to_bytes()) {
        Ok(chunks) => chunks,
        Err(_) => return false,
    };

    let mut op_count = 0usize;
    for chunk in &chunks {
        if let Some(data) = &chunk.data {
            if data.len() > MAX_SCRIPT_ELEMENT_SIZE {
                return false;
            }
        }
        if chunk.op > OP_16 {
            op_count += 1;
            if op_count > MAX_OPS_PER_SCRIPT {
                return false;
            }
        }
        if is_disabled_op(chunk.op) {
            return false;
        }
    }
    true
}

// ---------------------------------------------------------------------------
// Solver
// ---------------------------------------------------------------------------

/// Classify an output script into its canonical template.
///
/// Matchers run in a fixed priority order; the first match wins. The order
/// is load-bearing because templates overlap in length, and it must not be
/// reordered. A witness-shaped script deliberately classifies as
/// `NonStandard` with `valid` true and no solution data.
pub fn solve(script: &Script) -> ScriptSolution {
    let bytes = script.to_bytes();

    // Pay-to-script-hash is more constrained than the other templates:
    // always OP_HASH160 <20 byte hash> OP_EQUAL.
    if script.is_pay_to_script_hash() {
        return ScriptSolution {
            script_type: ScriptType::ScriptHash,
            solutions: vec![bytes[2..22].to_vec()],
            valid: true,
        };
    }

    if script.is_colored_pay_to_script_hash() {
        return ScriptSolution {
            script_type: ScriptType::ColorScriptHash,
            solutions: vec![bytes[37..57].to_vec(), bytes[1..34].to_vec()],
            valid: true,
        };
    }

    if script.witness_program().is_some() {
        return ScriptSolution {
            script_type: ScriptType::NonStandard,
            solutions: Vec::new(),
            valid: true,
        };
    }

    // Provably prunable, data-carrying output. Anything goes after the
    // OP_RETURN as long as the remainder is push-only.
    if !bytes.is_empty() && bytes[0] == OP_RETURN && script.is_push_only_from(1) {
        return ScriptSolution {
            script_type: ScriptType::NullData,
            solutions: Vec::new(),
            valid: true,
        };
    }

    if let Some(pubkey) = match_pay_to_pubkey(script) {
        return ScriptSolution {
            script_type: ScriptType::PubKey,
            solutions: vec![pubkey],
            valid: true,
        };
    }

    if let Some(hash) = match_pay_to_pubkey_hash(script) {
        return ScriptSolution {
            script_type: ScriptType::PubKeyHash,
            solutions: vec![hash],
            valid: true,
        };
    }

    if let Some((hash, color_id)) = match_colored_pay_to_pubkey_hash(script) {
        return ScriptSolution {
            script_type: ScriptType::ColorPubKeyHash,
            solutions: vec![hash, color_id],
            valid: true,
        };
    }

    if let Some((required, keys)) = match_multisig(script) {
        let count = keys.len() as u8;
        let mut solutions = Vec::with_capacity(keys.len() + 2);
        solutions.push(vec![required]);
        solutions.extend(keys);
        solutions.push(vec![count]);
        return ScriptSolution {
            script_type: ScriptType::Multisig,
            solutions,
            valid: true,
        };
    }

    if check_script_syntax(script) {
        ScriptSolution {
            script_type: ScriptType::Custom,
            solutions: Vec::new(),
            valid: true,
        }
    } else {
        ScriptSolution {
            script_type: ScriptType::NonStandard,
            solutions: Vec::new(),
            valid: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Destination extraction
// ---------------------------------------------------------------------------

fn hash20(bytes: &[u8]) -> [u8; 20] {
    let mut hash = [0u8; 20];
    hash.copy_from_slice(bytes);
    hash
}

/// Extract the single destination an output script pays to.
///
/// Multisig scripts have more than one address and deliberately fail here;
/// use [`extract_destinations`] for those. The key in a pay-to-pubkey
/// script must pass full point validation, and its identity hash covers
/// the key bytes exactly as pushed, compressed or uncompressed.
pub fn extract_destination(script: &Script) -> Result<Destination, ScriptError> {
    let solution = solve(script);
    if !solution.valid {
        return Err(ScriptError::NonStandard);
    }

    match solution.script_type {
        ScriptType::PubKey => {
            let raw = &solution.solutions[0];
            if PublicKey::from_bytes(raw).is_err() {
                return Err(ScriptError::NoDestination);
            }
            Ok(Destination::KeyHash(hash160(raw)))
        }
        ScriptType::PubKeyHash | ScriptType::ColorPubKeyHash => {
            Ok(Destination::KeyHash(hash20(&solution.solutions[0])))
        }
        ScriptType::ScriptHash | ScriptType::ColorScriptHash => {
            Ok(Destination::ScriptHash(hash20(&solution.solutions[0])))
        }
        #[cfg(feature = "segwit")]
        ScriptType::WitnessV0KeyHash => {
            Ok(Destination::WitnessKeyHash(hash20(&solution.solutions[0])))
        }
        #[cfg(feature = "segwit")]
        ScriptType::WitnessV0ScriptHash => {
            let mut hash = [0u8; 32];
            hash.copy_from_slice(&solution.solutions[0]);
            Ok(Destination::WitnessScriptHash(hash))
        }
        #[cfg(feature = "segwit")]
        ScriptType::WitnessUnknown => Ok(Destination::WitnessUnknown {
            version: solution.solutions[0][0],
            program: solution.solutions[1].clone(),
        }),
        _ => Err(ScriptError::NoDestination),
    }
}

/// Extract every destination an output script pays to.
///
/// `NullData` scripts carry data, not addresses, and always fail. For
/// multisig, each embedded key is validated individually; keys that fail
/// validation are skipped without failing the extraction, and the call
/// errors only if no usable key remains.
pub fn extract_destinations(script: &Script) -> Result<ExtractedDestinations, ScriptError> {
    let solution = solve(script);
    if !solution.valid {
        return Err(ScriptError::NonStandard);
    }
    if solution.script_type == ScriptType::NullData {
        // This is data, not addresses.
        return Err(ScriptError::NoDestination);
    }

    if solution.script_type == ScriptType::Multisig {
        let required = solution.solutions[0][0] as usize;
        let mut destinations = Vec::new();
        for key in &solution.solutions[1..solution.solutions.len() - 1] {
            if PublicKey::from_bytes(key).is_err() {
                continue;
            }
            destinations.push(Destination::KeyHash(hash160(key)));
        }
        if destinations.is_empty() {
            return Err(ScriptError::NoDestination);
        }
        Ok(ExtractedDestinations {
            script_type: solution.script_type,
            destinations,
            required,
        })
    } else {
        let destination = extract_destination(script)?;
        Ok(ExtractedDestinations {
            script_type: solution.script_type,
            destinations: vec![destination],
            required: 1,
        })
    }
}

// ---------------------------------------------------------------------------
// Script builders
// ---------------------------------------------------------------------------

/// Build the canonical output script paying to a destination.
///
/// `Destination::None` yields an empty script, which is the failure signal;
/// check [`Destination::is_valid`] before building when that matters.
pub fn script_for_destination(destination: &Destination) -> Script {
    match destination {
        Destination::None => Script::new(),
        Destination::KeyHash(hash) => {
            let mut bytes = Vec::with_capacity(25);
            bytes.extend_from_slice(&[OP_DUP, OP_HASH160, OP_DATA_20]);
            bytes.extend_from_slice(hash);
            bytes.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
            Script::from_bytes(&bytes)
        }
        Destination::ScriptHash(hash) => {
            let mut bytes = Vec::with_capacity(23);
            bytes.extend_from_slice(&[OP_HASH160, OP_DATA_20]);
            bytes.extend_from_slice(hash);
            bytes.push(OP_EQUAL);
            Script::from_bytes(&bytes)
        }
        #[cfg(feature = "segwit")]
        Destination::WitnessKeyHash(hash) => {
            let mut bytes = Vec::with_capacity(22);
            bytes.extend_from_slice(&[OP_0, OP_DATA_20]);
            bytes.extend_from_slice(hash);
            Script::from_bytes(&bytes)
        }
        #[cfg(feature = "segwit")]
        Destination::WitnessScriptHash(hash) => {
            let mut bytes = Vec::with_capacity(34);
            bytes.extend_from_slice(&[OP_0, OP_DATA_32]);
            bytes.extend_from_slice(hash);
            Script::from_bytes(&bytes)
        }
        #[cfg(feature = "segwit")]
        Destination::WitnessUnknown { version, program } => {
            let mut script = Script::from_bytes(&[encode_op_n(*version)]);
            if script.append_push_data(program).is_err() {
                return Script::new();
            }
            script
        }
    }
}

/// Build `<pubkey> OP_CHECKSIG` paying directly to a raw public key.
pub fn script_for_raw_pubkey(pubkey: &[u8]) -> Result<Script, ScriptError> {
    let mut script = Script::new();
    script.append_push_data(pubkey)?;
    script.append_opcodes(&[OP_CHECKSIG])?;
    Ok(script)
}

/// Build `OP_m <pubkey>... OP_n OP_CHECKMULTISIG`.
///
/// Keys are pushed in input order. No standardness policy is applied here;
/// the only limit is that the threshold and key count must fit a
/// small-integer opcode (0..=16).
pub fn script_for_multisig(required: usize, keys: &[Vec<u8>]) -> Result<Script, ScriptError> {
    if required > 16 {
        return Err(ScriptError::InvalidThreshold(required));
    }
    if keys.len() > 16 {
        return Err(ScriptError::InvalidThreshold(keys.len()));
    }
    let mut script = Script::from_bytes(&[encode_op_n(required as u8)]);
    for key in keys {
        script.append_push_data(key)?;
    }
    script.append_opcodes(&[encode_op_n(keys.len() as u8), OP_CHECKMULTISIG])?;
    Ok(script)
}

/// Build the witness output for a redeem script.
///
/// A redeem script that solves to pay-to-pubkey or pay-to-pubkey-hash
/// becomes a witness-key-hash output; everything else becomes a
/// witness-script-hash output wrapping the SHA-256 of the whole redeem
/// script.
#[cfg(feature = "segwit")]
pub fn script_for_witness(redeem_script: &Script) -> Script {
    let solution = solve(redeem_script);
    if solution.valid {
        if solution.script_type == ScriptType::PubKey {
            return script_for_destination(&Destination::WitnessKeyHash(hash160(
                &solution.solutions[0],
            )));
        }
        if solution.script_type == ScriptType::PubKeyHash {
            return script_for_destination(&Destination::WitnessKeyHash(hash20(
                &solution.solutions[0],
            )));
        }
    }
    script_for_destination(&Destination::WitnessScriptHash(sha256(
        redeem_script.to_bytes(),
    )))
}
