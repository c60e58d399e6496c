//! Script chunk parsing and encoding.
//!
//! A script chunk is either an opcode or a data push with its associated
//! bytes. This module decodes raw script bytes into structured chunks the
//! same way the runtime interpreter steps through them, one operation at a
//! time, and encodes push data with the correct OP_PUSHDATA prefix.

use crate::opcodes::*;
use crate::ScriptError;

/// A single parsed element of a script.
///
/// Each chunk is either a standalone opcode (like OP_DUP) or a data push
/// that carries the opcode byte and the pushed data bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptChunk {
    /// The opcode byte. For direct pushes (1-75 bytes), this is the length.
    pub op: u8,
    /// The data payload, if this chunk is a push operation.
    pub data: Option<Vec<u8>>,
}

impl ScriptChunk {
    /// Convert this chunk to its ASM string representation.
    ///
    /// Data push chunks are rendered as hex strings; non-push opcodes use
    /// their canonical OP_xxx name.
    pub fn to_asm_string(&self) -> String {
        if self.op > OP_0 && self.op <= OP_PUSHDATA4 {
            if let Some(ref data) = self.data {
                return hex::encode(data);
            }
        }
        opcode_to_string(self.op).to_string()
    }
}

/// Read a single script operation starting at `pos`, advancing `pos` past
/// the consumed bytes.
///
/// Handles direct pushes (opcode 0x01-0x4b is the byte count) and
/// OP_PUSHDATA1/2/4 with little-endian lengths. Every other byte decodes as
/// a plain opcode, exactly as the interpreter's forward scan would see it;
/// in particular OP_RETURN does not swallow the remainder of the script.
///
/// # Arguments
/// * `bytes` - The raw script bytes.
/// * `pos` - Mutable read position.
///
/// # Returns
/// The parsed `ScriptChunk`, or a `ScriptError` if the position is out of
/// range or a push is truncated.
pub fn read_op(bytes: &[u8], pos: &mut usize) -> Result<ScriptChunk, ScriptError> {
    if *pos >= bytes.len() {
        return Err(ScriptError::IndexOutOfRange);
    }
    let op = bytes[*pos];

    match op {
        OP_PUSHDATA1 => {
            if bytes.len() < *pos + 2 {
                return Err(ScriptError::DataTooSmall);
            }
            let length = bytes[*pos + 1] as usize;
            *pos += 2;
            if bytes.len() < *pos + length {
                return Err(ScriptError::DataTooSmall);
            }
            let data = bytes[*pos..*pos + length].to_vec();
            *pos += length;
            Ok(ScriptChunk { op, data: Some(data) })
        }
        OP_PUSHDATA2 => {
            if bytes.len() < *pos + 3 {
                return Err(ScriptError::DataTooSmall);
            }
            let length = u16::from_le_bytes([bytes[*pos + 1], bytes[*pos + 2]]) as usize;
            *pos += 3;
            if bytes.len() < *pos + length {
                return Err(ScriptError::DataTooSmall);
            }
            let data = bytes[*pos..*pos + length].to_vec();
            *pos += length;
            Ok(ScriptChunk { op, data: Some(data) })
        }
        OP_PUSHDATA4 => {
            if bytes.len() < *pos + 5 {
                return Err(ScriptError::DataTooSmall);
            }
            let length = u32::from_le_bytes([
                bytes[*pos + 1],
                bytes[*pos + 2],
                bytes[*pos + 3],
                bytes[*pos + 4],
            ]) as usize;
            *pos += 5;
            if bytes.len() < *pos + length {
                return Err(ScriptError::DataTooSmall);
            }
            let data = bytes[*pos..*pos + length].to_vec();
            *pos += length;
            Ok(ScriptChunk { op, data: Some(data) })
        }
        0x01..=0x4b => {
            // Direct push: op byte is the number of bytes to push.
            let length = op as usize;
            if bytes.len() < *pos + 1 + length {
                return Err(ScriptError::DataTooSmall);
            }
            let data = bytes[*pos + 1..*pos + 1 + length].to_vec();
            *pos += 1 + length;
            Ok(ScriptChunk { op, data: Some(data) })
        }
        _ => {
            *pos += 1;
            Ok(ScriptChunk { op, data: None })
        }
    }
}

/// Decode raw script bytes into a vector of `ScriptChunk` values.
///
/// Applies [`read_op`] until the script is exhausted.
///
/// # Arguments
/// * `bytes` - The raw script bytes to decode.
///
/// # Returns
/// A vector of parsed chunks, or a `ScriptError` if a push is truncated.
pub fn decode_script(bytes: &[u8]) -> Result<Vec<ScriptChunk>, ScriptError> {
    let mut chunks = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        chunks.push(read_op(bytes, &mut pos)?);
    }

    Ok(chunks)
}

/// Compute the OP_PUSHDATA prefix bytes for a data payload of the given length.
///
/// Returns the prefix that should be prepended to the data when encoding
/// a push operation into raw script bytes.
///
/// # Arguments
/// * `data_len` - The length of the data to be pushed.
///
/// # Returns
/// A byte vector containing the appropriate prefix, or an error if the data
/// is too large for the protocol.
pub fn push_data_prefix(data_len: usize) -> Result<Vec<u8>, ScriptError> {
    if data_len <= 75 {
        Ok(vec![data_len as u8])
    } else if data_len <= 0xFF {
        Ok(vec![OP_PUSHDATA1, data_len as u8])
    } else if data_len <= 0xFFFF {
        let mut buf = vec![OP_PUSHDATA2];
        buf.extend_from_slice(&(data_len as u16).to_le_bytes());
        Ok(buf)
    } else if data_len <= 0xFFFFFFFF {
        let mut buf = vec![OP_PUSHDATA4];
        buf.extend_from_slice(&(data_len as u32).to_le_bytes());
        Ok(buf)
    } else {
        Err(ScriptError::DataTooBig)
    }
}

/// Encode multiple data payloads into a single byte vector with push prefixes.
///
/// Each element in `parts` gets its own OP_PUSHDATA prefix based on length.
///
/// # Arguments
/// * `parts` - Slice of data byte slices to encode.
///
/// # Returns
/// A byte vector containing all pushes concatenated, or an error if any
/// part is too large.
pub fn encode_push_datas(parts: &[&[u8]]) -> Result<Vec<u8>, ScriptError> {
    let mut result = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        let prefix = push_data_prefix(part.len()).map_err(|_| ScriptError::PartTooBig(i))?;
        result.extend_from_slice(&prefix);
        result.extend_from_slice(part);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    //! Tests for script chunk decoding and push data encoding.
    //!
    //! Covers decode_script with simple and malformed inputs, the
    //! interpreter-faithful handling of OP_RETURN, push_data_prefix
    //! boundary sizes, and encode_push_datas roundtrips.

    use super::*;

    // -----------------------------------------------------------------------
    // decode_script - basic cases
    // -----------------------------------------------------------------------

    /// Decode a script with three simple push chunks and verify count.
    #[test]
    fn test_decode_script_simple() {
        let script_hex = "05000102030401FF02ABCD";
        let bytes = hex::decode(script_hex).expect("valid hex");
        let parts = decode_script(&bytes).expect("should decode");
        assert_eq!(parts.len(), 3);
    }

    /// Decode and re-encode a simple script to verify roundtrip fidelity.
    #[test]
    fn test_decode_and_encode_roundtrip() {
        let script_hex = "05000102030401FF02ABCD";
        let bytes = hex::decode(script_hex).expect("valid hex");
        let parts = decode_script(&bytes).expect("should decode");
        assert_eq!(parts.len(), 3);

        let data_parts: Vec<&[u8]> = parts.iter().filter_map(|p| p.data.as_deref()).collect();
        let encoded = encode_push_datas(&data_parts).expect("should encode");
        assert_eq!(hex::encode(&encoded), script_hex.to_lowercase());
    }

    /// Decode an empty byte slice returns an empty chunk vector.
    #[test]
    fn test_decode_script_empty() {
        let parts = decode_script(&[]).expect("should decode");
        assert!(parts.is_empty());
    }

    /// OP_0 decodes as a plain opcode chunk without payload.
    #[test]
    fn test_decode_script_op_0() {
        let parts = decode_script(&[OP_0, OP_DUP]).expect("should decode");
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], ScriptChunk { op: OP_0, data: None });
        assert_eq!(parts[1], ScriptChunk { op: OP_DUP, data: None });
    }

    /// OP_RETURN decodes as a single opcode; the bytes after it are parsed
    /// as operations in their own right, as the interpreter would see them.
    #[test]
    fn test_decode_script_op_return_does_not_consume() {
        let bytes = [OP_RETURN, 0x02, 0xAA, 0xBB, OP_CAT];
        let parts = decode_script(&bytes).expect("should decode");
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].op, OP_RETURN);
        assert_eq!(parts[1].data.as_deref(), Some(&[0xAA, 0xBB][..]));
        assert_eq!(parts[2].op, OP_CAT);
    }

    // -----------------------------------------------------------------------
    // decode_script - error / truncation cases
    // -----------------------------------------------------------------------

    /// A truncated direct-push script returns DataTooSmall.
    #[test]
    fn test_decode_script_bad_parts() {
        // 0x05 says "push 5 bytes" but only 3 bytes follow
        let bytes = hex::decode("05000000").expect("valid hex");
        assert!(decode_script(&bytes).is_err());
    }

    /// A truncated OP_PUSHDATA1 script returns DataTooSmall.
    #[test]
    fn test_decode_script_invalid_pushdata1() {
        // OP_PUSHDATA1 claims 5 bytes but only 4 follow
        let bytes = hex::decode("4c05000000").expect("valid hex");
        assert!(decode_script(&bytes).is_err());
    }

    /// OP_PUSHDATA1 with a valid data payload decodes correctly.
    #[test]
    fn test_decode_script_pushdata1_valid() {
        let data = b"testing";
        let mut script_bytes = vec![OP_PUSHDATA1, data.len() as u8];
        script_bytes.extend_from_slice(data);
        let parts = decode_script(&script_bytes).expect("should decode");
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].op, OP_PUSHDATA1);
        assert_eq!(parts[0].data.as_ref().unwrap(), data);
    }

    /// Each PUSHDATA opcode without its length bytes returns an error.
    #[test]
    fn test_decode_script_pushdata_missing_length() {
        assert!(decode_script(&[OP_PUSHDATA1]).is_err());
        assert!(decode_script(&[OP_PUSHDATA2]).is_err());
        assert!(decode_script(&[OP_PUSHDATA2, 0x01]).is_err());
        assert!(decode_script(&[OP_PUSHDATA4]).is_err());
        assert!(decode_script(&[OP_PUSHDATA4, 0x01, 0x00, 0x00]).is_err());
    }

    /// OP_PUSHDATA2 whose declared length exceeds the remaining bytes fails.
    #[test]
    fn test_decode_script_pushdata2_too_small() {
        let mut script_bytes = vec![OP_PUSHDATA2, 0xFF, 0x00];
        script_bytes.extend_from_slice(&[0u8; 16]);
        assert!(decode_script(&script_bytes).is_err());
    }

    // -----------------------------------------------------------------------
    // push_data_prefix boundary tests
    // -----------------------------------------------------------------------

    /// push_data_prefix returns a 1-byte prefix for data <= 75 bytes.
    #[test]
    fn test_push_data_prefix_small() {
        assert_eq!(push_data_prefix(20).expect("should succeed"), vec![20u8]);
        assert_eq!(push_data_prefix(75).expect("should succeed"), vec![75u8]);
    }

    /// push_data_prefix returns OP_PUSHDATA1 prefix for 76..=255 bytes.
    #[test]
    fn test_push_data_prefix_pushdata1() {
        assert_eq!(
            push_data_prefix(76).expect("should succeed"),
            vec![OP_PUSHDATA1, 76]
        );
        assert_eq!(
            push_data_prefix(255).expect("should succeed"),
            vec![OP_PUSHDATA1, 255]
        );
    }

    /// push_data_prefix returns OP_PUSHDATA2 prefix for 256..=65535 bytes.
    #[test]
    fn test_push_data_prefix_pushdata2() {
        assert_eq!(
            push_data_prefix(256).expect("should succeed"),
            vec![OP_PUSHDATA2, 0x00, 0x01]
        );
        assert_eq!(
            push_data_prefix(65535).expect("should succeed"),
            vec![OP_PUSHDATA2, 0xFF, 0xFF]
        );
    }

    /// push_data_prefix returns OP_PUSHDATA4 prefix for 65536+ bytes.
    #[test]
    fn test_push_data_prefix_pushdata4() {
        assert_eq!(
            push_data_prefix(65536).expect("should succeed"),
            vec![OP_PUSHDATA4, 0x00, 0x00, 0x01, 0x00]
        );
    }

    // -----------------------------------------------------------------------
    // encode_push_datas
    // -----------------------------------------------------------------------

    /// encode_push_datas concatenates multiple pushes correctly.
    #[test]
    fn test_encode_push_datas_multiple() {
        let parts: Vec<&[u8]> = vec![b"hello", b"world"];
        let encoded = encode_push_datas(&parts).expect("should encode");
        let expected = hex::decode("0568656c6c6f05776f726c64").expect("valid hex");
        assert_eq!(encoded, expected);
    }

    /// encode_push_datas with an empty parts list returns empty bytes.
    #[test]
    fn test_encode_push_datas_empty() {
        let parts: Vec<&[u8]> = vec![];
        let encoded = encode_push_datas(&parts).expect("should encode");
        assert!(encoded.is_empty());
    }

    // -----------------------------------------------------------------------
    // ScriptChunk::to_asm_string
    // -----------------------------------------------------------------------

    /// A data-push chunk renders as hex in ASM output.
    #[test]
    fn test_chunk_to_asm_string_data() {
        let chunk = ScriptChunk {
            op: OP_DATA_20,
            data: Some(vec![0xAB; 20]),
        };
        assert_eq!(chunk.to_asm_string(), "ab".repeat(20));
    }

    /// A non-push opcode chunk renders as its OP_xxx name.
    #[test]
    fn test_chunk_to_asm_string_opcode() {
        let chunk = ScriptChunk { op: OP_DUP, data: None };
        assert_eq!(chunk.to_asm_string(), "OP_DUP");
    }
}
