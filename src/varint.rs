// Compact variable-length integer encoding.
//
// The first byte is either the value itself (0x00..=0xFC) or a length tag:
// 0xFD introduces a little-endian u16, 0xFE a little-endian u32, 0xFF a
// little-endian u64. Self-delimiting, so records need no explicit length
// prefix for their integer fields.
//
// The encoder only ever emits the 1-, 3- and 5-byte forms (all command
// stream integers fit in 32 bits); the decoder also accepts the 9-byte
// form and rejects values that do not fit in a u32.

/// Tag byte introducing a 2-byte little-endian follow-on.
const TAG_U16: u8 = 0xFD;
/// Tag byte introducing a 4-byte little-endian follow-on.
const TAG_U32: u8 = 0xFE;
/// Tag byte introducing an 8-byte little-endian follow-on.
const TAG_U64: u8 = 0xFF;

/// Largest value that fits inline in the first byte.
const INLINE_MAX: u32 = 0xFC;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Append the compact encoding of `v` to `out`. Writes 1, 3 or 5 bytes.
#[inline]
pub fn encode_u32(v: u32, out: &mut Vec<u8>) {
    if v <= INLINE_MAX {
        out.push(v as u8);
    } else if v <= 0xFFFF {
        out.push(TAG_U16);
        out.extend_from_slice(&(v as u16).to_le_bytes());
    } else {
        out.push(TAG_U32);
        out.extend_from_slice(&v.to_le_bytes());
    }
}

/// Encoded byte-length of `v`.
///
/// The encoder uses this to price a copy command against the literal
/// bytes it would replace.
#[inline]
pub fn sizeof_u32(v: u32) -> usize {
    if v <= INLINE_MAX {
        1
    } else if v <= 0xFFFF {
        3
    } else {
        5
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a compact integer from the front of `data`.
/// Returns `(value, bytes_consumed)`.
pub fn read_u32(data: &[u8]) -> Result<(u32, usize), VarintError> {
    let &first = data.first().ok_or(VarintError::Underflow)?;
    match first {
        TAG_U16 => {
            let rest = data.get(1..3).ok_or(VarintError::Underflow)?;
            let v = u16::from_le_bytes([rest[0], rest[1]]);
            Ok((v as u32, 3))
        }
        TAG_U32 => {
            let rest = data.get(1..5).ok_or(VarintError::Underflow)?;
            let v = u32::from_le_bytes([rest[0], rest[1], rest[2], rest[3]]);
            Ok((v, 5))
        }
        TAG_U64 => {
            let rest = data.get(1..9).ok_or(VarintError::Underflow)?;
            let mut raw = [0u8; 8];
            raw.copy_from_slice(rest);
            let v = u64::from_le_bytes(raw);
            let v = u32::try_from(v).map_err(|_| VarintError::Overflow)?;
            Ok((v, 9))
        }
        inline => Ok((inline as u32, 1)),
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarintError {
    /// Not enough input bytes to complete the integer.
    Underflow,
    /// Value does not fit in a u32.
    Overflow,
}

impl std::fmt::Display for VarintError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VarintError::Underflow => write!(f, "varint underflow (truncated input)"),
            VarintError::Overflow => write!(f, "varint overflow"),
        }
    }
}

impl std::error::Error for VarintError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
