//! Variable-length integer prefix used by scripts and serialized items.
//!
//! | First byte | Value |
//! |---|---|
//! | `< 0xFD` | the byte itself |
//! | `0xFD` | next 2 bytes, little-endian |
//! | `0xFE` | next 4 bytes, little-endian |
//! | `0xFF` | next 8 bytes, little-endian |

/// Marker for a 2-byte value
pub const PREFIX_U16: u8 = 0xFD;
/// Marker for a 4-byte value
pub const PREFIX_U32: u8 = 0xFE;
/// Marker for an 8-byte value
pub const PREFIX_U64: u8 = 0xFF;

/// Number of bytes `value` occupies once encoded
pub fn encoded_len(value: u64) -> usize {
    if value < PREFIX_U16 as u64 {
        1
    } else if value <= u16::MAX as u64 {
        3
    } else if value <= u32::MAX as u64 {
        5
    } else {
        9
    }
}

/// Append the encoding of `value` to `out`
pub fn write(value: u64, out: &mut Vec<u8>) {
    if value < PREFIX_U16 as u64 {
        out.push(value as u8);
    } else if value <= u16::MAX as u64 {
        out.push(PREFIX_U16);
        out.extend_from_slice(&(value as u16).to_le_bytes());
    } else if value <= u32::MAX as u64 {
        out.push(PREFIX_U32);
        out.extend_from_slice(&(value as u32).to_le_bytes());
    } else {
        out.push(PREFIX_U64);
        out.extend_from_slice(&value.to_le_bytes());
    }
}

/// Decode a value from the start of `bytes`.
///
/// Returns the value and the number of bytes consumed, or `None` if `bytes`
/// ends before the encoding does.
///
/// # Examples
///
/// ```
/// use core_types::varint;
///
/// assert_eq!(varint::read(&[0x10]), Some((0x10, 1)));
/// assert_eq!(varint::read(&[0xFD, 0xE8, 0x03]), Some((1000, 3)));
/// assert_eq!(varint::read(&[0xFD, 0xE8]), None);
/// ```
pub fn read(bytes: &[u8]) -> Option<(u64, usize)> {
    let (&first, rest) = bytes.split_first()?;
    match first {
        PREFIX_U16 => {
            let raw = rest.get(..2)?;
            Some((u16::from_le_bytes([raw[0], raw[1]]) as u64, 3))
        }
        PREFIX_U32 => {
            let raw: [u8; 4] = rest.get(..4)?.try_into().ok()?;
            Some((u32::from_le_bytes(raw) as u64, 5))
        }
        PREFIX_U64 => {
            let raw: [u8; 8] = rest.get(..8)?.try_into().ok()?;
            Some((u64::from_le_bytes(raw), 9))
        }
        small => Some((small as u64, 1)),
    }
}
