//! Table-driven base64 codec for inline data URIs.
//!
//! Only the standard alphabet (`A-Z a-z 0-9 + /` with optional `=` padding)
//! is supported, which is all the data-URI grammar admits. Trailing
//! characters outside the alphabet (padding, whitespace) are trimmed before
//! decoding; a non-alphabet character anywhere else is an error.

use crate::util::{Error, Result};

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// 256-entry reverse lookup table. 0xFF marks bytes outside the alphabet.
const DECODE_TABLE: [u8; 256] = {
    let mut table = [0xFFu8; 256];
    let mut i = 0;
    while i < 64 {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Decode a base64 string into bytes.
///
/// Processes 4-character groups into 3 output bytes. A final partial group
/// of 2 or 3 characters yields 1 or 2 bytes; unused output bytes are never
/// emitted, so decoded length is exact for inputs of any length.
pub fn decode(input: &str) -> Result<Vec<u8>> {
    let bytes = trim_trailing(input.as_bytes());
    let mut out = Vec::with_capacity(bytes.len() / 4 * 3 + 3);

    for group in bytes.chunks(4) {
        let mut acc = [0u8; 4];
        for (i, &b) in group.iter().enumerate() {
            let v = DECODE_TABLE[b as usize];
            if v == 0xFF {
                return Err(Error::InvalidBase64(b));
            }
            acc[i] = v;
        }

        let n = ((acc[0] as u32) << 18)
            | ((acc[1] as u32) << 12)
            | ((acc[2] as u32) << 6)
            | (acc[3] as u32);

        // A group of k characters carries k-1 payload bytes (k >= 2).
        match group.len() {
            4 => out.extend_from_slice(&[(n >> 16) as u8, (n >> 8) as u8, n as u8]),
            3 => out.extend_from_slice(&[(n >> 16) as u8, (n >> 8) as u8]),
            2 => out.push((n >> 16) as u8),
            _ => return Err(Error::InvalidBase64(group[0])),
        }
    }

    Ok(out)
}

/// Encode bytes as base64 with `=` padding.
pub fn encode(input: &[u8]) -> String {
    let mut out = String::with_capacity(input.len().div_ceil(3) * 4);

    for group in input.chunks(3) {
        let b0 = group[0] as u32;
        let b1 = group.get(1).copied().unwrap_or(0) as u32;
        let b2 = group.get(2).copied().unwrap_or(0) as u32;
        let n = (b0 << 16) | (b1 << 8) | b2;

        out.push(ALPHABET[(n >> 18) as usize & 0x3F] as char);
        out.push(ALPHABET[(n >> 12) as usize & 0x3F] as char);
        if group.len() > 1 {
            out.push(ALPHABET[(n >> 6) as usize & 0x3F] as char);
        } else {
            out.push('=');
        }
        if group.len() > 2 {
            out.push(ALPHABET[n as usize & 0x3F] as char);
        } else {
            out.push('=');
        }
    }

    out
}

/// Strip trailing bytes outside the base64 alphabet (padding, newlines).
fn trim_trailing(mut bytes: &[u8]) -> &[u8] {
    while let Some(&last) = bytes.last() {
        if DECODE_TABLE[last as usize] == 0xFF {
            bytes = &bytes[..bytes.len() - 1];
        } else {
            break;
        }
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_known_vectors() {
        assert_eq!(decode("SGVsbG8=").unwrap(), b"Hello");
        assert_eq!(decode("SGVsbG8gV29ybGQ=").unwrap(), b"Hello World");
        assert_eq!(decode("").unwrap(), b"");
        assert_eq!(decode("AA==").unwrap(), [0u8]);
    }

    #[test]
    fn test_decode_without_padding() {
        assert_eq!(decode("SGVsbG8").unwrap(), b"Hello");
        assert_eq!(decode("SGk").unwrap(), b"Hi");
    }

    #[test]
    fn test_roundtrip_all_lengths() {
        // Lengths not a multiple of 3 exercise the partial final group.
        let data: Vec<u8> = (0u16..=255).map(|b| b as u8).collect();
        for len in 0..data.len() {
            let encoded = encode(&data[..len]);
            let decoded = decode(&encoded).unwrap();
            assert_eq!(decoded, &data[..len], "length {len}");
        }
    }

    #[test]
    fn test_trailing_noise_trimmed() {
        assert_eq!(decode("SGVsbG8=\n").unwrap(), b"Hello");
        assert_eq!(decode("SGVsbG8==").unwrap(), b"Hello");
    }

    #[test]
    fn test_invalid_character_rejected() {
        assert!(matches!(decode("SG#sbG8="), Err(Error::InvalidBase64(b'#'))));
    }
}
