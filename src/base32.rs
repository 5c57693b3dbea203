//! RFC-4648 Base32 codec for authenticator secrets.
//!
//! Encoding emits no padding character. Decoding is deliberately lenient so
//! hand-typed keys survive spaces, hyphens and lowercase: foreign symbols
//! are skipped and trailing bits that do not complete a byte are dropped.
//! The dropped bits are exactly the encode-side padding, so
//! `decode(encode(b)) == b` for any byte sequence. Leniency here eases
//! manual entry; it is not a security control.

const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Encode raw bytes into unpadded Base32 text.
pub fn encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(5) * 8);
    let mut buffer: u64 = 0;
    let mut bits: u32 = 0;

    for &byte in data {
        buffer = (buffer << 8) | u64::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
    }

    if bits > 0 {
        // Last symbol carries the remaining bits, left-aligned.
        out.push(ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }

    out
}

/// Decode Base32 text back into bytes.
///
/// Never fails: garbage input simply degrades to fewer (possibly zero)
/// bytes, which downstream code validation treats as "reject everything".
pub fn decode(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;

    for symbol in text.bytes() {
        let Some(value) = symbol_value(symbol) else {
            continue;
        };
        buffer = (buffer << 5) | u32::from(value);
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
        }
    }

    out
}

fn symbol_value(symbol: u8) -> Option<u8> {
    match symbol.to_ascii_uppercase() {
        s @ b'A'..=b'Z' => Some(s - b'A'),
        s @ b'2'..=b'7' => Some(s - b'2' + 26),
        _ => None,
    }
}
