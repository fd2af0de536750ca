//! Hexadecimal helpers for rendering and parsing digests.

/// Converts bytes to a lowercase hexadecimal string.
pub fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut out, byte| {
            out.push_str(&format!("{byte:02x}"));
            out
        })
}

/// Converts a hexadecimal string to bytes.
///
/// Returns `None` if the string has an odd length or contains a non-hex character.
pub fn from_hex(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    hex.as_bytes()
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).ok()?;
            u8::from_str_radix(pair, 16).ok()
        })
        .collect()
}

/// Converts a hexadecimal string to bytes, ignoring whitespace and an optional `0x` prefix.
/// Used to embed published test vectors verbatim.
pub fn from_hex_formatted(hex: &str) -> Option<Vec<u8>> {
    let compact: String = hex.chars().filter(|c| !c.is_whitespace()).collect();
    from_hex(compact.strip_prefix("0x").unwrap_or(&compact))
}
