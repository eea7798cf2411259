//! JSON text helpers shared by the encoder and decoder.

use super::error::DecodeError;

/// Formats a finite number as a JSON number literal.
///
/// Integral values below `1e21` print without a fraction (`5`, `-10`).
/// Everything else uses the shortest round-trip form, switching to exponent
/// notation outside `[1e-6, 1e21)`.
pub fn format_number(n: f64) -> String {
    debug_assert!(n.is_finite());
    let abs = n.abs();
    if abs != 0.0 && !(1e-6..1e21).contains(&abs) {
        format!("{n:e}")
    } else {
        // `Display` never uses exponent notation and drops a zero fraction.
        format!("{n}")
    }
}

/// Whitespace allowed between JSON tokens.
#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// Finds the closing `"` of a JSON string whose contents start at `x`.
///
/// Returns the index of the closing quote and whether any escape sequence
/// was seen. Raw control characters and unterminated strings are rejected;
/// escape sequences themselves are validated when the string is decoded.
pub fn scan_string(data: &[u8], mut x: usize) -> Result<(usize, bool), DecodeError> {
    let len = data.len();
    let mut escaped = false;
    while x < len {
        match data[x] {
            b'"' => return Ok((x, escaped)),
            b'\\' => {
                escaped = true;
                x += 2;
            }
            b if b < 0x20 => return Err(DecodeError::at(x)),
            _ => x += 1,
        }
    }
    Err(DecodeError::at(len))
}
