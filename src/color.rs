//! Hex color parsing for style values.
//!
//! Only `#rgb` and `#rrggbb` are accepted. Named colors and
//! `rgb(...)` forms are rejected so that style authoring mistakes
//! surface as errors instead of a silently picked default.

use palette::Srgba;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    #[error("expected a hex color starting with '#'")]
    MissingHash,
    #[error("expected 3 or 6 hex digits but found {len}")]
    BadLength { len: usize },
    #[error("'{0}' is not a hex digit")]
    BadDigit(char),
}

/// Parses a `#rgb` or `#rrggbb` string.
pub fn parse_hex_color(s: &str) -> Result<Srgba<u8>, ColorParseError> {
    let digits = s.trim().strip_prefix('#').ok_or(ColorParseError::MissingHash)?;

    let mut values = Vec::with_capacity(6);
    for c in digits.chars() {
        let value = c.to_digit(16).ok_or(ColorParseError::BadDigit(c))?;
        values.push(value as u8);
    }

    let [r, g, b] = match *values.as_slice() {
        [r, g, b] => [r * 17, g * 17, b * 17],
        [r1, r2, g1, g2, b1, b2] => [r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2],
        _ => return Err(ColorParseError::BadLength { len: values.len() }),
    };
    Ok(Srgba::new(r, g, b, u8::MAX))
}

/// Parses a hex color into its numeric `0xRRGGBB` form.
pub fn parse_hex_number(s: &str) -> Result<u32, ColorParseError> {
    parse_hex_color(s).map(to_hex_number)
}

/// Packs a color into `0xRRGGBB`, dropping alpha.
pub fn to_hex_number(color: Srgba<u8>) -> u32 {
    (u32::from(color.red) << 16) | (u32::from(color.green) << 8) | u32::from(color.blue)
}
