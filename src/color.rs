use serde::{Deserialize, Serialize};

use crate::error::{RayfanError, RayfanResult};

/// Straight (non-premultiplied) 8-bit RGB color. One palette entry per stripe.
///
/// Serializes as a `"#rrggbb"` string so palettes in config files read the
/// same way they do in the embedding markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses a `#rrggbb` string (case-insensitive digits, `#` required).
    pub fn from_hex(s: &str) -> RayfanResult<Self> {
        let digits = s.strip_prefix('#').ok_or_else(|| {
            RayfanError::validation(format!("hex color \"{s}\" must start with '#'"))
        })?;
        // Byte length alone is not enough: a multi-byte char could land a
        // slice boundary mid-character. Six ASCII hex digits or nothing.
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(RayfanError::validation(format!(
                "hex color \"{s}\" must be #rrggbb"
            )));
        }

        fn hex_byte(pair: &str) -> RayfanResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| RayfanError::validation(format!("invalid hex byte \"{pair}\"")))
        }

        Ok(Self {
            r: hex_byte(&digits[0..2])?,
            g: hex_byte(&digits[2..4])?,
            b: hex_byte(&digits[4..6])?,
        })
    }

    /// Infallible converter for trusted palettes: assumes a well-formed
    /// `#rrggbb` string and substitutes 0 for any channel it cannot read.
    pub fn from_hex_lossy(s: &str) -> Self {
        let digits = s.strip_prefix('#').unwrap_or(s);
        let byte = |range: std::ops::Range<usize>| {
            digits
                .get(range)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .unwrap_or(0)
        };
        Self {
            r: byte(0..2),
            g: byte(2..4),
            b: byte(4..6),
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Premultiplied RGBA8 pixel at the given alpha (clamped to 0..1).
    pub fn premul(self, alpha: f64) -> [u8; 4] {
        let a = alpha.clamp(0.0, 1.0);
        let mul = |c: u8| (f64::from(c) * a).round() as u8;
        [
            mul(self.r),
            mul(self.g),
            mul(self.b),
            (a * 255.0).round() as u8,
        ]
    }
}

impl Serialize for Rgb8 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
