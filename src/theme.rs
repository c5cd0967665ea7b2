//! Row colours for the article list.
//!
//! Colours are stored the way the settings store keeps them: one packed
//! 32-bit ARGB integer per key. `RowStyle` pairs a background with a text
//! colour and converts to a ratatui `Style` only at draw time, so the mapping
//! from read-state to colours stays independent of the terminal backend.

use ratatui::style::{Color, Style};
use std::fmt;

// ============================================================================
// Argb
// ============================================================================

/// Packed `0xAARRGGBB` colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Argb(pub u32);

impl Argb {
    pub const WHITE: Argb = Argb(0xFFFF_FFFF);
    pub const BLACK: Argb = Argb(0xFF00_0000);

    /// Reinterpret a stored setting as a colour.
    ///
    /// Negative values are accepted; `-1` is opaque white, as in signed
    /// 32-bit colour ints.
    pub fn from_setting(value: i64) -> Self {
        Argb(value as u32)
    }

    /// Integer form written to the settings store.
    pub fn to_setting(self) -> i64 {
        i64::from(self.0)
    }

    /// Parse user input: `#RRGGBB`, `#AARRGGBB`, `0xAARRGGBB`, or a decimal
    /// (possibly negative) integer.
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if !is_hex(hex) {
                return None;
            }
            return match hex.len() {
                6 => u32::from_str_radix(hex, 16).ok().map(|rgb| Argb(0xFF00_0000 | rgb)),
                8 => u32::from_str_radix(hex, 16).ok().map(Argb),
                _ => None,
            };
        }
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            if !is_hex(hex) {
                return None;
            }
            return u32::from_str_radix(hex, 16).ok().map(Argb);
        }
        s.parse::<i64>()
            .ok()
            .filter(|v| *v >= i64::from(i32::MIN) && *v <= i64::from(u32::MAX))
            .map(Self::from_setting)
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        let [_, r, g, b] = self.0.to_be_bytes();
        (r, g, b)
    }

    pub fn to_color(self) -> Color {
        let (r, g, b) = self.rgb();
        Color::Rgb(r, g, b)
    }
}

/// Digits only; `from_str_radix` alone would also take a leading sign.
fn is_hex(digits: &str) -> bool {
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

impl fmt::Display for Argb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.0)
    }
}

// ============================================================================
// Row Style
// ============================================================================

/// Background and text colour for one list row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowStyle {
    pub background: Argb,
    pub text: Argb,
}

impl RowStyle {
    /// Fallback for read rows with no recorded preference.
    pub const READ_DEFAULT: RowStyle = RowStyle {
        background: Argb::WHITE,
        text: Argb::BLACK,
    };

    /// Fallback for unread rows with no recorded preference.
    pub const UNREAD_DEFAULT: RowStyle = RowStyle {
        background: Argb::BLACK,
        text: Argb::WHITE,
    };

    pub fn to_style(self) -> Style {
        Style::default()
            .bg(self.background.to_color())
            .fg(self.text.to_color())
    }
}

// ============================================================================
// Tests
// ============================================================================
