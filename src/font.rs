//! Font properties and text measurement.
//!
//! Glyph metrics come from outside this crate: implement [`Measurer`]
//! on top of whatever font stack draws the text. [`MonospaceMeasurer`]
//! is a dependency-free implementation useful for tests and terminals.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::TextStyle;

/// A font weight, indicating how dark it appears.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Weight {
    Thin,
    ExtraLight,
    Light,
    Normal,
    Medium,
    SemiBold,
    Bold,
    ExtraBold,
    Black,
}

impl Default for Weight {
    fn default() -> Self {
        Self::Normal
    }
}

impl Weight {
    /// The CSS numeric weight (100-900).
    pub fn to_number(self) -> u16 {
        match self {
            Weight::Thin => 100,
            Weight::ExtraLight => 200,
            Weight::Light => 300,
            Weight::Normal => 400,
            Weight::Medium => 500,
            Weight::SemiBold => 600,
            Weight::Bold => 700,
            Weight::ExtraBold => 800,
            Weight::Black => 900,
        }
    }

    /// Parses a weight name or a CSS number (rounded to the nearest hundred).
    pub fn parse(s: &str) -> Option<Self> {
        let weight = match s.trim() {
            "thin" => Weight::Thin,
            "extraLight" => Weight::ExtraLight,
            "light" => Weight::Light,
            "normal" => Weight::Normal,
            "medium" => Weight::Medium,
            "semiBold" => Weight::SemiBold,
            "bold" => Weight::Bold,
            "extraBold" => Weight::ExtraBold,
            "black" => Weight::Black,
            number => match number.parse::<u16>().ok()?.saturating_add(50) / 100 {
                0 | 1 => Weight::Thin,
                2 => Weight::ExtraLight,
                3 => Weight::Light,
                4 => Weight::Normal,
                5 => Weight::Medium,
                6 => Weight::SemiBold,
                7 => Weight::Bold,
                8 => Weight::ExtraBold,
                _ => Weight::Black,
            },
        };
        Some(weight)
    }
}

/// Font style: normal or italic. We do not support
/// oblique fonts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FontStyle {
    Normal,
    Italic,
}

impl Default for FontStyle {
    fn default() -> Self {
        Self::Normal
    }
}

/// Vertical font metrics of a measured token, in pixels.
///
/// `ascent` is the distance from the top of the token to its baseline.
/// Both `ascent` and `descent` are positive.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct FontMetrics {
    pub font_size: f32,
    pub ascent: f32,
    pub descent: f32,
}

/// The result of measuring a run of text in a given style.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct TextMeasurement {
    pub width: f32,
    pub height: f32,
    pub metrics: FontMetrics,
}

/// Measures text. This is the only way layout learns about glyph sizes.
///
/// Implementations that cannot measure yet (e.g. the font is still
/// loading) should return zero sizes; the text is expected to be
/// laid out again once the font is available.
pub trait Measurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMeasurement;
}

impl<M: Measurer + ?Sized> Measurer for &M {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMeasurement {
        (**self).measure(text, style)
    }
}

impl<M: Measurer + ?Sized> Measurer for Box<M> {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMeasurement {
        (**self).measure(text, style)
    }
}

/// Gives every grapheme cluster the same advance.
///
/// All values are fractions of the font size.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MonospaceMeasurer {
    pub advance: f32,
    pub ascent: f32,
    pub descent: f32,
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self {
            advance: 0.5,
            ascent: 0.8,
            descent: 0.2,
        }
    }
}

impl Measurer for MonospaceMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMeasurement {
        let font_size = style.font_size_or_default();
        let letter_spacing = style.letter_spacing.unwrap_or(0.);
        let clusters = text.graphemes(true).count() as f32;

        let ascent = font_size * self.ascent;
        let descent = font_size * self.descent;
        TextMeasurement {
            width: clusters * (font_size * self.advance + letter_spacing),
            height: ascent + descent,
            metrics: FontMetrics {
                font_size,
                ascent,
                descent,
            },
        }
    }
}
