use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    color::parse_hex_number, font::FontMetrics, rect::Rect, text::layout::LayoutError, TextStyle,
};

/// Lines drawn along a run of text. Any combination may be set.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TextDecoration {
    pub underline: bool,
    pub overline: bool,
    pub line_through: bool,
}

impl TextDecoration {
    pub const NONE: TextDecoration = TextDecoration {
        underline: false,
        overline: false,
        line_through: false,
    };

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn contains(self, kind: DecorationKind) -> bool {
        match kind {
            DecorationKind::Underline => self.underline,
            DecorationKind::Overline => self.overline,
            DecorationKind::LineThrough => self.line_through,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown text decoration `{0}`")]
pub struct UnknownDecoration(String);

/// Parses a space separated list such as `"underline line-through"`.
impl FromStr for TextDecoration {
    type Err = UnknownDecoration;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut decoration = TextDecoration::NONE;
        for word in s.split_whitespace() {
            match word {
                "none" => {}
                "underline" => decoration.underline = true,
                "overline" => decoration.overline = true,
                "line-through" | "lineThrough" => decoration.line_through = true,
                other => return Err(UnknownDecoration(other.to_owned())),
            }
        }
        Ok(decoration)
    }
}

impl TryFrom<String> for TextDecoration {
    type Error = UnknownDecoration;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TextDecoration> for String {
    fn from(decoration: TextDecoration) -> Self {
        decoration.to_string()
    }
}

impl fmt::Display for TextDecoration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return f.write_str("none");
        }
        let mut first = true;
        for kind in DecorationKind::ALL {
            if self.contains(kind) {
                if !first {
                    f.write_str(" ")?;
                }
                write!(f, "{}", kind)?;
                first = false;
            }
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DecorationKind {
    Underline,
    Overline,
    LineThrough,
}

impl DecorationKind {
    pub const ALL: [DecorationKind; 3] = [
        DecorationKind::Underline,
        DecorationKind::Overline,
        DecorationKind::LineThrough,
    ];
}

impl fmt::Display for DecorationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DecorationKind::Underline => "underline",
            DecorationKind::Overline => "overline",
            DecorationKind::LineThrough => "line-through",
        })
    }
}

/// A decoration line ready to be drawn as a filled rectangle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TextDecorationMetrics {
    pub kind: DecorationKind,
    pub bounds: Rect,
    /// `0xRRGGBB`
    pub color: u32,
}

struct LineStyle<'a> {
    color: Option<&'a str>,
    thickness: Option<f32>,
    offset: Option<f32>,
}

fn line_style(style: &TextStyle, kind: DecorationKind) -> LineStyle<'_> {
    match kind {
        DecorationKind::Underline => LineStyle {
            color: style.underline_color.as_deref(),
            thickness: style.underline_thickness,
            offset: style.underline_offset,
        },
        DecorationKind::Overline => LineStyle {
            color: style.overline_color.as_deref(),
            thickness: style.overline_thickness,
            offset: style.overline_offset,
        },
        DecorationKind::LineThrough => LineStyle {
            color: style.line_through_color.as_deref(),
            thickness: style.line_through_thickness,
            offset: style.line_through_offset,
        },
    }
}

/// Computes the decoration lines of a token from its final bounds.
///
/// Underlines sit on the baseline, overlines at the top of the token and
/// line-throughs halfway up the ascent. Offsets move a line down.
pub fn decorations_for(
    style: &TextStyle,
    bounds: Rect,
    font: &FontMetrics,
) -> Result<Vec<TextDecorationMetrics>, LayoutError> {
    let decoration = match style.text_decoration {
        Some(decoration) if !decoration.is_none() => decoration,
        _ => return Ok(Vec::new()),
    };

    let mut lines = Vec::new();
    for kind in DecorationKind::ALL {
        if !decoration.contains(kind) {
            continue;
        }
        let line = line_style(style, kind);

        let color = match line
            .color
            .or(style.decoration_color.as_deref())
            .or(style.fill.as_deref())
        {
            Some(color) => {
                parse_hex_number(color).map_err(|source| LayoutError::DecorationColor {
                    kind,
                    color: color.into(),
                    source,
                })?
            }
            None => 0x000000,
        };
        let thickness = line.thickness.or(style.decoration_thickness).unwrap_or(1.);
        let y = match kind {
            DecorationKind::Underline => bounds.y() + font.ascent,
            DecorationKind::Overline => bounds.y(),
            DecorationKind::LineThrough => bounds.y() + font.ascent / 2.,
        } + line.offset.unwrap_or(0.);

        lines.push(TextDecorationMetrics {
            kind,
            bounds: Rect::from_xywh(bounds.x(), y, bounds.width(), thickness),
            color,
        });
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> FontMetrics {
        FontMetrics {
            font_size: 10.,
            ascent: 8.,
            descent: 2.,
        }
    }

    #[test]
    fn parse_and_display() {
        let decoration: TextDecoration = "line-through underline".parse().unwrap();
        assert!(decoration.underline && decoration.line_through && !decoration.overline);
        assert_eq!(decoration.to_string(), "underline line-through");
        assert_eq!(TextDecoration::NONE.to_string(), "none");
        assert!("blink".parse::<TextDecoration>().is_err());
    }

    #[test]
    fn underline_on_baseline() {
        let style = TextStyle {
            text_decoration: Some("underline".parse().unwrap()),
            fill: Some("#FF0000".into()),
            ..Default::default()
        };
        let lines = decorations_for(&style, Rect::from_xywh(5., 20., 30., 10.), &metrics()).unwrap();
        assert_eq!(
            lines,
            vec![TextDecorationMetrics {
                kind: DecorationKind::Underline,
                bounds: Rect::from_xywh(5., 28., 30., 1.),
                color: 0xFF0000,
            }]
        );
    }

    #[test]
    fn specific_settings_win() {
        let style = TextStyle {
            text_decoration: Some("overline line-through".parse().unwrap()),
            fill: Some("#FF0000".into()),
            decoration_color: Some("#00FF00".into()),
            decoration_thickness: Some(2.),
            line_through_color: Some("#0000FF".into()),
            overline_offset: Some(-1.),
            ..Default::default()
        };
        let lines = decorations_for(&style, Rect::from_xywh(0., 0., 10., 10.), &metrics()).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].kind, DecorationKind::Overline);
        assert_eq!(lines[0].color, 0x00FF00);
        assert_eq!(lines[0].bounds, Rect::from_xywh(0., -1., 10., 2.));
        assert_eq!(lines[1].kind, DecorationKind::LineThrough);
        assert_eq!(lines[1].color, 0x0000FF);
        assert_eq!(lines[1].bounds.y(), 4.);
    }

    #[test]
    fn defaults_to_black() {
        let style = TextStyle {
            text_decoration: Some("underline".parse().unwrap()),
            ..Default::default()
        };
        let lines = decorations_for(&style, Rect::default(), &metrics()).unwrap();
        assert_eq!(lines[0].color, 0);
    }

    #[test]
    fn named_colors_are_rejected() {
        let style = TextStyle {
            text_decoration: Some("underline".parse().unwrap()),
            fill: Some("blue".into()),
            ..Default::default()
        };
        let err = decorations_for(&style, Rect::default(), &metrics()).unwrap_err();
        assert!(matches!(err, LayoutError::DecorationColor { kind: DecorationKind::Underline, .. }));
    }
}
