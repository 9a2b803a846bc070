//! Human readable dumps of laid out text, for inspecting layout problems.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::{
    rect::Rect,
    text::{bounds_nested, FinalToken, ParagraphToken, TokenContent},
};

/// What [`describe`] prints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DebugConfig {
    pub show_tags: bool,
    pub show_bounds: bool,
    /// Font size, ascent and descent of each token.
    pub show_metrics: bool,
    pub show_baselines: bool,
    /// Also list whitespace and newline tokens.
    pub show_whitespace: bool,
    /// Digits after the decimal point.
    pub precision: usize,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            show_tags: true,
            show_bounds: true,
            show_metrics: false,
            show_baselines: false,
            show_whitespace: true,
            precision: 1,
        }
    }
}

fn write_rect(out: &mut String, rect: Rect, precision: usize) {
    let _ = write!(
        out,
        " @ {:.p$},{:.p$} {:.p$}x{:.p$}",
        rect.x(),
        rect.y(),
        rect.width(),
        rect.height(),
        p = precision
    );
}

fn write_token(out: &mut String, token: &FinalToken, config: &DebugConfig) {
    let p = config.precision;
    out.push_str("    ");
    let _ = match &token.content {
        TokenContent::Text(text) => write!(out, "text {:?}", text.as_str()),
        TokenContent::Whitespace(text) => write!(out, "space {:?}", text.as_str()),
        TokenContent::Newline => write!(out, "newline"),
        TokenContent::Sprite(sprite) => write!(out, "sprite {:?}", sprite.name.as_str()),
    };
    if config.show_tags && !token.tags.is_empty() {
        let _ = write!(out, " [{}]", token.tags);
    }
    if config.show_bounds {
        write_rect(out, token.bounds, p);
    }
    if config.show_baselines {
        let _ = write!(out, " baseline {:.p$}", token.baseline(), p = p);
    }
    if config.show_metrics {
        let _ = write!(
            out,
            " size {:.p$} ascent {:.p$} descent {:.p$}",
            token.font.font_size,
            token.font.ascent,
            token.font.descent,
            p = p
        );
    }
    for decoration in &token.decorations {
        let _ = write!(out, " {} #{:06x}", decoration.kind, decoration.color);
        if config.show_bounds {
            write_rect(out, decoration.bounds, p);
        }
    }
    out.push('\n');
}

/// Lists every line, word and token of a paragraph, one per line of output.
pub fn describe(paragraph: &ParagraphToken, config: &DebugConfig) -> String {
    let mut out = String::new();
    for (i, line) in paragraph.iter().enumerate() {
        let _ = write!(out, "line {}", i);
        if config.show_bounds {
            write_rect(&mut out, bounds_nested(line), config.precision);
        }
        out.push('\n');

        for (j, word) in line.iter().enumerate() {
            let visible = config.show_whitespace
                || word.iter().any(|token| token.is_text() || token.is_sprite());
            if !visible {
                continue;
            }
            let _ = writeln!(out, "  word {}", j);
            for token in word {
                write_token(&mut out, token, config);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{layout, ImageMap, LayoutInput, MonospaceMeasurer, TextOptions, TextStyle, TextStyleSet};

    fn paragraph(text: &str) -> ParagraphToken {
        let mut styles = TextStyleSet::new(TextStyle {
            font_size: Some(10.),
            ..Default::default()
        });
        styles.insert("b", TextStyle::default());
        let input = LayoutInput {
            text,
            styles: &styles,
            images: &ImageMap::new(),
            options: &TextOptions::default(),
        };
        layout(&input, &MonospaceMeasurer::default()).unwrap().paragraph
    }

    #[test]
    fn describe_defaults() {
        let description = describe(&paragraph("<b>Hi</b> you"), &DebugConfig::default());
        assert_eq!(
            description,
            "line 0 @ 0.0,0.0 30.0x10.0\n\
             \x20 word 0\n\
             \x20   text \"Hi\" [b] @ 0.0,0.0 10.0x10.0\n\
             \x20 word 1\n\
             \x20   space \" \" @ 10.0,0.0 5.0x10.0\n\
             \x20 word 2\n\
             \x20   text \"you\" @ 15.0,0.0 15.0x10.0\n"
        );
    }

    #[test]
    fn hide_whitespace_and_show_metrics() {
        let config = DebugConfig {
            show_tags: false,
            show_bounds: false,
            show_metrics: true,
            show_baselines: true,
            show_whitespace: false,
            precision: 0,
        };
        let description = describe(&paragraph("a b"), &config);
        assert_eq!(
            description,
            "line 0\n\
             \x20 word 0\n\
             \x20   text \"a\" baseline 8 size 10 ascent 8 descent 2\n\
             \x20 word 2\n\
             \x20   text \"b\" baseline 8 size 10 ascent 8 descent 2\n"
        );
    }
}
