//! Text layout implementation.
//!
//! Layout happens in passes over the measured tokens:
//! 1. tokens are grouped into words and wrapped greedily into lines,
//!    which fixes horizontal positions;
//! 2. lines are stacked vertically and tokens placed within each line
//!    according to their vertical alignment;
//! 3. each line is shifted (or stretched) for horizontal alignment;
//! 4. decorations are computed from the final bounds.

use std::{mem, str::FromStr};

use glam::{vec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::{
    color::ColorParseError,
    font::{FontMetrics, Measurer},
    image::ImageMap,
    rect::Rect,
    style::{decoration::decorations_for, DecorationKind, ImageDisplay},
    text::{
        bounds_nested,
        segment::{Fragment, SplitStyle},
        FinalToken, ParagraphToken, TokenContent, WordToken,
    },
    SmartString, TextStyle,
};

use self::wrap::{Layouter, Line};

mod wrap;

/// Horizontal alignment of a line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Align {
    Left,
    Center,
    Right,
    /// Stretch the spaces between words so the line fills the alignment box.
    /// The last line of a paragraph is left aligned.
    Justify,
}

impl Default for Align {
    fn default() -> Self {
        Align::Left
    }
}

impl FromStr for Align {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "left" => Align::Left,
            "center" => Align::Center,
            "right" => Align::Right,
            "justify" => Align::Justify,
            _ => return Err(()),
        })
    }
}

/// Vertical alignment of a token within its line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VAlign {
    /// Share the baseline with the other tokens of the line.
    Baseline,
    Top,
    Middle,
    Bottom,
}

impl Default for VAlign {
    fn default() -> Self {
        VAlign::Baseline
    }
}

impl FromStr for VAlign {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "baseline" => VAlign::Baseline,
            "top" => VAlign::Top,
            "middle" => VAlign::Middle,
            "bottom" => VAlign::Bottom,
            _ => return Err(()),
        })
    }
}

/// Settings for the whole pipeline that are not part of any style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextOptions {
    pub split_style: SplitStyle,
    /// Give whitespace at the end of each line zero width.
    pub collapse_trailing_whitespace: bool,
    /// Split emoji into their own tokens with an extra `__EMOJI__` tag.
    pub wrap_emoji: bool,
    /// Whether whitespace tokens are handed to the renderer.
    pub draw_whitespace: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            split_style: SplitStyle::Words,
            collapse_trailing_whitespace: true,
            wrap_emoji: true,
            draw_whitespace: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("{kind} color `{color}` is not a hex color")]
    DecorationColor {
        kind: DecorationKind,
        color: SmartString,
        #[source]
        source: ColorParseError,
    },
}

pub(crate) fn is_block(token: &FinalToken) -> bool {
    token.is_sprite() && token.style.img_display == Some(ImageDisplay::Block)
}

/// The displayed size of an image with the given intrinsic size.
pub fn sprite_size(style: &TextStyle, intrinsic: Vec2) -> Vec2 {
    match style.img_display.unwrap_or_default() {
        ImageDisplay::Inline | ImageDisplay::Block => intrinsic * style.img_scale.unwrap_or(1.),
        ImageDisplay::Icon => {
            let height = style.font_size_or_default() * style.icon_scale.unwrap_or(1.);
            let width = if intrinsic.y > 0. {
                intrinsic.x * height / intrinsic.y
            } else {
                0.
            };
            vec2(width, height)
        }
    }
}

/// Whether text following `previous` starts a new word.
fn starts_word(previous: Option<&TokenContent>) -> bool {
    match previous {
        Some(TokenContent::Text(text)) => text.ends_with(char::is_whitespace),
        _ => true,
    }
}

fn measure(
    fragment: Fragment,
    word_start: bool,
    images: &ImageMap,
    measurer: &dyn Measurer,
) -> FinalToken {
    let style = &fragment.style;
    let (size, font) = match &fragment.content {
        TokenContent::Text(text) | TokenContent::Whitespace(text) => {
            let measurement = measurer.measure(&style.transform(text, word_start), style);
            (
                vec2(measurement.width, measurement.height),
                measurement.metrics,
            )
        }
        TokenContent::Newline => {
            let measurement = measurer.measure("", style);
            (vec2(0., measurement.height), measurement.metrics)
        }
        TokenContent::Sprite(sprite) => {
            let size = sprite_size(style, images.size(sprite.image));
            let font = FontMetrics {
                font_size: style.font_size_or_default(),
                ascent: size.y,
                descent: 0.,
            };
            (size, font)
        }
    };

    FinalToken {
        content: fragment.content,
        style: fragment.style,
        tags: fragment.tags,
        font,
        bounds: Rect::new(Vec2::ZERO, size),
        decorations: Vec::new(),
        word_start,
    }
}

/// Groups runs of text and inline sprites into words. Whitespace,
/// newlines and block images are words of their own.
fn group_words(tokens: Vec<FinalToken>) -> Vec<WordToken> {
    let mut words = Vec::new();
    let mut word = Vec::new();
    for token in tokens {
        if token.is_text() || (token.is_sprite() && !is_block(&token)) {
            word.push(token);
            continue;
        }
        if !word.is_empty() {
            words.push(mem::take(&mut word));
        }
        words.push(vec![token]);
    }
    if !word.is_empty() {
        words.push(word);
    }
    words
}

fn first_style<'a>(line: &'a Line, default_style: &'a TextStyle) -> &'a TextStyle {
    line.words
        .iter()
        .flatten()
        .next()
        .map(|token| &*token.style)
        .unwrap_or(default_style)
}

fn stack_lines(lines: &mut [Line], default_style: &TextStyle) {
    let mut y = 0.;
    for line in lines {
        let mut ascent = 0f32;
        let mut descent = 0f32;
        let mut height = 0f32;
        for token in line.words.iter().flatten() {
            if token.style.valign.unwrap_or_default() == VAlign::Baseline {
                ascent = ascent.max(token.font.ascent);
                descent = descent.max(token.font.descent);
            }
            height = height.max(token.bounds.height());
        }
        let height = height.max(ascent + descent);

        for token in line.words.iter_mut().flatten() {
            let offset = match token.style.valign.unwrap_or_default() {
                VAlign::Baseline => ascent - token.font.ascent,
                VAlign::Top => 0.,
                VAlign::Middle => (height - token.bounds.height()) / 2.,
                VAlign::Bottom => height - token.bounds.height(),
            };
            token.bounds.pos.y = y + offset;
        }

        let style = first_style(line, default_style);
        y += height + style.line_spacing.unwrap_or(0.);
        if line.hard_break {
            y += style.paragraph_spacing.unwrap_or(0.);
        }
    }
}

fn shift_line(line: &mut Line, dx: f32) {
    for token in line.words.iter_mut().flatten() {
        token.bounds.pos.x += dx;
    }
}

fn is_gap(word: &WordToken) -> bool {
    word.iter().all(FinalToken::is_whitespace)
}

fn has_content(word: &WordToken) -> bool {
    word.iter()
        .any(|token| !token.is_whitespace() && !token.is_newline())
}

/// Widens the whitespace between the first and last word with content.
fn justify_line(line: &mut Line, free: f32) {
    let (first, last) = match (
        line.words.iter().position(has_content),
        line.words.iter().rposition(has_content),
    ) {
        (Some(first), Some(last)) => (first, last),
        _ => return,
    };
    let gaps = line.words[first..last].iter().filter(|word| is_gap(word)).count();
    if gaps == 0 {
        return;
    }

    let extra = free / gaps as f32;
    let mut offset = 0.;
    for (i, word) in line.words.iter_mut().enumerate() {
        for token in word.iter_mut() {
            token.bounds.pos.x += offset;
        }
        if i > first && i < last && is_gap(word) {
            if let Some(token) = word.last_mut() {
                token.bounds.size.x += extra;
            }
            offset += extra;
        }
    }
}

fn align_lines(lines: &mut [Line], default_style: &TextStyle) {
    let line_width = |line: &Line| bounds_nested(&line.words).max().x;
    let widest = lines.iter().map(line_width).fold(0., f32::max);

    let last = lines.len().saturating_sub(1);
    for (i, line) in lines.iter_mut().enumerate() {
        let (align, wrap_width) = {
            let style = first_style(line, default_style);
            (style.align.unwrap_or_default(), style.wrap_width())
        };
        let free = (wrap_width.unwrap_or(widest) - line_width(&*line)).max(0.);

        match align {
            Align::Left => {}
            Align::Center => shift_line(line, free / 2.),
            Align::Right => shift_line(line, free),
            Align::Justify => {
                if !line.hard_break && i < last {
                    justify_line(line, free);
                }
            }
        }
    }
}

fn decorate(lines: &mut [Line]) -> Result<(), LayoutError> {
    for token in lines.iter_mut().flat_map(|line| line.words.iter_mut().flatten()) {
        let visible = token.is_text() || (token.is_whitespace() && token.bounds.width() > 0.);
        if visible {
            token.decorations = decorations_for(&token.style, token.bounds, &token.font)?;
        }
    }
    Ok(())
}

/// Measures and positions fragments.
///
/// `default_style` supplies line settings for lines without tokens.
pub fn lay_out(
    fragments: Vec<Fragment>,
    default_style: &TextStyle,
    options: &TextOptions,
    images: &ImageMap,
    measurer: &dyn Measurer,
) -> Result<ParagraphToken, LayoutError> {
    let mut tokens: Vec<FinalToken> = Vec::with_capacity(fragments.len());
    for fragment in fragments {
        let word_start = starts_word(tokens.last().map(|token| &token.content));
        tokens.push(measure(fragment, word_start, images, measurer));
    }
    let num_tokens = tokens.len();

    let mut lines = Layouter::new(options).run_layout(group_words(tokens));
    stack_lines(&mut lines, default_style);
    align_lines(&mut lines, default_style);
    decorate(&mut lines)?;

    log::debug!("Laid out {} tokens in {} lines", num_tokens, lines.len());
    Ok(lines.into_iter().map(|line| line.words).collect())
}
