//! Laid out text.
//!
//! Layout produces a tree of tokens: a paragraph is a list of lines,
//! a line a list of words, a word a list of [`FinalToken`]s. A word is
//! the unit that is never broken across lines unless it alone is wider
//! than the wrap width.

use std::{borrow::Cow, sync::Arc};

use crate::{
    font::FontMetrics, image::ImageId, rect::Rect, style::TextDecorationMetrics, SmartString,
    TextStyle,
};

pub mod layout;
pub mod segment;

pub type WordToken = Vec<FinalToken>;
pub type LineToken = Vec<WordToken>;
pub type ParagraphToken = Vec<LineToken>;

/// An image embedded in the text.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub image: ImageId,
    /// The key the image was registered under.
    pub name: SmartString,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenContent {
    Text(SmartString),
    Whitespace(SmartString),
    /// An explicit line break. Always zero width.
    Newline,
    Sprite(Sprite),
}

/// A positioned token.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalToken {
    pub content: TokenContent,
    /// The resolved style of the token.
    pub style: Arc<TextStyle>,
    /// Names of the enclosing tags, outermost first, joined by commas.
    pub tags: SmartString,
    pub font: FontMetrics,
    /// Position relative to the top left of the paragraph.
    pub bounds: Rect,
    pub decorations: Vec<TextDecorationMetrics>,
    /// False when the token continues a word started by the text before it.
    pub word_start: bool,
}

impl FinalToken {
    pub fn is_text(&self) -> bool {
        matches!(self.content, TokenContent::Text(_))
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self.content, TokenContent::Whitespace(_))
    }

    pub fn is_newline(&self) -> bool {
        matches!(self.content, TokenContent::Newline)
    }

    pub fn is_sprite(&self) -> bool {
        matches!(self.content, TokenContent::Sprite(_))
    }

    /// Text or whitespace content as written in the markup.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            TokenContent::Text(text) | TokenContent::Whitespace(text) => Some(text.as_str()),
            TokenContent::Newline | TokenContent::Sprite(_) => None,
        }
    }

    /// The text to draw, with the style's text transform applied.
    pub fn display_text(&self) -> Option<Cow<'_, str>> {
        self.text()
            .map(|text| self.style.transform(text, self.word_start))
    }

    pub fn sprite(&self) -> Option<&Sprite> {
        match &self.content {
            TokenContent::Sprite(sprite) => Some(sprite),
            _ => None,
        }
    }

    /// The baseline position, relative to the paragraph.
    pub fn baseline(&self) -> f32 {
        self.bounds.y() + self.font.ascent
    }
}

/// Anything in the token tree that covers an area.
pub trait NestedBounds {
    /// The union of all contained bounds, or `None` if there are none.
    fn nested_bounds(&self) -> Option<Rect>;
}

impl NestedBounds for FinalToken {
    fn nested_bounds(&self) -> Option<Rect> {
        Some(self.bounds)
    }
}

impl<T: NestedBounds> NestedBounds for [T] {
    fn nested_bounds(&self) -> Option<Rect> {
        Rect::union_all(self.iter().filter_map(NestedBounds::nested_bounds))
    }
}

impl<T: NestedBounds> NestedBounds for Vec<T> {
    fn nested_bounds(&self) -> Option<Rect> {
        self.as_slice().nested_bounds()
    }
}

/// Bounds of a token, word, line or paragraph. Empty groups have empty bounds.
pub fn bounds_nested<T: NestedBounds + ?Sized>(item: &T) -> Rect {
    item.nested_bounds().unwrap_or_default()
}

/// All tokens of a paragraph in reading order.
pub fn tokens(paragraph: &ParagraphToken) -> impl Iterator<Item = &FinalToken> {
    paragraph.iter().flatten().flatten()
}

/// Tokens that produce visible output: text, sprites and, if
/// `draw_whitespace` is set, whitespace.
pub fn renderable_tokens(
    paragraph: &ParagraphToken,
    draw_whitespace: bool,
) -> impl Iterator<Item = &FinalToken> {
    tokens(paragraph).filter(move |token| match token.content {
        TokenContent::Text(_) | TokenContent::Sprite(_) => true,
        TokenContent::Whitespace(_) => draw_whitespace,
        TokenContent::Newline => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(content: TokenContent, bounds: Rect) -> FinalToken {
        FinalToken {
            content,
            style: Arc::new(TextStyle::default()),
            tags: SmartString::new(),
            font: FontMetrics::default(),
            bounds,
            decorations: Vec::new(),
            word_start: true,
        }
    }

    #[test]
    fn nested_bounds() {
        let paragraph: ParagraphToken = vec![
            vec![vec![
                token(TokenContent::Text("ab".into()), Rect::from_xywh(0., 0., 10., 10.)),
                token(TokenContent::Whitespace(" ".into()), Rect::from_xywh(10., 0., 5., 10.)),
            ]],
            vec![vec![token(TokenContent::Text("cd".into()), Rect::from_xywh(0., 10., 20., 10.))]],
        ];
        assert_eq!(bounds_nested(&paragraph), Rect::from_xywh(0., 0., 20., 20.));
        assert_eq!(bounds_nested(&paragraph[0]), Rect::from_xywh(0., 0., 15., 10.));

        let empty: ParagraphToken = Vec::new();
        assert_eq!(bounds_nested(&empty), Rect::default());
        assert_eq!(bounds_nested(&vec![Vec::<WordToken>::new()]), Rect::default());
    }

    #[test]
    fn renderable() {
        let paragraph: ParagraphToken = vec![vec![
            vec![token(TokenContent::Text("a".into()), Rect::default())],
            vec![token(TokenContent::Whitespace(" ".into()), Rect::default())],
            vec![token(TokenContent::Newline, Rect::default())],
        ]];
        assert_eq!(renderable_tokens(&paragraph, false).count(), 1);
        assert_eq!(renderable_tokens(&paragraph, true).count(), 2);
        assert_eq!(tokens(&paragraph).count(), 3);
    }

    #[test]
    fn display_text_is_transformed() {
        let mut t = token(TokenContent::Text("hello".into()), Rect::default());
        t.style = Arc::new(TextStyle {
            text_transform: Some(crate::style::TextTransform::Uppercase),
            ..Default::default()
        });
        assert_eq!(t.text(), Some("hello"));
        assert_eq!(t.display_text().as_deref(), Some("HELLO"));
    }
}
