//! Splitting styled runs of text into layout tokens.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    image::ImageMap,
    markup::{TagStack, TagToken},
    text::{Sprite, TokenContent},
    SmartString, TextStyle,
};

/// Granularity of the tokens produced for text.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SplitStyle {
    /// Runs of whitespace and runs of everything else.
    Words,
    /// One token per grapheme cluster.
    Characters,
    /// One token per line.
    Lines,
}

impl Default for SplitStyle {
    fn default() -> Self {
        SplitStyle::Words
    }
}

/// A run of text with its resolved style.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledToken {
    pub text: SmartString,
    pub tags: TagStack,
    pub style: Arc<TextStyle>,
}

impl StyledToken {
    pub fn new(token: TagToken, style: Arc<TextStyle>) -> Self {
        Self {
            text: token.text,
            tags: token.tags,
            style,
        }
    }
}

/// A measurable piece of a styled run, before layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub content: TokenContent,
    pub tags: SmartString,
    pub style: Arc<TextStyle>,
}

/// Whether `grapheme` is a break opportunity. No-break spaces are not.
fn is_breaking_whitespace(grapheme: &str) -> bool {
    grapheme
        .chars()
        .all(|c| c.is_whitespace() && !matches!(c, '\u{A0}' | '\u{2007}' | '\u{202F}'))
}

struct Segmenter<'a> {
    split_style: SplitStyle,
    tags: SmartString,
    style: &'a Arc<TextStyle>,
    fragments: &'a mut Vec<Fragment>,
}

impl<'a> Segmenter<'a> {
    fn push(&mut self, content: TokenContent) {
        self.fragments.push(Fragment {
            content,
            tags: self.tags.clone(),
            style: Arc::clone(self.style),
        });
    }

    fn push_run(&mut self, run: &str, whitespace: bool) {
        if whitespace {
            self.push(TokenContent::Whitespace(run.into()));
        } else {
            self.push(TokenContent::Text(run.into()));
        }
    }

    /// Splits text that contains no newlines.
    fn split_line(&mut self, line: &str) {
        if line.is_empty() {
            return;
        }
        match self.split_style {
            SplitStyle::Lines => self.push_run(line, line.graphemes(true).all(is_breaking_whitespace)),
            SplitStyle::Characters => {
                for grapheme in line.graphemes(true) {
                    self.push_run(grapheme, is_breaking_whitespace(grapheme));
                }
            }
            SplitStyle::Words => {
                let mut start = 0;
                let mut current = None;
                for (i, grapheme) in line.grapheme_indices(true) {
                    let whitespace = is_breaking_whitespace(grapheme);
                    match current {
                        Some(previous) if previous != whitespace => {
                            self.push_run(&line[start..i], previous);
                            start = i;
                        }
                        _ => {}
                    }
                    current = Some(whitespace);
                }
                if let Some(whitespace) = current {
                    self.push_run(&line[start..], whitespace);
                }
            }
        }
    }

    fn split(&mut self, text: &str) {
        let mut rest = text;
        while let Some(i) = rest.find('\n') {
            let line = &rest[..i];
            self.split_line(line.strip_suffix('\r').unwrap_or(line));
            self.push(TokenContent::Newline);
            rest = &rest[i + 1..];
        }
        self.split_line(rest);
    }
}

/// Splits one styled run into fragments.
///
/// A run whose style names a registered image becomes a single sprite,
/// whatever its text. Newlines (`\n` or `\r\n`) always become their own
/// fragments.
pub fn segment(
    token: &StyledToken,
    split_style: SplitStyle,
    images: &ImageMap,
    fragments: &mut Vec<Fragment>,
) {
    let tags = crate::markup::join_tag_names(&token.tags);

    if let Some(key) = &token.style.img_src {
        if let Ok(image) = images.image_for_name(key) {
            fragments.push(Fragment {
                content: TokenContent::Sprite(Sprite {
                    image,
                    name: key.clone(),
                }),
                tags,
                style: Arc::clone(&token.style),
            });
            return;
        }
    }

    Segmenter {
        split_style,
        tags,
        style: &token.style,
        fragments,
    }
    .split(&token.text);
}

pub fn segment_all(tokens: &[StyledToken], split_style: SplitStyle, images: &ImageMap) -> Vec<Fragment> {
    let mut fragments = Vec::with_capacity(tokens.len());
    for token in tokens {
        segment(token, split_style, images, &mut fragments);
    }
    fragments
}
