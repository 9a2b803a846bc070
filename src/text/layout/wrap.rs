use std::mem;

use crate::text::{FinalToken, LineToken, WordToken};

use super::{is_block, TextOptions};

/// A closed line.
pub struct Line {
    pub words: LineToken,
    /// Whether the line ended with an explicit newline.
    pub hard_break: bool,
}

/// Does greedy line wrapping on a list of measured words.
///
/// Only horizontal positions are computed here.
pub struct Layouter<'a> {
    options: &'a TextOptions,

    lines: Vec<Line>,
    current_line: LineToken,

    cursor: f32,
    /// Whether the current line holds anything besides whitespace.
    has_content: bool,
}

impl<'a> Layouter<'a> {
    pub fn new(options: &'a TextOptions) -> Self {
        Self {
            options,

            lines: Vec::new(),
            current_line: Vec::new(),

            cursor: 0.,
            has_content: false,
        }
    }

    fn next_line(&mut self, hard_break: bool) {
        let mut words = mem::take(&mut self.current_line);
        if self.options.collapse_trailing_whitespace {
            collapse_trailing_whitespace(&mut words);
        }
        self.lines.push(Line { words, hard_break });
        self.cursor = 0.;
        self.has_content = false;
    }

    fn place(&mut self, token: &mut FinalToken) {
        token.bounds.pos.x = self.cursor;
        self.cursor += token.bounds.width();
        if !token.is_whitespace() && !token.is_newline() {
            self.has_content = true;
        }
    }

    fn collapse_leading_whitespace(&mut self) {
        for token in self.current_line.iter_mut().flatten() {
            token.bounds.pos.x = 0.;
            token.bounds.size.x = 0.;
        }
        self.cursor = 0.;
    }

    fn push_word(&mut self, mut word: WordToken) {
        for token in &mut word {
            self.place(token);
        }
        self.current_line.push(word);
    }

    /// Places a word that is too wide for any line, breaking it between
    /// tokens wherever the line is full.
    fn break_word(&mut self, word: WordToken, max_width: f32) {
        let mut piece = Vec::new();
        for mut token in word {
            if self.has_content && self.cursor + token.bounds.width() > max_width {
                if !piece.is_empty() {
                    self.current_line.push(mem::take(&mut piece));
                }
                self.next_line(false);
            }
            self.place(&mut token);
            piece.push(token);
        }
        if !piece.is_empty() {
            self.current_line.push(piece);
        }
    }

    fn process_word(&mut self, word: WordToken) {
        let first = match word.first() {
            Some(token) => token,
            None => return,
        };

        if first.is_newline() {
            self.push_word(word);
            self.next_line(true);
            return;
        }
        if first.is_whitespace() {
            self.push_word(word);
            return;
        }
        if is_block(first) {
            if !self.current_line.is_empty() {
                self.next_line(false);
            }
            self.push_word(word);
            self.next_line(false);
            return;
        }

        let max_width = match first.style.wrap_width() {
            Some(width) => width,
            None => {
                self.push_word(word);
                return;
            }
        };
        let width: f32 = word.iter().map(|token| token.bounds.width()).sum();
        if self.cursor + width <= max_width {
            self.push_word(word);
            return;
        }

        // We need to wrap to the next line.
        if self.has_content {
            self.next_line(false);
        } else if self.options.collapse_trailing_whitespace {
            // Only indentation precedes the word, and it is in the way.
            self.collapse_leading_whitespace();
        }
        if self.cursor + width <= max_width || word.len() == 1 {
            self.push_word(word);
        } else {
            self.break_word(word, max_width);
        }
    }

    pub fn run_layout(mut self, words: Vec<WordToken>) -> Vec<Line> {
        for word in words {
            self.process_word(word);
        }
        if !self.current_line.is_empty() {
            self.next_line(false);
        }
        self.lines
    }
}

/// Gives whitespace and newlines at the end of a line zero width, so
/// they do not count towards its width.
fn collapse_trailing_whitespace(words: &mut LineToken) {
    let content_end = words
        .iter()
        .flatten()
        .filter(|token| !token.is_whitespace() && !token.is_newline())
        .last()
        .map(|token| token.bounds.max().x)
        .unwrap_or(0.);

    for token in words.iter_mut().rev().flat_map(|word| word.iter_mut().rev()) {
        if !token.is_whitespace() && !token.is_newline() {
            break;
        }
        token.bounds.pos.x = content_end;
        token.bounds.size.x = 0.;
    }
}
