use std::ops::Range;

use logos::Logos;

/// Markup tokens. Every byte of the input belongs to exactly one token,
/// so any run of tokens can be turned back into source text by span.
#[derive(Copy, Clone, Debug, Logos, PartialEq, Eq)]
pub enum Token {
    #[token("<")]
    LAngle,
    #[token("</")]
    LAngleSlash,
    #[token(">")]
    RAngle,
    #[token("/>")]
    SlashRAngle,
    #[token("/")]
    Slash,
    #[token("=")]
    Equals,
    #[token("\"")]
    DoubleQuote,
    #[token("'")]
    SingleQuote,

    #[regex(r"\s+")]
    Whitespace,

    #[regex(r#"[^<>/="'\s]+"#)]
    Word,

    #[error]
    Error,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TagKind {
    Open,
    Close,
    SelfClosing,
}

/// A syntactically valid tag, whether or not its name is registered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawTag<'a> {
    pub kind: TagKind,
    pub name: &'a str,
    pub attributes: Vec<(&'a str, &'a str)>,
    /// Byte range of the whole tag in the markup.
    pub span: Range<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scan<'a> {
    /// The token is not the start of a tag.
    Text,
    /// Starts like a tag called `name` but the rest does not parse.
    /// `end` is the byte offset where scanning gave up.
    Malformed { name: &'a str, end: usize },
    /// A complete tag; scanning should resume at token `next`.
    Tag { tag: RawTag<'a>, next: usize },
}

/// Lexed markup that can be scanned for tags.
pub struct TokenStream<'a> {
    markup: &'a str,
    tokens: Vec<(Token, Range<usize>)>,
}

impl<'a> TokenStream<'a> {
    pub fn new(markup: &'a str) -> Self {
        Self {
            markup,
            tokens: Token::lexer(markup).spanned().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn span(&self, i: usize) -> Range<usize> {
        self.tokens[i].1.clone()
    }

    pub fn slice(&self, i: usize) -> &'a str {
        &self.markup[self.span(i)]
    }

    fn kind(&self, i: usize) -> Option<Token> {
        self.tokens.get(i).map(|(tok, _)| *tok)
    }

    fn skip_whitespace(&self, mut i: usize) -> usize {
        while self.kind(i) == Some(Token::Whitespace) {
            i += 1;
        }
        i
    }

    fn end_of(&self, i: usize) -> usize {
        self.tokens
            .get(i)
            .map(|(_, span)| span.end)
            .unwrap_or(self.markup.len())
    }

    /// Tries to read a tag starting at token `start`.
    pub fn scan_tag(&self, start: usize) -> Scan<'a> {
        let closing = match self.kind(start) {
            Some(Token::LAngle) => false,
            Some(Token::LAngleSlash) => true,
            _ => return Scan::Text,
        };
        let name = match self.kind(start + 1) {
            Some(Token::Word) => self.slice(start + 1),
            _ => return Scan::Text,
        };

        let tag = |kind, attributes, last: usize| Scan::Tag {
            tag: RawTag {
                kind,
                name,
                attributes,
                span: self.tokens[start].1.start..self.tokens[last].1.end,
            },
            next: last + 1,
        };
        let malformed = |i: usize| Scan::Malformed {
            name,
            end: self.end_of(i),
        };

        let mut i = self.skip_whitespace(start + 2);
        if closing {
            return match self.kind(i) {
                Some(Token::RAngle) => tag(TagKind::Close, Vec::new(), i),
                _ => malformed(i),
            };
        }

        let mut attributes = Vec::new();
        let mut separated = i > start + 2;
        loop {
            match self.kind(i) {
                Some(Token::RAngle) => return tag(TagKind::Open, attributes, i),
                Some(Token::SlashRAngle) => return tag(TagKind::SelfClosing, attributes, i),
                Some(Token::Word) if separated => {
                    let key = self.slice(i);
                    if self.kind(i + 1) != Some(Token::Equals) {
                        return malformed(i + 1);
                    }
                    let (value, after) = match self.attribute_value(i + 2) {
                        Some(value) => value,
                        None => return malformed(i + 2),
                    };
                    attributes.push((key, value));

                    i = self.skip_whitespace(after);
                    separated = i > after;
                }
                _ => return malformed(i),
            }
        }
    }

    /// Reads a quoted or bare attribute value starting at token `i`.
    /// Returns the value and the index of the token after it.
    fn attribute_value(&self, i: usize) -> Option<(&'a str, usize)> {
        match self.kind(i)? {
            quote @ (Token::DoubleQuote | Token::SingleQuote) => {
                let close = (i + 1..self.tokens.len()).find(|&j| self.kind(j) == Some(quote))?;
                let value = &self.markup[self.tokens[i].1.end..self.tokens[close].1.start];
                Some((value, close + 1))
            }
            Token::Word | Token::Slash | Token::Equals => {
                let mut end = i;
                while matches!(
                    self.kind(end),
                    Some(Token::Word | Token::Slash | Token::Equals)
                ) {
                    end += 1;
                }
                let value = &self.markup[self.tokens[i].1.start..self.tokens[end - 1].1.end];
                Some((value, end))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(markup: &str) -> Vec<Token> {
        Token::lexer(markup).collect()
    }

    #[test]
    fn lex_tag() {
        assert_eq!(
            kinds(r#"<b c="d">x</b>"#),
            vec![
                Token::LAngle,
                Token::Word,
                Token::Whitespace,
                Token::Word,
                Token::Equals,
                Token::DoubleQuote,
                Token::Word,
                Token::DoubleQuote,
                Token::RAngle,
                Token::Word,
                Token::LAngleSlash,
                Token::Word,
                Token::RAngle,
            ]
        );
    }

    #[test]
    fn lex_unicode_text() {
        assert_eq!(kinds("héllo wörld"), vec![Token::Word, Token::Whitespace, Token::Word]);
    }

    #[test]
    fn scan_open_with_attributes() {
        let stream = TokenStream::new(r##"<c color="#f00" size=12 note='a b'>"##);
        match stream.scan_tag(0) {
            Scan::Tag { tag, next } => {
                assert_eq!(tag.kind, TagKind::Open);
                assert_eq!(tag.name, "c");
                assert_eq!(
                    tag.attributes,
                    vec![("color", "#f00"), ("size", "12"), ("note", "a b")]
                );
                assert_eq!(next, stream.len());
            }
            other => panic!("expected a tag, got {:?}", other),
        }
    }

    #[test]
    fn scan_self_closing() {
        let stream = TokenStream::new("<img src=a/b.png />");
        match stream.scan_tag(0) {
            Scan::Tag { tag, .. } => {
                assert_eq!(tag.kind, TagKind::SelfClosing);
                assert_eq!(tag.attributes, vec![("src", "a/b.png")]);
                assert_eq!(tag.span, 0..19);
            }
            other => panic!("expected a tag, got {:?}", other),
        }
    }

    #[test]
    fn scan_close() {
        let stream = TokenStream::new("</b >");
        assert!(matches!(
            stream.scan_tag(0),
            Scan::Tag {
                tag: RawTag {
                    kind: TagKind::Close,
                    name: "b",
                    ..
                },
                ..
            }
        ));
    }

    #[test]
    fn scan_not_a_tag() {
        let stream = TokenStream::new("a < b");
        assert_eq!(stream.scan_tag(2), Scan::Text);
        assert_eq!(stream.scan_tag(0), Scan::Text);
    }

    #[test]
    fn scan_malformed() {
        let stream = TokenStream::new("<b foo>");
        assert_eq!(stream.scan_tag(0), Scan::Malformed { name: "b", end: 7 });

        let stream = TokenStream::new(r#"<b c="unterminated>"#);
        assert!(matches!(stream.scan_tag(0), Scan::Malformed { name: "b", .. }));

        let stream = TokenStream::new(r#"<b c="1"d="2">"#);
        assert!(matches!(stream.scan_tag(0), Scan::Malformed { name: "b", .. }));
    }
}
