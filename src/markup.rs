//! Tag markup parser.
//!
//! # Syntax
//! Tags look like (a small subset of) XML:
//!
//! `<b>bold text</b> plain text`
//!
//! `<b>bold <i>bold and italic</i></b>`
//!
//! `<color fill="#ff0000">red text</color>`
//!
//! Attribute values may be double quoted, single quoted, or bare if they
//! contain no whitespace. Images are embedded with self-closing tags:
//!
//! `Icon: <icon/>`
//!
//! Only names in the set of known tags are treated as tags. Anything else,
//! including `<` and `>` in ordinary prose, stays literal text. Markup that
//! cannot be interpreted (a closing tag that doesn't match, attributes that
//! don't parse) is kept as literal text and reported to [`Diagnostics`].

use std::{collections::BTreeMap, ops::Range};

use ahash::AHashSet;
use smallvec::SmallVec;
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    diagnostics::{Diagnostics, Warning},
    SmartString,
};

use self::lexer::{RawTag, Scan, TagKind, TokenStream};

mod lexer;

/// Name of the tag wrapped around emoji when emoji wrapping is enabled.
pub const EMOJI_TAG: &str = "__EMOJI__";

pub type AttributesList = BTreeMap<SmartString, SmartString>;

/// One occurrence of an open tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagWithAttributes {
    pub name: SmartString,
    pub attributes: AttributesList,
}

impl TagWithAttributes {
    pub fn new(name: impl Into<SmartString>) -> Self {
        Self {
            name: name.into(),
            attributes: AttributesList::new(),
        }
    }

    pub fn with_attribute(
        mut self,
        key: impl Into<SmartString>,
        value: impl Into<SmartString>,
    ) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    fn from_raw(tag: &RawTag) -> Self {
        Self {
            name: tag.name.into(),
            attributes: tag
                .attributes
                .iter()
                .map(|(key, value)| (SmartString::from(*key), SmartString::from(*value)))
                .collect(),
        }
    }
}

pub type TagStack = SmallVec<[TagWithAttributes; 2]>;

/// A run of plain text and the tags enclosing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagToken {
    pub text: SmartString,
    /// Open tags, outermost first.
    pub tags: TagStack,
    /// Byte range of `text` in the markup. Self-closing tags produce
    /// an empty token with an empty span at the end of the tag.
    pub span: Range<usize>,
}

impl TagToken {
    /// The names of the enclosing tags joined by commas, outermost first.
    pub fn tag_names(&self) -> SmartString {
        join_tag_names(&self.tags)
    }
}

pub fn join_tag_names(tags: &[TagWithAttributes]) -> SmartString {
    let mut names = SmartString::new();
    for (i, tag) in tags.iter().enumerate() {
        if i > 0 {
            names.push(',');
        }
        names.push_str(&tag.name);
    }
    names
}

/// Concatenates the text of parsed tokens.
pub fn plain_text(tokens: &[TagToken]) -> String {
    tokens.iter().map(|token| token.text.as_str()).collect()
}

/// Parses markup into runs of text annotated with their tag stacks.
///
/// Text with no tags in it yields a single token with an empty stack.
pub fn parse(
    markup: &str,
    known_tags: &AHashSet<SmartString>,
    diagnostics: &mut Diagnostics,
) -> Vec<TagToken> {
    let mut parser = Parser {
        markup,
        known_tags,
        stack: Vec::new(),
        pending: None,
        output: Vec::new(),
    };

    let stream = TokenStream::new(markup);
    let mut i = 0;
    while i < stream.len() {
        match stream.scan_tag(i) {
            Scan::Tag { tag, next } => {
                if known_tags.contains(tag.name) {
                    parser.apply(tag, diagnostics);
                } else {
                    parser.append(tag.span);
                }
                i = next;
            }
            Scan::Malformed { name, end } => {
                if known_tags.contains(name) {
                    diagnostics.push(Warning::MalformedTag {
                        markup: markup[stream.span(i).start..end].to_owned(),
                    });
                }
                parser.append(stream.span(i));
                i += 1;
            }
            Scan::Text => {
                parser.append(stream.span(i));
                i += 1;
            }
        }
    }

    parser.finish(diagnostics)
}

/// Strips all tags from the markup, leaving the text a user would read.
///
/// Any syntactically valid tag is removed, registered or not. Removing a
/// tag can join the text around it into a new tag (`<<b>b>`), so passes
/// repeat until none is left.
pub fn remove_tags(markup: &str) -> String {
    let mut result = markup.to_owned();
    while let Some(stripped) = strip_tags_once(&result) {
        result = stripped;
    }
    result
}

/// One left to right pass of [`remove_tags`]. `None` if there was no tag.
fn strip_tags_once(markup: &str) -> Option<String> {
    let stream = TokenStream::new(markup);
    let mut result = String::with_capacity(markup.len());
    let mut removed = false;
    let mut i = 0;
    while i < stream.len() {
        match stream.scan_tag(i) {
            Scan::Tag { next, .. } => {
                removed = true;
                i = next;
            }
            _ => {
                result.push_str(stream.slice(i));
                i += 1;
            }
        }
    }
    removed.then(|| result)
}

/// Splits emoji out of each token and tags them with [`EMOJI_TAG`].
pub fn wrap_emoji(tokens: Vec<TagToken>) -> Vec<TagToken> {
    let mut result = Vec::with_capacity(tokens.len());
    for token in tokens {
        if !token.text.graphemes(true).any(is_emoji) {
            result.push(token);
            continue;
        }

        let mut run: Option<(Range<usize>, bool)> = None;
        for (offset, grapheme) in token.text.grapheme_indices(true) {
            let emoji = is_emoji(grapheme);
            let range = offset..offset + grapheme.len();
            run = match run {
                Some((current, current_emoji)) if current_emoji == emoji => {
                    Some((current.start..range.end, emoji))
                }
                Some((current, current_emoji)) => {
                    result.push(sub_token(&token, current, current_emoji));
                    Some((range, emoji))
                }
                None => Some((range, emoji)),
            };
        }
        if let Some((current, current_emoji)) = run {
            result.push(sub_token(&token, current, current_emoji));
        }
    }
    result
}

fn sub_token(token: &TagToken, range: Range<usize>, emoji: bool) -> TagToken {
    let mut tags = token.tags.clone();
    if emoji {
        tags.push(TagWithAttributes::new(EMOJI_TAG));
    }
    TagToken {
        text: token.text[range.clone()].into(),
        tags,
        span: token.span.start + range.start..token.span.start + range.end,
    }
}

/// Whether a grapheme cluster is presented as an emoji.
pub fn is_emoji(grapheme: &str) -> bool {
    grapheme.chars().any(|c| {
        matches!(
            u32::from(c),
            0x1F000..=0x1FAFF // pictographs, emoticons, flags, transport
                | 0x2600..=0x27BF // misc symbols and dingbats
                | 0x2B00..=0x2BFF
                | 0xFE0F // emoji presentation selector
                | 0x20E3 // keycap
        )
    })
}

struct OpenTag {
    tag: TagWithAttributes,
    /// Whether any token has been emitted inside this tag.
    emitted: bool,
}

struct Parser<'a> {
    markup: &'a str,
    known_tags: &'a AHashSet<SmartString>,
    stack: Vec<OpenTag>,
    /// Literal text not yet emitted. Always a contiguous range of the markup.
    pending: Option<Range<usize>>,
    output: Vec<TagToken>,
}

impl<'a> Parser<'a> {
    fn append(&mut self, span: Range<usize>) {
        self.pending = Some(match self.pending.take() {
            Some(pending) => pending.start..span.end,
            None => span,
        });
    }

    fn flush(&mut self) {
        if let Some(span) = self.pending.take() {
            if !span.is_empty() {
                self.emit(span, None);
            }
        }
    }

    fn emit(&mut self, span: Range<usize>, self_closing: Option<TagWithAttributes>) {
        let mut tags: TagStack = self.stack.iter().map(|open| open.tag.clone()).collect();
        tags.extend(self_closing);
        for open in &mut self.stack {
            open.emitted = true;
        }
        self.output.push(TagToken {
            text: self.markup[span.clone()].into(),
            tags,
            span,
        });
    }

    fn apply(&mut self, tag: RawTag, diagnostics: &mut Diagnostics) {
        debug_assert!(self.known_tags.contains(tag.name));
        match tag.kind {
            TagKind::Open => {
                self.flush();
                self.stack.push(OpenTag {
                    tag: TagWithAttributes::from_raw(&tag),
                    emitted: false,
                });
            }
            TagKind::SelfClosing => {
                self.flush();
                let end = tag.span.end;
                self.emit(end..end, Some(TagWithAttributes::from_raw(&tag)));
            }
            TagKind::Close => match self.stack.last() {
                None => {
                    diagnostics.push(Warning::UnmatchedClosingTag {
                        name: tag.name.into(),
                    });
                    self.append(tag.span);
                }
                Some(open) if open.tag.name == tag.name => {
                    self.flush();
                    if !open_emitted(&self.stack) {
                        // Empty pair like `<icon></icon>` still marks a position.
                        let start = tag.span.start;
                        self.emit(start..start, None);
                    }
                    self.stack.pop();
                }
                Some(open) => {
                    diagnostics.push(Warning::MisorderedClosingTag {
                        found: tag.name.into(),
                        expected: open.tag.name.clone(),
                    });
                    self.append(tag.span);
                }
            },
        }
    }

    fn finish(mut self, diagnostics: &mut Diagnostics) -> Vec<TagToken> {
        self.flush();
        while let Some(open) = self.stack.last() {
            diagnostics.push(Warning::UnclosedTag {
                name: open.tag.name.clone(),
            });
            if !open.emitted {
                let end = self.markup.len();
                self.emit(end..end, None);
            }
            self.stack.pop();
        }
        self.output
    }
}

fn open_emitted(stack: &[OpenTag]) -> bool {
    stack.last().map(|open| open.emitted).unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(names: &[&str]) -> AHashSet<SmartString> {
        let mut set = AHashSet::new();
        for name in names {
            set.insert(SmartString::from(*name));
        }
        set
    }

    fn parse_ok(markup: &str, names: &[&str]) -> Vec<TagToken> {
        let mut diagnostics = Diagnostics::new();
        let tokens = parse(markup, &known(names), &mut diagnostics);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.warnings());
        tokens
    }

    fn names(token: &TagToken) -> Vec<&str> {
        token.tags.iter().map(|tag| tag.name.as_str()).collect()
    }

    #[test]
    fn simple() {
        let tokens = parse_ok(" basic text  ", &["b"]);
        assert_eq!(
            tokens,
            vec![TagToken {
                text: " basic text  ".into(),
                tags: TagStack::new(),
                span: 0..13,
            }]
        );
    }

    #[test]
    fn empty_input() {
        assert!(parse_ok("", &["b"]).is_empty());
    }

    #[test]
    fn bold() {
        let tokens = parse_ok("basic text <b>bold text </b>", &["b"]);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "basic text ");
        assert!(tokens[0].tags.is_empty());
        assert_eq!(tokens[1].text, "bold text ");
        assert_eq!(names(&tokens[1]), ["b"]);
    }

    #[test]
    fn nested() {
        let tokens = parse_ok("<a>outer <b>inner</b></a> after", &["a", "b"]);
        assert_eq!(tokens.len(), 3);
        assert_eq!(names(&tokens[0]), ["a"]);
        assert_eq!(tokens[1].text, "inner");
        assert_eq!(names(&tokens[1]), ["a", "b"]);
        assert_eq!(tokens[1].tag_names(), "a,b");
        assert_eq!(tokens[2].text, " after");
        assert!(tokens[2].tags.is_empty());
    }

    #[test]
    fn attributes() {
        let tokens = parse_ok(r##"<c fill="#f00" size=12 note='a b'>hi</c>"##, &["c"]);
        let tag = &tokens[0].tags[0];
        assert_eq!(tag.name, "c");
        assert_eq!(tag.attributes.get("fill").map(|v| v.as_str()), Some("#f00"));
        assert_eq!(tag.attributes.get("size").map(|v| v.as_str()), Some("12"));
        assert_eq!(tag.attributes.get("note").map(|v| v.as_str()), Some("a b"));
    }

    #[test]
    fn unknown_tags_are_text() {
        let tokens = parse_ok("<x>hi</x> <b>there</b>", &["b"]);
        assert_eq!(tokens[0].text, "<x>hi</x> ");
        assert!(tokens[0].tags.is_empty());
        assert_eq!(tokens[1].text, "there");
    }

    #[test]
    fn angle_brackets_in_prose() {
        let tokens = parse_ok("1 < 2 > 0 <b>yes</b>", &["b"]);
        assert_eq!(tokens[0].text, "1 < 2 > 0 ");
    }

    #[test]
    fn self_closing() {
        let tokens = parse_ok("<b>a<icon/>b</b>", &["b", "icon"]);
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].text, "");
        assert_eq!(names(&tokens[1]), ["b", "icon"]);
        assert_eq!(tokens[1].span, 11..11);
        assert_eq!(names(&tokens[2]), ["b"]);
    }

    #[test]
    fn empty_pair_marks_position() {
        let tokens = parse_ok("x<icon></icon>y", &["icon"]);
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].text, "");
        assert_eq!(names(&tokens[1]), ["icon"]);
    }

    #[test]
    fn spans_match_text() {
        let markup = "a <b>bb <i>iii</i></b> <x>lit</x>";
        for token in parse_ok(markup, &["b", "i"]) {
            assert_eq!(&markup[token.span.clone()], token.text.as_str());
        }
    }

    #[test]
    fn unmatched_closing_tag() {
        let mut diagnostics = Diagnostics::new();
        let tokens = parse("x</b>y", &known(&["b"]), &mut diagnostics);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "x</b>y");
        assert_eq!(
            diagnostics.warnings(),
            [Warning::UnmatchedClosingTag { name: "b".into() }]
        );
    }

    #[test]
    fn misordered_closing_tag() {
        let mut diagnostics = Diagnostics::new();
        let tokens = parse("<a><b>x</a></b>", &known(&["a", "b"]), &mut diagnostics);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "x</a>");
        assert_eq!(names(&tokens[0]), ["a", "b"]);
        assert_eq!(
            diagnostics.warnings(),
            [
                Warning::MisorderedClosingTag {
                    found: "a".into(),
                    expected: "b".into()
                },
                Warning::UnclosedTag { name: "a".into() },
            ]
        );
    }

    #[test]
    fn malformed_attributes() {
        let mut diagnostics = Diagnostics::new();
        let tokens = parse("<b foo>bar", &known(&["b"]), &mut diagnostics);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "<b foo>bar");
        assert!(tokens[0].tags.is_empty());
        assert_eq!(diagnostics.warnings()[0].code(), "malformed-tag");
    }

    #[test]
    fn unclosed_image_still_emitted() {
        let mut diagnostics = Diagnostics::new();
        let tokens = parse("a<icon>", &known(&["icon"]), &mut diagnostics);
        assert_eq!(tokens.len(), 2);
        assert_eq!(names(&tokens[1]), ["icon"]);
        assert_eq!(diagnostics.warnings()[0].code(), "unclosed-tag");
    }

    #[test]
    fn remove_tags_strips_markup() {
        assert_eq!(
            remove_tags("<b>Hello</b> <icon/> <other x=1>w</other> 1 < 2"),
            "Hello  w 1 < 2"
        );
    }

    #[test]
    fn emoji_are_wrapped() {
        let tokens = wrap_emoji(parse_ok("<b>hi 👍🏽!</b>", &["b"]));
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].text, "hi ");
        assert_eq!(tokens[1].text, "👍🏽");
        assert_eq!(names(&tokens[1]), ["b", EMOJI_TAG]);
        assert_eq!(tokens[1].span, 6..14);
        assert_eq!(tokens[2].text, "!");
        assert_eq!(names(&tokens[2]), ["b"]);
    }

    #[test]
    fn removing_a_tag_can_reveal_another() {
        assert_eq!(remove_tags("<<b>b>"), "");
        assert_eq!(remove_tags("</<b>b>"), "");
        assert_eq!(remove_tags("<<b>x> y"), " y");
        assert_eq!(remove_tags("1 < 2 > 0"), "1 < 2 > 0");

        let tokens = parse("<<b>b>", &known(&["b"]), &mut Diagnostics::new());
        assert_eq!(plain_text(&tokens), "<b>");
        assert_eq!(remove_tags(&plain_text(&tokens)), remove_tags("<<b>b>"));
    }

    #[test]
    fn remove_tags_commutes_with_parse() {
        let pieces = [
            "hello", " ", "wörld", "<b>", "</b>", "<i>", "</i>", "<x>", "</x>", "\n", "<icon/>",
            "🙂", "<b c=1>", "<i foo>", "=", "\"", "<", "</", ">", "/>", "b", "x", "a=",
        ];
        let known = known(&["b", "i", "icon"]);
        let rng = fastrand::Rng::with_seed(7);
        for _ in 0..2000 {
            let len = rng.usize(0..16);
            let markup: String = (0..len)
                .map(|_| pieces[rng.usize(0..pieces.len())])
                .collect();
            let tokens = parse(&markup, &known, &mut Diagnostics::new());
            assert_eq!(
                remove_tags(&plain_text(&tokens)),
                remove_tags(&markup),
                "markup: {:?}",
                markup
            );
        }
    }
}
