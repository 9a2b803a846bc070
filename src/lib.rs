//! Rich text layout for tagged markup.
//!
//! A string like `"<b>Hello</b> <icon/> world"` plus a tag → style dictionary
//! is turned into a measured, positioned tree of tokens ready for drawing.
//!
//! The pipeline runs in four synchronous stages:
//!
//! 1. [`markup::parse`] finds the tags and annotates each run of text with the
//!    stack of tags enclosing it.
//! 2. [`style::resolve_style`] cascades the style of every tag in the stack
//!    on top of the `default` style.
//! 3. [`text::segment`] splits styled runs into words, characters or lines,
//!    keeping whitespace and newlines as their own tokens and replacing image
//!    tags with sprite tokens.
//! 4. [`text::layout`] measures every token through a [`Measurer`], wraps
//!    lines greedily and computes the final bounds.
//!
//! [`layout`] runs the whole pipeline; [`TaggedText`] keeps the inputs around
//! and re-runs it when they change.

pub mod color;
mod context;
pub mod debug;
pub mod diagnostics;
pub mod font;
pub mod image;
pub mod markup;
mod rect;
pub mod style;
pub mod text;

pub use context::{layout, LayoutInput, LayoutOutput, TaggedText};
pub use debug::DebugConfig;
pub use diagnostics::{Diagnostics, Warning};
pub use font::{FontMetrics, FontStyle, Measurer, MonospaceMeasurer, Weight};
pub use image::{ImageId, ImageMap};
pub use rect::Rect;
pub use style::{TextStyle, TextStyleSet};
pub use text::{
    layout::{LayoutError, TextOptions},
    segment::SplitStyle,
    FinalToken, LineToken, ParagraphToken, Sprite, TokenContent, WordToken,
};

pub use glam::Vec2;

use smartstring::LazyCompact;

pub type SmartString = smartstring::SmartString<LazyCompact>;
