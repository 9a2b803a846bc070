//! Text styles and the tag style cascade.
//!
//! Every property of a [`TextStyle`] is optional. Unset properties are
//! inherited from the enclosing tags and, finally, from the `default`
//! style of the [`TextStyleSet`].

use std::{borrow::Cow, collections::HashMap, str::FromStr};

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::{
    diagnostics::{Diagnostics, Warning},
    font::{FontStyle, Weight},
    image::ImageMap,
    markup::TagWithAttributes,
    text::layout::{Align, VAlign},
    SmartString,
};

pub use self::decoration::{DecorationKind, TextDecoration, TextDecorationMetrics};

pub mod decoration;

pub const DEFAULT_SIZE: f32 = 12.;

/// Name of the style every other style cascades from.
pub const DEFAULT_TAG: &str = "default";

/// Style of a run of text.
///
/// Optional fields are inherited if set to `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextStyle {
    pub font_family: Option<SmartString>,
    /// Font size in logical pixels.
    pub font_size: Option<f32>,
    pub font_weight: Option<Weight>,
    pub font_style: Option<FontStyle>,
    /// Text color. Interpreted by the renderer; decorations require a hex color.
    pub fill: Option<SmartString>,
    pub letter_spacing: Option<f32>,

    pub word_wrap: Option<bool>,
    pub word_wrap_width: Option<f32>,
    pub align: Option<Align>,
    pub valign: Option<VAlign>,
    /// Extra space between lines.
    pub line_spacing: Option<f32>,
    /// Extra space after a line ending in an explicit newline.
    pub paragraph_spacing: Option<f32>,
    /// Applied when drawing; content is stored untransformed.
    pub text_transform: Option<TextTransform>,

    pub text_decoration: Option<TextDecoration>,
    pub decoration_color: Option<SmartString>,
    pub decoration_thickness: Option<f32>,
    pub underline_color: Option<SmartString>,
    pub underline_thickness: Option<f32>,
    pub underline_offset: Option<f32>,
    pub overline_color: Option<SmartString>,
    pub overline_thickness: Option<f32>,
    pub overline_offset: Option<f32>,
    pub line_through_color: Option<SmartString>,
    pub line_through_thickness: Option<f32>,
    pub line_through_offset: Option<f32>,

    /// Key of an image in the [`ImageMap`]. Text with this property set
    /// is replaced by the image.
    pub img_src: Option<SmartString>,
    pub img_display: Option<ImageDisplay>,
    pub img_scale: Option<f32>,
    pub icon_scale: Option<f32>,
}

macro_rules! overlay {
    ($target:ident, $source:ident; $($field:ident),* $(,)?) => {
        $(
            if let Some(value) = &$source.$field {
                $target.$field = Some(value.clone());
            }
        )*
    };
}

impl TextStyle {
    pub fn font_size_or_default(&self) -> f32 {
        self.font_size.unwrap_or(DEFAULT_SIZE)
    }

    /// The width to wrap lines at. Setting a width enables wrapping
    /// unless `wordWrap` is explicitly false.
    pub fn wrap_width(&self) -> Option<f32> {
        match self.word_wrap {
            Some(false) => None,
            _ => self.word_wrap_width,
        }
    }

    /// Copies every property set in `other` over this style.
    pub fn merge(&mut self, other: &TextStyle) {
        let target = self;
        overlay!(target, other;
            font_family,
            font_size,
            font_weight,
            font_style,
            fill,
            letter_spacing,
            word_wrap,
            word_wrap_width,
            align,
            valign,
            line_spacing,
            paragraph_spacing,
            text_transform,
            text_decoration,
            decoration_color,
            decoration_thickness,
            underline_color,
            underline_thickness,
            underline_offset,
            overline_color,
            overline_thickness,
            overline_offset,
            line_through_color,
            line_through_thickness,
            line_through_offset,
            img_src,
            img_display,
            img_scale,
            icon_scale,
        );
    }

    /// Sets a property by its camelCase name, as used by tag attributes.
    pub fn set_property(&mut self, name: &str, value: &str) -> Result<(), PropertyError> {
        match name {
            "fontFamily" => self.font_family = Some(value.into()),
            "fontSize" => self.font_size = Some(length(value)?),
            "fontWeight" => {
                self.font_weight = Some(Weight::parse(value).ok_or(PropertyError::Invalid)?)
            }
            "fontStyle" => self.font_style = Some(parsed(value)?),
            "fill" | "color" => self.fill = Some(value.into()),
            "letterSpacing" => self.letter_spacing = Some(length(value)?),
            "wordWrap" => self.word_wrap = Some(parsed(value)?),
            "wordWrapWidth" => self.word_wrap_width = Some(length(value)?),
            "align" => self.align = Some(parsed(value)?),
            "valign" => self.valign = Some(parsed(value)?),
            "lineSpacing" => self.line_spacing = Some(length(value)?),
            "paragraphSpacing" => self.paragraph_spacing = Some(length(value)?),
            "textTransform" => self.text_transform = Some(parsed(value)?),
            "textDecoration" => self.text_decoration = Some(parsed(value)?),
            "decorationColor" => self.decoration_color = Some(value.into()),
            "decorationThickness" => self.decoration_thickness = Some(length(value)?),
            "underlineColor" => self.underline_color = Some(value.into()),
            "underlineThickness" => self.underline_thickness = Some(length(value)?),
            "underlineOffset" => self.underline_offset = Some(length(value)?),
            "overlineColor" => self.overline_color = Some(value.into()),
            "overlineThickness" => self.overline_thickness = Some(length(value)?),
            "overlineOffset" => self.overline_offset = Some(length(value)?),
            "lineThroughColor" => self.line_through_color = Some(value.into()),
            "lineThroughThickness" => self.line_through_thickness = Some(length(value)?),
            "lineThroughOffset" => self.line_through_offset = Some(length(value)?),
            "imgSrc" => self.img_src = Some(value.into()),
            "imgDisplay" => self.img_display = Some(parsed(value)?),
            "imgScale" => self.img_scale = Some(parsed(value)?),
            "iconScale" => self.icon_scale = Some(parsed(value)?),
            _ => return Err(PropertyError::Unknown),
        }
        Ok(())
    }

    /// Applies the text transform, if any.
    pub fn transform<'a>(&self, text: &'a str, word_start: bool) -> Cow<'a, str> {
        match self.text_transform {
            Some(transform) => transform.apply(text, word_start),
            None => Cow::Borrowed(text),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PropertyError {
    Unknown,
    Invalid,
}

fn parsed<T: FromStr>(value: &str) -> Result<T, PropertyError> {
    value.trim().parse().map_err(|_| PropertyError::Invalid)
}

/// A number of pixels, with or without a `px` suffix.
fn length(value: &str) -> Result<f32, PropertyError> {
    let value = value.trim();
    parsed(value.strip_suffix("px").unwrap_or(value))
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextTransform {
    None,
    Uppercase,
    Lowercase,
    Capitalize,
}

impl Default for TextTransform {
    fn default() -> Self {
        TextTransform::None
    }
}

impl TextTransform {
    /// Transforms `text`. With `capitalize`, the first letter is only
    /// raised if `word_start` says the text begins a word.
    pub fn apply(self, text: &str, word_start: bool) -> Cow<'_, str> {
        match self {
            TextTransform::None => Cow::Borrowed(text),
            TextTransform::Uppercase => Cow::Owned(text.to_uppercase()),
            TextTransform::Lowercase => Cow::Owned(text.to_lowercase()),
            TextTransform::Capitalize => {
                let mut result = String::with_capacity(text.len());
                let mut word_start = word_start;
                for c in text.chars() {
                    if word_start && c.is_alphanumeric() {
                        result.extend(c.to_uppercase());
                        word_start = false;
                    } else {
                        result.push(c);
                        if c.is_whitespace() {
                            word_start = true;
                        }
                    }
                }
                Cow::Owned(result)
            }
        }
    }
}

impl FromStr for TextTransform {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "none" => TextTransform::None,
            "uppercase" => TextTransform::Uppercase,
            "lowercase" => TextTransform::Lowercase,
            "capitalize" => TextTransform::Capitalize,
            _ => return Err(()),
        })
    }
}

/// How an image is sized within the text.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageDisplay {
    /// Intrinsic size times `imgScale`.
    Inline,
    /// Scaled to the font size times `iconScale`, keeping the aspect ratio.
    Icon,
    /// Like `Inline`, but alone on its line.
    Block,
}

impl Default for ImageDisplay {
    fn default() -> Self {
        ImageDisplay::Inline
    }
}

impl FromStr for ImageDisplay {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "inline" => ImageDisplay::Inline,
            "icon" => ImageDisplay::Icon,
            "block" => ImageDisplay::Block,
            _ => return Err(()),
        })
    }
}

impl FromStr for FontStyle {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(FontStyle::Normal),
            "italic" => Ok(FontStyle::Italic),
            _ => Err(()),
        }
    }
}

/// Merges styles left to right. Later styles win per property.
pub fn combine_all_styles<'a>(styles: impl IntoIterator<Item = &'a TextStyle>) -> TextStyle {
    let mut combined = TextStyle::default();
    for style in styles {
        combined.merge(style);
    }
    combined
}

/// The styles of all tags, by tag name.
///
/// Always contains a `default` style, which can never be an image.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(
    from = "HashMap<SmartString, TextStyle>",
    into = "HashMap<SmartString, TextStyle>"
)]
pub struct TextStyleSet {
    default: TextStyle,
    styles: AHashMap<SmartString, TextStyle>,
}

impl TextStyleSet {
    pub fn new(default_style: TextStyle) -> Self {
        let mut set = Self::default();
        set.insert(DEFAULT_TAG, default_style);
        set
    }

    /// Sets the style for a tag, replacing any previous one.
    ///
    /// An image source on the `default` style is removed and reported.
    pub fn insert(&mut self, tag: impl Into<SmartString>, mut style: TextStyle) -> Option<Warning> {
        let tag = tag.into();
        if tag != DEFAULT_TAG {
            self.styles.insert(tag, style);
            return None;
        }

        let warning = style.img_src.take().map(|key| {
            let warning = Warning::DefaultImageSource { key };
            log::warn!("[{}] {}", warning.code(), warning);
            warning
        });
        self.default = style;
        warning
    }

    /// Removes the style for a tag. Removing `default` resets it to an empty style.
    pub fn remove(&mut self, tag: &str) -> Option<TextStyle> {
        if tag == DEFAULT_TAG {
            return Some(std::mem::take(&mut self.default));
        }
        self.styles.remove(tag)
    }

    pub fn get(&self, tag: &str) -> Option<&TextStyle> {
        if tag == DEFAULT_TAG {
            return Some(&self.default);
        }
        self.styles.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        tag == DEFAULT_TAG || self.styles.contains_key(tag)
    }

    pub fn default_style(&self) -> &TextStyle {
        &self.default
    }

    /// Names that the markup parser treats as tags.
    pub fn tag_names(&self) -> AHashSet<SmartString> {
        let mut names = AHashSet::with_capacity(self.styles.len() + 1);
        names.insert(DEFAULT_TAG.into());
        for name in self.styles.keys() {
            names.insert(name.clone());
        }
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TextStyle)> {
        std::iter::once((DEFAULT_TAG, &self.default))
            .chain(self.styles.iter().map(|(name, style)| (name.as_str(), style)))
    }

    /// Whether every image in `images` already has a matching tag style.
    pub fn has_images(&self, images: &ImageMap) -> bool {
        images.names().all(|name| {
            self.styles
                .get(name)
                .map(|style| style.img_src.as_deref() == Some(name))
                .unwrap_or(false)
        })
    }

    /// Creates or augments a style for each image so that `<key/>` embeds it.
    pub fn register_images(&mut self, images: &ImageMap) -> Vec<Warning> {
        let mut warnings = Vec::new();
        for name in images.names() {
            if name == DEFAULT_TAG {
                let warning = Warning::DefaultImageSource { key: name.into() };
                log::warn!("[{}] {}", warning.code(), warning);
                warnings.push(warning);
                continue;
            }
            self.styles.entry(name.into()).or_default().img_src = Some(name.into());
        }
        warnings
    }

    /// The effective style of an explicit list of tags, outermost first,
    /// on top of the `default` style.
    pub fn style_for_tags<'a>(&self, tags: impl IntoIterator<Item = &'a str>) -> TextStyle {
        let mut style = self.default.clone();
        for tag in tags {
            if let Some(tag_style) = self.styles.get(tag) {
                style.merge(tag_style);
            }
        }
        style
    }
}

impl From<HashMap<SmartString, TextStyle>> for TextStyleSet {
    fn from(styles: HashMap<SmartString, TextStyle>) -> Self {
        let mut set = Self::default();
        for (tag, style) in styles {
            set.insert(tag, style);
        }
        set
    }
}

impl From<TextStyleSet> for HashMap<SmartString, TextStyle> {
    fn from(set: TextStyleSet) -> Self {
        let mut styles: HashMap<_, _> = set.styles.into_iter().collect();
        styles.insert(DEFAULT_TAG.into(), set.default);
        styles
    }
}

/// Resolves the style of a run of text from the tags enclosing it.
///
/// Starts from `default`, then for each tag from outermost to innermost
/// merges its registered style followed by the tag's own attributes.
/// Inner tags win per property.
pub fn resolve_style(
    tags: &[TagWithAttributes],
    styles: &TextStyleSet,
    images: &ImageMap,
    diagnostics: &mut Diagnostics,
) -> TextStyle {
    let mut style = styles.default_style().clone();
    for tag in tags {
        if let Some(tag_style) = styles.get(&tag.name) {
            style.merge(tag_style);
        }
        for (attribute, value) in &tag.attributes {
            match style.set_property(attribute, value) {
                Ok(()) => {}
                Err(PropertyError::Unknown) => diagnostics.push(Warning::UnknownAttribute {
                    tag: tag.name.clone(),
                    attribute: attribute.clone(),
                }),
                Err(PropertyError::Invalid) => diagnostics.push(Warning::InvalidAttribute {
                    tag: tag.name.clone(),
                    attribute: attribute.clone(),
                    value: value.clone(),
                }),
            }
        }
    }

    if let Some(key) = &style.img_src {
        if !images.contains(key) {
            diagnostics.push(Warning::UnknownImage { key: key.clone() });
            style.img_src = None;
        }
    }

    style
}
