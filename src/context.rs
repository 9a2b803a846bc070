use std::{borrow::Cow, sync::Arc};

use glam::Vec2;

use crate::{
    debug::{describe, DebugConfig},
    diagnostics::{Diagnostics, Warning},
    font::Measurer,
    image::{ImageId, ImageMap},
    markup,
    rect::Rect,
    style::resolve_style,
    text::{
        bounds_nested,
        layout::{lay_out, LayoutError, TextOptions},
        segment::{segment_all, StyledToken},
        ParagraphToken,
    },
    TextStyle, TextStyleSet,
};

/// Everything one layout run depends on.
#[derive(Debug, Clone, Copy)]
pub struct LayoutInput<'a> {
    /// Markup text.
    pub text: &'a str,
    pub styles: &'a TextStyleSet,
    pub images: &'a ImageMap,
    pub options: &'a TextOptions,
}

#[derive(Debug, Clone, Default)]
pub struct LayoutOutput {
    pub paragraph: ParagraphToken,
    /// Problems found in the markup or styles. None of them stopped layout.
    pub warnings: Vec<Warning>,
}

/// Runs the whole pipeline: parse, resolve styles, segment and lay out.
///
/// Holds no state between runs, so it is always safe to run again
/// from scratch when any input changes.
pub fn layout(input: &LayoutInput, measurer: &dyn Measurer) -> Result<LayoutOutput, LayoutError> {
    let mut diagnostics = Diagnostics::new();

    let styles = if input.styles.has_images(input.images) {
        Cow::Borrowed(input.styles)
    } else {
        let mut styles = input.styles.clone();
        diagnostics.extend(styles.register_images(input.images));
        Cow::Owned(styles)
    };

    let known_tags = styles.tag_names();
    let mut tokens = markup::parse(input.text, &known_tags, &mut diagnostics);
    if input.options.wrap_emoji {
        tokens = markup::wrap_emoji(tokens);
    }

    // Runs with the same tags share one style.
    let mut styled: Vec<StyledToken> = Vec::with_capacity(tokens.len());
    for token in tokens {
        let style = match styled.last() {
            Some(previous) if previous.tags == token.tags => Arc::clone(&previous.style),
            _ => Arc::new(resolve_style(
                &token.tags,
                &styles,
                input.images,
                &mut diagnostics,
            )),
        };
        styled.push(StyledToken::new(token, style));
    }

    let fragments = segment_all(&styled, input.options.split_style, input.images);
    let paragraph = lay_out(
        fragments,
        styles.default_style(),
        input.options,
        input.images,
        measurer,
    )?;

    Ok(LayoutOutput {
        paragraph,
        warnings: diagnostics.into_warnings(),
    })
}

/// Rich text that keeps its inputs and lays itself out again when they change.
///
/// Setters only mark the text as outdated; call [`update`](Self::update)
/// to run the pipeline.
pub struct TaggedText {
    text: String,
    styles: TextStyleSet,
    images: ImageMap,
    options: TextOptions,
    measurer: Box<dyn Measurer>,

    output: LayoutOutput,
    needs_update: bool,
    needs_draw: bool,
}

impl TaggedText {
    pub fn new(
        text: impl Into<String>,
        styles: TextStyleSet,
        options: TextOptions,
        measurer: impl Measurer + 'static,
    ) -> Self {
        Self {
            text: text.into(),
            styles,
            images: ImageMap::new(),
            options,
            measurer: Box::new(measurer),

            output: LayoutOutput::default(),
            needs_update: true,
            needs_draw: true,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.text {
            self.text = text;
            self.needs_update = true;
        }
    }

    /// The text with every tag removed.
    pub fn untagged_text(&self) -> String {
        markup::remove_tags(&self.text)
    }

    pub fn tag_styles(&self) -> &TextStyleSet {
        &self.styles
    }

    pub fn set_tag_styles(&mut self, styles: TextStyleSet) {
        self.styles = styles;
        self.needs_update = true;
    }

    pub fn set_style_for_tag(&mut self, tag: &str, style: TextStyle) -> Option<Warning> {
        self.needs_update = true;
        self.styles.insert(tag, style)
    }

    pub fn remove_style_for_tag(&mut self, tag: &str) -> Option<TextStyle> {
        self.needs_update = true;
        self.styles.remove(tag)
    }

    pub fn default_style(&self) -> &TextStyle {
        self.styles.default_style()
    }

    pub fn set_default_style(&mut self, style: TextStyle) -> Option<Warning> {
        self.set_style_for_tag(crate::style::DEFAULT_TAG, style)
    }

    pub fn images(&self) -> &ImageMap {
        &self.images
    }

    /// Registers an image, which can then be embedded with `<name/>`.
    ///
    /// Pass a zero size if the image has not loaded yet.
    pub fn register_image(&mut self, name: &str, size: Vec2) -> ImageId {
        let id = self.images.insert(name, size);
        self.needs_update = true;
        id
    }

    pub fn remove_image(&mut self, name: &str) -> Option<ImageId> {
        self.needs_update = true;
        self.images.remove(name)
    }

    /// Called when the size of an image becomes known.
    pub fn set_image_size(&mut self, id: ImageId, size: Vec2) {
        if self.images.set_size(id, size) {
            log::trace!("Image {:?} resized to {:?}", id, size);
            self.needs_update = true;
        }
    }

    pub fn options(&self) -> &TextOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: TextOptions) {
        if options != self.options {
            self.options = options;
            self.needs_update = true;
        }
    }

    pub fn set_measurer(&mut self, measurer: impl Measurer + 'static) {
        self.measurer = Box::new(measurer);
        self.needs_update = true;
    }

    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Whether the layout changed since [`mark_drawn`](Self::mark_drawn) was last called.
    pub fn needs_draw(&self) -> bool {
        self.needs_draw
    }

    pub fn mark_drawn(&mut self) {
        self.needs_draw = false;
    }

    /// Lays out the text again if any input changed.
    ///
    /// On error the previous layout is kept and the text stays outdated.
    pub fn update(&mut self) -> Result<&ParagraphToken, LayoutError> {
        if self.needs_update {
            let input = LayoutInput {
                text: &self.text,
                styles: &self.styles,
                images: &self.images,
                options: &self.options,
            };
            self.output = layout(&input, &*self.measurer)?;
            self.needs_update = false;
            self.needs_draw = true;
        }
        Ok(&self.output.paragraph)
    }

    /// The last computed layout. Empty before the first [`update`](Self::update).
    pub fn paragraph(&self) -> &ParagraphToken {
        &self.output.paragraph
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.output.warnings
    }

    /// Bounds of the last computed layout.
    pub fn bounds(&self) -> Rect {
        bounds_nested(&self.output.paragraph)
    }

    pub fn debug_description(&self, config: &DebugConfig) -> String {
        describe(&self.output.paragraph, config)
    }
}

#[cfg(test)]
mod tests {
    use glam::vec2;

    use super::*;
    use crate::MonospaceMeasurer;

    fn tagged(text: &str) -> TaggedText {
        let mut styles = TextStyleSet::new(TextStyle {
            font_size: Some(10.),
            ..Default::default()
        });
        styles.insert(
            "b",
            TextStyle {
                font_weight: Some(crate::Weight::Bold),
                ..Default::default()
            },
        );
        TaggedText::new(text, styles, TextOptions::default(), MonospaceMeasurer::default())
    }

    #[test]
    fn update_only_when_needed() {
        let mut text = tagged("<b>Hello</b> world");
        assert!(text.needs_update());
        assert!(text.paragraph().is_empty());

        text.update().unwrap();
        assert!(!text.needs_update());
        assert!(text.needs_draw());
        assert_eq!(text.bounds(), Rect::from_xywh(0., 0., 55., 10.));

        text.mark_drawn();
        text.set_text("<b>Hello</b> world");
        assert!(!text.needs_update());

        text.set_text("Hi");
        assert!(text.needs_update());
        text.update().unwrap();
        assert!(text.needs_draw());
        assert_eq!(text.bounds().width(), 10.);
    }

    #[test]
    fn untagged() {
        let text = tagged("<b>Hello</b> <i>world</i>");
        assert_eq!(text.untagged_text(), "Hello world");
    }

    #[test]
    fn late_image_size() {
        let mut text = tagged("a<icon/>");
        let id = text.register_image("icon", Vec2::ZERO);
        text.update().unwrap();
        let sprite = text.paragraph()[0][0][1].clone();
        assert!(sprite.is_sprite());
        assert_eq!(sprite.bounds.width(), 0.);

        text.set_image_size(id, vec2(8., 4.));
        assert!(text.needs_update());
        text.update().unwrap();
        assert_eq!(text.paragraph()[0][0][1].bounds.size, vec2(8., 4.));
    }

    #[test]
    fn failed_update_keeps_old_layout() {
        let mut text = tagged("<b>a</b>");
        text.update().unwrap();
        text.set_style_for_tag(
            "b",
            TextStyle {
                text_decoration: Some("underline".parse().unwrap()),
                fill: Some("red".into()),
                ..Default::default()
            },
        );
        assert!(text.update().is_err());
        assert!(text.needs_update());
        assert_eq!(text.paragraph().len(), 1);
    }

    #[test]
    fn warnings_are_kept() {
        let mut text = tagged("<b>a</b></b>");
        text.update().unwrap();
        assert_eq!(text.warnings()[0].code(), "unmatched-closing-tag");
    }
}
