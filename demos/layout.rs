//! Lays out a paragraph of tagged text and prints the resulting token tree.

use glam::vec2;
use tagtext::{debug::DebugConfig, MonospaceMeasurer, TaggedText, TextOptions, TextStyleSet};

const STYLES: &str = r##"{
    "default": { "fontSize": 16, "wordWrapWidth": 240, "lineSpacing": 4 },
    "title": { "fontSize": 24, "align": "center", "paragraphSpacing": 8 },
    "b": { "fontWeight": "bold" },
    "u": { "textDecoration": "underline", "fill": "#3366ff" },
    "icon": { "imgDisplay": "icon" }
}"##;

const TEXT: &str = "<title>Tagged text</title>\n\
    Text can be <b>bold</b>, <u>underlined</u> or <b><u>both</u></b>. \
    Images flow with the text <icon/> and unknown <tags> stay as they are. 👍🏽";

fn main() {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Debug)
        .init()
        .unwrap();

    let styles: TextStyleSet = serde_json::from_str(STYLES).unwrap();
    let mut text = TaggedText::new(TEXT, styles, TextOptions::default(), MonospaceMeasurer::default());
    let icon = text.register_image("icon", vec2(0., 0.));

    text.update().unwrap();
    println!("{}", text.debug_description(&DebugConfig::default()));

    // The image finished loading.
    text.set_image_size(icon, vec2(64., 64.));
    text.update().unwrap();
    println!("{}", text.debug_description(&DebugConfig::default()));
    println!("bounds: {:?}", text.bounds());
    println!("plain text: {}", text.untagged_text());
}
