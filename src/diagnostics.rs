//! Non-fatal problems found while parsing markup or resolving styles.
//!
//! None of these stop layout. They are collected into a [`Diagnostics`]
//! sink, which also forwards each one to `log::warn!`.

use crate::SmartString;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Warning {
    #[error("closing tag `</{name}>` has no matching open tag; treating it as text")]
    UnmatchedClosingTag { name: SmartString },
    #[error("closing tag `</{found}>` does not match the open tag `<{expected}>`; treating it as text")]
    MisorderedClosingTag {
        found: SmartString,
        expected: SmartString,
    },
    #[error("tag `<{name}>` was never closed")]
    UnclosedTag { name: SmartString },
    #[error("malformed attributes in tag `{markup}`; treating it as text")]
    MalformedTag { markup: String },
    #[error("the default style cannot be an image (imgSrc = `{key}`); removing imgSrc")]
    DefaultImageSource { key: SmartString },
    #[error("no image registered for imgSrc `{key}`")]
    UnknownImage { key: SmartString },
    #[error("unknown attribute `{attribute}` on tag `<{tag}>`")]
    UnknownAttribute {
        tag: SmartString,
        attribute: SmartString,
    },
    #[error("invalid value `{value}` for attribute `{attribute}` on tag `<{tag}>`")]
    InvalidAttribute {
        tag: SmartString,
        attribute: SmartString,
        value: SmartString,
    },
}

impl Warning {
    /// A stable identifier for the kind of warning.
    pub fn code(&self) -> &'static str {
        match self {
            Warning::UnmatchedClosingTag { .. } => "unmatched-closing-tag",
            Warning::MisorderedClosingTag { .. } => "misordered-closing-tag",
            Warning::UnclosedTag { .. } => "unclosed-tag",
            Warning::MalformedTag { .. } => "malformed-tag",
            Warning::DefaultImageSource { .. } => "default-image-source",
            Warning::UnknownImage { .. } => "unknown-image",
            Warning::UnknownAttribute { .. } => "unknown-attribute",
            Warning::InvalidAttribute { .. } => "invalid-attribute",
        }
    }
}

/// Collects the warnings of one pipeline run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a warning. Repeats of an already recorded warning are dropped.
    pub fn push(&mut self, warning: Warning) {
        if self.warnings.contains(&warning) {
            return;
        }
        log::warn!("[{}] {}", warning.code(), warning);
        self.warnings.push(warning);
    }

    pub fn extend(&mut self, warnings: impl IntoIterator<Item = Warning>) {
        for warning in warnings {
            self.push(warning);
        }
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeats_are_dropped() {
        let mut diagnostics = Diagnostics::new();
        let warning = Warning::UnknownImage { key: "x".into() };
        diagnostics.push(warning.clone());
        diagnostics.push(Warning::UnclosedTag { name: "b".into() });
        diagnostics.push(warning);
        assert_eq!(diagnostics.warnings().len(), 2);
        assert_eq!(diagnostics.warnings()[0].code(), "unknown-image");
    }

    #[test]
    fn display() {
        let warning = Warning::MisorderedClosingTag {
            found: "a".into(),
            expected: "b".into(),
        };
        assert_eq!(
            warning.to_string(),
            "closing tag `</a>` does not match the open tag `<b>`; treating it as text"
        );
    }
}
