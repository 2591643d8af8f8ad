//! The code-block surface the copy affordance operates on.

/// Attribute driving the visual prompt on a code block.
pub const HINT_ATTR: &str = "click-to-copy";

/// Hint shown while hovering a copyable block.
pub const PROMPT: &str = "click to copy...";

/// Hint shown after a successful copy.
pub const CONFIRMED: &str = "copied!";

/// A rendered code block as the affordance sees it: its text content,
/// whether it sits inside a line-number gutter, and the current hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRegion {
    text: String,
    in_gutter: bool,
    hint: Option<String>,
}

impl CodeRegion {
    /// A copyable code block.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            in_gutter: false,
            hint: None,
        }
    }

    /// A code block rendered inside a line-number gutter.
    ///
    /// Gutter columns stay selectable but never take part in click-to-copy.
    pub fn gutter(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            in_gutter: true,
            hint: None,
        }
    }

    /// Full text content of the block.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the block belongs to a line-number gutter.
    pub fn in_gutter(&self) -> bool {
        self.in_gutter
    }

    /// Current value of the hint attribute, if any handler has set it.
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub(crate) fn set_hint(&mut self, value: &str) {
        self.hint = Some(value.to_string());
    }
}
