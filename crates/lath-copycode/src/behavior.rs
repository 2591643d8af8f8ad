//! Hover and mouse-up handling for code blocks.

use crate::capability::SelectionReader;
use crate::clipboard::{copy_text, ClipboardTarget};
use crate::surface::{CodeRegion, CONFIRMED, PROMPT};

/// What a mouse-up on a code block ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The block is part of a line-number gutter; nothing happened.
    Ignored,

    /// The reader holds a non-empty selection; manual copy is respected.
    SelectionHeld,

    /// The block text was copied and the hint confirms it.
    Copied,

    /// The copy command failed; the hint still shows the prompt.
    Failed,
}

/// Pointer entered a code block: show the copy prompt.
pub fn on_hover(region: &mut CodeRegion) {
    if region.in_gutter() {
        return;
    }
    region.set_hint(PROMPT);
}

/// Pointer released over a code block.
///
/// The prompt is re-asserted first, then the active selection is read
/// through the capability chain. A non-empty selection means the reader is
/// copying by hand, so the block stays untouched. Otherwise the block's
/// full text goes through the clipboard staging sequence; only a reported
/// success flips the hint to the confirmation.
pub fn on_mouse_up(
    region: &mut CodeRegion,
    selection: &SelectionReader,
    clipboard: &mut dyn ClipboardTarget,
) -> CopyOutcome {
    if region.in_gutter() {
        return CopyOutcome::Ignored;
    }

    region.set_hint(PROMPT);

    // A page without any selection capability reads as "nothing selected".
    let selected = selection.read().unwrap_or_default();
    if !selected.trim().is_empty() {
        return CopyOutcome::SelectionHeld;
    }

    let text = region.text().to_string();
    if copy_text(clipboard, &text) {
        region.set_hint(CONFIRMED);
        CopyOutcome::Copied
    } else {
        CopyOutcome::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::SelectionCapability;
    use crate::clipboard::testing::FakeClipboard;
    use pretty_assertions::assert_eq;

    struct Selection(Option<&'static str>);

    impl SelectionCapability for Selection {
        fn name(&self) -> &'static str {
            "test"
        }

        fn available(&self) -> bool {
            self.0.is_some()
        }

        fn text(&self) -> String {
            self.0.unwrap_or_default().to_string()
        }
    }

    fn reader(selection: Option<&'static str>) -> SelectionReader {
        SelectionReader::new(vec![Box::new(Selection(selection))])
    }

    #[test]
    fn hover_sets_the_prompt() {
        let mut region = CodeRegion::new("echo hello");

        on_hover(&mut region);

        assert_eq!(region.hint(), Some(PROMPT));
    }

    #[test]
    fn hover_skips_gutter_blocks() {
        let mut region = CodeRegion::gutter("1\n2");

        on_hover(&mut region);

        assert_eq!(region.hint(), None);
    }

    #[test]
    fn mouse_up_copies_block_text_exactly() {
        let mut region = CodeRegion::new("echo hello");
        let mut clipboard = FakeClipboard::new(true);

        let outcome = on_mouse_up(&mut region, &reader(Some("")), &mut clipboard);

        assert_eq!(outcome, CopyOutcome::Copied);
        assert_eq!(clipboard.contents.as_deref(), Some("echo hello"));
        assert_eq!(region.hint(), Some(CONFIRMED));
    }

    #[test]
    fn active_selection_wins_over_copy() {
        let mut region = CodeRegion::new("echo hello");
        let mut clipboard = FakeClipboard::new(true);

        let outcome = on_mouse_up(&mut region, &reader(Some("hel")), &mut clipboard);

        assert_eq!(outcome, CopyOutcome::SelectionHeld);
        assert_eq!(clipboard.contents, None);
        assert_eq!(region.hint(), Some(PROMPT));
    }

    #[test]
    fn whitespace_selection_does_not_block_the_copy() {
        let mut region = CodeRegion::new("echo hello");
        let mut clipboard = FakeClipboard::new(true);

        let outcome = on_mouse_up(&mut region, &reader(Some("  \n")), &mut clipboard);

        assert_eq!(outcome, CopyOutcome::Copied);
        assert_eq!(clipboard.contents.as_deref(), Some("echo hello"));
    }

    #[test]
    fn unsupported_page_still_copies() {
        let mut region = CodeRegion::new("echo hello");
        let mut clipboard = FakeClipboard::new(true);

        let outcome = on_mouse_up(&mut region, &reader(None), &mut clipboard);

        assert_eq!(outcome, CopyOutcome::Copied);
        assert_eq!(clipboard.contents.as_deref(), Some("echo hello"));
    }

    #[test]
    fn failed_copy_keeps_the_prompt() {
        let mut region = CodeRegion::new("echo hello");
        let mut clipboard = FakeClipboard::new(false);

        let outcome = on_mouse_up(&mut region, &reader(Some("")), &mut clipboard);

        assert_eq!(outcome, CopyOutcome::Failed);
        assert_eq!(clipboard.contents, None);
        assert_eq!(region.hint(), Some(PROMPT));
    }

    #[test]
    fn gutter_blocks_never_take_the_hint() {
        let mut region = CodeRegion::gutter("1\n2\n3");
        let mut clipboard = FakeClipboard::new(true);

        let outcome = on_mouse_up(&mut region, &reader(Some("")), &mut clipboard);

        assert_eq!(outcome, CopyOutcome::Ignored);
        assert_eq!(clipboard.contents, None);
        assert_eq!(region.hint(), None);
    }
}
