//! Clipboard staging target.
//!
//! Copying never touches the clipboard directly: the text is staged in a
//! temporary holding area, the platform copy command is issued against the
//! staged selection, and the staging area is discarded again. This is the
//! same dance the browser script performs with an off-tree textarea.

/// Destination for a staged copy.
pub trait ClipboardTarget {
    /// Place `text` in the staging area and select it.
    fn stage(&mut self, text: &str);

    /// Issue the platform copy command against the staged selection.
    /// Returns whether the command reported success.
    fn exec_copy(&mut self) -> bool;

    /// Remove the staging area, whether or not the copy succeeded.
    fn discard(&mut self);
}

/// Run the full stage/copy/discard sequence for `text`.
pub fn copy_text(target: &mut dyn ClipboardTarget, text: &str) -> bool {
    target.stage(text);
    let copied = target.exec_copy();
    target.discard();
    copied
}

#[cfg(test)]
pub(crate) mod testing {
    use super::ClipboardTarget;

    /// Records the staging dance and lands staged text on success.
    pub struct FakeClipboard {
        pub succeed: bool,
        pub staged: Option<String>,
        pub contents: Option<String>,
        pub discards: usize,
    }

    impl FakeClipboard {
        pub fn new(succeed: bool) -> Self {
            Self {
                succeed,
                staged: None,
                contents: None,
                discards: 0,
            }
        }
    }

    impl ClipboardTarget for FakeClipboard {
        fn stage(&mut self, text: &str) {
            self.staged = Some(text.to_string());
        }

        fn exec_copy(&mut self) -> bool {
            if self.succeed {
                self.contents = self.staged.clone();
            }
            self.succeed
        }

        fn discard(&mut self) {
            self.staged = None;
            self.discards += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeClipboard;
    use super::*;

    #[test]
    fn successful_copy_lands_and_discards() {
        let mut clipboard = FakeClipboard::new(true);

        assert!(copy_text(&mut clipboard, "echo hello"));
        assert_eq!(clipboard.contents.as_deref(), Some("echo hello"));
        assert_eq!(clipboard.staged, None);
        assert_eq!(clipboard.discards, 1);
    }

    #[test]
    fn failed_copy_still_discards_the_stage() {
        let mut clipboard = FakeClipboard::new(false);

        assert!(!copy_text(&mut clipboard, "echo hello"));
        assert_eq!(clipboard.contents, None);
        assert_eq!(clipboard.staged, None);
        assert_eq!(clipboard.discards, 1);
    }
}
