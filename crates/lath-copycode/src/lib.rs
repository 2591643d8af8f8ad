//! Click-to-copy behavior for rendered code blocks.
//!
//! Documentation pages mark every code block with a hint attribute that
//! invites the reader to copy the block with a single click, while staying
//! out of the way of manual text selection. This crate models that
//! affordance against small traits (selection capabilities, a clipboard
//! staging target) so the contract is testable without a browser, and emits
//! the equivalent standalone script for real pages.

pub mod behavior;
pub mod capability;
pub mod clipboard;
pub mod script;
pub mod surface;

pub use behavior::{on_hover, on_mouse_up, CopyOutcome};
pub use capability::{CapabilityError, SelectionCapability, SelectionReader};
pub use clipboard::{copy_text, ClipboardTarget};
pub use script::browser_script;
pub use surface::{CodeRegion, CONFIRMED, HINT_ATTR, PROMPT};
