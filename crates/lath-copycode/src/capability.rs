//! Ordered probing of text-selection capabilities.
//!
//! A page exposes at most a couple of ways to read the active selection: a
//! primary selection API and, on older platforms, a legacy range-based one.
//! The reader probes its capabilities in order and uses the first one that
//! answers, instead of poking at loosely-typed properties.

/// One way of reading the active text selection.
pub trait SelectionCapability {
    /// Capability identifier, for diagnostics.
    fn name(&self) -> &'static str;

    /// Whether this capability exists on the current page.
    fn available(&self) -> bool;

    /// The selected text. Only called when [`available`](Self::available)
    /// returned true; an empty string means nothing is selected.
    fn text(&self) -> String;
}

/// Errors raised while probing selection capabilities.
#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("no selection capability available")]
    Unsupported,
}

/// Reads the selection through an ordered capability chain.
pub struct SelectionReader {
    capabilities: Vec<Box<dyn SelectionCapability>>,
}

impl SelectionReader {
    /// Build a reader that probes `capabilities` front to back.
    pub fn new(capabilities: Vec<Box<dyn SelectionCapability>>) -> Self {
        Self { capabilities }
    }

    /// Read the selection from the first available capability.
    pub fn read(&self) -> Result<String, CapabilityError> {
        for capability in &self.capabilities {
            if capability.available() {
                return Ok(capability.text());
            }
        }
        Err(CapabilityError::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        name: &'static str,
        available: bool,
        text: &'static str,
    }

    impl SelectionCapability for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        fn available(&self) -> bool {
            self.available
        }

        fn text(&self) -> String {
            self.text.to_string()
        }
    }

    #[test]
    fn prefers_the_first_available_capability() {
        let reader = SelectionReader::new(vec![
            Box::new(Fixed {
                name: "primary",
                available: true,
                text: "from primary",
            }),
            Box::new(Fixed {
                name: "legacy",
                available: true,
                text: "from legacy",
            }),
        ]);

        assert_eq!(reader.read().unwrap(), "from primary");
    }

    #[test]
    fn falls_back_when_the_first_is_missing() {
        let reader = SelectionReader::new(vec![
            Box::new(Fixed {
                name: "primary",
                available: false,
                text: "",
            }),
            Box::new(Fixed {
                name: "legacy",
                available: true,
                text: "from legacy",
            }),
        ]);

        assert_eq!(reader.read().unwrap(), "from legacy");
    }

    #[test]
    fn reports_unsupported_when_nothing_answers() {
        let reader = SelectionReader::new(vec![Box::new(Fixed {
            name: "primary",
            available: false,
            text: "",
        })]);

        assert!(matches!(reader.read(), Err(CapabilityError::Unsupported)));
    }

    #[test]
    fn empty_chain_is_unsupported() {
        let reader = SelectionReader::new(Vec::new());

        assert!(matches!(reader.read(), Err(CapabilityError::Unsupported)));
    }
}
