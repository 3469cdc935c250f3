//! Class label lookup

use rps_common::config::DEFAULT_LABELS;

/// Label reported when the best score is below the confidence threshold
pub const UNKNOWN_LABEL: &str = "unknown";

/// Ordered class names; position `i` names output score `i`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    names: Vec<String>,
}

impl LabelSet {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl Default for LabelSet {
    /// paper, rock, scissors
    fn default() -> Self {
        Self::new(DEFAULT_LABELS.iter().map(|s| s.to_string()).collect())
    }
}
