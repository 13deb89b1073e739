//! Action buttons attached to a card.

use serde::Serialize;

/// One action button. `target` is an opaque action URI handled by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonDescription {
    pub label: Option<String>,
    pub icon: Option<String>,
    pub target: String,
}

impl ButtonDescription {
    pub fn new(label: Option<&str>, icon: Option<&str>, target: impl Into<String>) -> Self {
        Self {
            label: label.map(String::from),
            icon: icon.map(String::from),
            target: target.into(),
        }
    }

    /// An icon-only button.
    pub fn icon(icon: &str, target: impl Into<String>) -> Self {
        Self::new(None, Some(icon), target)
    }
}
