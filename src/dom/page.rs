use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dom::selector::Selector;

/// Opaque handle to an element of a live page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// Notifications the page's own reactive code listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomEvent {
    Input,
    Change,
    Click,
    Focus,
    Blur,
}

impl DomEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DomEvent::Input => "input",
            DomEvent::Change => "change",
            DomEvent::Click => "click",
            DomEvent::Focus => "focus",
            DomEvent::Blur => "blur",
        }
    }
}

/// An `<option>` of a native select: underlying value and display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum PageError {
    /// The handle no longer refers to an element of the page
    #[error("Stale node handle {0:?}")]
    StaleNode(NodeId),

    /// The operation does not apply to this element
    #[error("Unsupported operation '{operation}' on <{tag}>")]
    Unsupported { operation: String, tag: String },

    /// The browser backend could not be reached
    #[error("Page I/O failed: {0}")]
    Io(String),

    /// The browser backend answered with an error
    #[error("Page command '{command}' failed: {error}")]
    Protocol { command: String, error: String },
}

/// Everything the fill engine needs from a live document.
///
/// Reads take `&self`; anything that mutates the page or may trigger page
/// scripts takes `&mut self`. Queries return elements in document order.
pub trait Page {
    /// All elements under `scope` (or the whole document) matching `selector`.
    /// The scope element itself is never part of the result.
    fn query_all(&self, scope: Option<NodeId>, selector: &Selector) -> Result<Vec<NodeId>, PageError>;

    fn query(&self, scope: Option<NodeId>, selector: &Selector) -> Result<Option<NodeId>, PageError> {
        Ok(self.query_all(scope, selector)?.into_iter().next())
    }

    /// The element itself or its nearest ancestor matching `selector`.
    fn closest(&self, node: NodeId, selector: &Selector) -> Result<Option<NodeId>, PageError>;

    /// Lowercase tag name.
    fn tag_name(&self, node: NodeId) -> Result<String, PageError>;

    fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>, PageError>;

    fn has_class(&self, node: NodeId, class: &str) -> Result<bool, PageError> {
        Ok(self
            .attribute(node, "class")?
            .map(|c| c.split_whitespace().any(|token| token == class))
            .unwrap_or(false))
    }

    fn text_content(&self, node: NodeId) -> Result<String, PageError>;

    fn is_disabled(&self, node: NodeId) -> Result<bool, PageError>;

    fn is_content_editable(&self, node: NodeId) -> Result<bool, PageError>;

    /// Current `value` property (not the attribute).
    fn value(&self, node: NodeId) -> Result<String, PageError>;

    fn is_checked(&self, node: NodeId) -> Result<bool, PageError>;

    /// Options of a `<select>`; empty for anything else.
    fn select_options(&self, node: NodeId) -> Result<Vec<SelectOption>, PageError>;

    fn set_value(&mut self, node: NodeId, value: &str) -> Result<(), PageError>;

    fn set_checked(&mut self, node: NodeId, checked: bool) -> Result<(), PageError>;

    fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<(), PageError>;

    fn focus(&mut self, node: NodeId) -> Result<(), PageError>;

    fn blur(&mut self, node: NodeId) -> Result<(), PageError>;

    /// Primary-button click, including the page's click handlers.
    fn click(&mut self, node: NodeId) -> Result<(), PageError>;

    /// Dispatch a bubbling notification without any default action.
    fn dispatch(&mut self, node: NodeId, event: DomEvent) -> Result<(), PageError>;
}
