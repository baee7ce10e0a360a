use std::borrow::Cow;
use thiserror::Error;

/// Failure raised by the platform while touching a node
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    #[error("node was disposed by the platform")]
    Disposed,

    #[error("platform failure: {0}")]
    Platform(String),
}

/// Capability set of one node in a platform-owned UI-element tree
///
/// Implementors are handles: cloning or obtaining a child must not copy the
/// underlying platform object. The engine only reads the tree and keeps
/// handles for the duration of a single `handle_event` call.
pub trait UiNode: Sized {
    /// Displayed text of the node, if any
    fn text(&self) -> Option<Cow<'_, str>>;

    /// Whether the platform reports the node as clickable
    fn is_clickable(&self) -> bool;

    /// Child handles in display order
    fn children(&self) -> Vec<Self>;

    /// Dispatch a click. `Ok(false)` means the platform rejected the action.
    fn perform_click(&self) -> Result<bool, NodeError>;
}
