use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::mediation::{NodeError, UiNode};

/// Shared handle to a node of an owned snapshot tree
pub type NodeRef = Arc<SnapshotNode>;

/// What the node does when it receives a click
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message", rename_all = "snake_case")]
pub enum ClickBehavior {
    #[default]
    Accept,
    Reject,
    /// Platform reports an error
    Fail(String),
    /// Platform object blows up mid-call
    Panic(String),
}

/// Owned copy of a UI-element tree
///
/// Used wherever the live platform tree is not available: scripted replays
/// and tests. Clicks are counted so dispatch can be observed.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SnapshotNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub clickable: bool,
    #[serde(default)]
    pub on_click: ClickBehavior,
    #[serde(default)]
    pub children: Vec<NodeRef>,
    #[serde(skip)]
    clicks: AtomicUsize,
}

impl SnapshotNode {
    pub fn container(children: Vec<SnapshotNode>) -> Self {
        Self {
            children: children.into_iter().map(Arc::new).collect(),
            ..Self::default()
        }
    }

    /// Clickable node with text
    pub fn button(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            clickable: true,
            ..Self::default()
        }
    }

    /// Non-clickable node with text
    pub fn label(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_clickable(mut self, clickable: bool) -> Self {
        self.clickable = clickable;
        self
    }

    pub fn with_click(mut self, behavior: ClickBehavior) -> Self {
        self.on_click = behavior;
        self
    }

    pub fn into_ref(self) -> NodeRef {
        Arc::new(self)
    }

    /// Clicks received by this node
    pub fn click_count(&self) -> usize {
        self.clicks.load(Ordering::SeqCst)
    }

    /// Clicks received by this node and all of its descendants
    pub fn total_clicks(&self) -> usize {
        self.click_count() + self.children.iter().map(|c| c.total_clicks()).sum::<usize>()
    }

    /// Number of nodes in this subtree
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }
}

impl UiNode for NodeRef {
    fn text(&self) -> Option<Cow<'_, str>> {
        self.text.as_deref().map(Cow::Borrowed)
    }

    fn is_clickable(&self) -> bool {
        self.clickable
    }

    fn children(&self) -> Vec<Self> {
        self.children.clone()
    }

    fn perform_click(&self) -> Result<bool, NodeError> {
        self.clicks.fetch_add(1, Ordering::SeqCst);
        match &self.on_click {
            ClickBehavior::Accept => Ok(true),
            ClickBehavior::Reject => Ok(false),
            ClickBehavior::Fail(message) => Err(NodeError::Platform(message.clone())),
            ClickBehavior::Panic(message) => panic!("{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_tree() {
        let tree: NodeRef = serde_json::from_str(
            r#"{
                "id": "root",
                "children": [
                    {"text": "Pesan", "clickable": true},
                    {"text": "Order", "on_click": {"type": "fail", "message": "gone"}}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.children[0].text.as_deref(), Some("Pesan"));
        assert!(tree.children[0].clickable);
        assert!(!tree.children[1].clickable);
        assert_eq!(tree.children[1].on_click, ClickBehavior::Fail("gone".to_string()));
    }

    #[test]
    fn test_clicks_are_counted_per_node() {
        let tree = SnapshotNode::container(vec![SnapshotNode::button("Pesan")]).into_ref();
        let child = tree.children()[0].clone();

        assert_eq!(child.perform_click(), Ok(true));
        assert_eq!(child.click_count(), 1);
        assert_eq!(tree.click_count(), 0);
        assert_eq!(tree.total_clicks(), 1);
    }
}
