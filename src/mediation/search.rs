use super::node::UiNode;
use super::types::MatchMode;

/// A node whose text matched one of the configured texts
#[derive(Debug)]
pub struct Candidate<N> {
    pub node: N,
    /// Text the node displayed when it was matched
    pub text: String,
    /// Position of the matched entry in `match_texts`
    pub rank: usize,
}

/// Collect every matching node under `root`, ordered for selection.
///
/// The tree is walked depth-first in pre-order with children in display
/// order. Matches are grouped by the configured text they matched, groups
/// follow the order of `match_texts`, and inside a group traversal order is
/// kept. A node that matches several texts is placed under the earliest one.
pub fn collect_candidates<N: UiNode>(
    root: N,
    match_texts: &[String],
    mode: MatchMode,
) -> Vec<Candidate<N>> {
    let mut buckets: Vec<Vec<Candidate<N>>> = match_texts.iter().map(|_| Vec::new()).collect();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        let mut children = node.children();
        children.reverse();

        let matched = node.text().and_then(|text| {
            match_texts
                .iter()
                .position(|wanted| mode.matches(&text, wanted))
                .map(|rank| (rank, text.into_owned()))
        });

        stack.extend(children);

        if let Some((rank, text)) = matched {
            buckets[rank].push(Candidate { node, text, rank });
        }
    }

    buckets.into_iter().flatten().collect()
}

/// First clickable candidate in selection order
pub fn first_clickable<N: UiNode>(candidates: Vec<Candidate<N>>) -> Option<Candidate<N>> {
    candidates.into_iter().find(|c| c.node.is_clickable())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::snapshot::SnapshotNode;

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_candidates_follow_configured_text_order() {
        let root = SnapshotNode::container(vec![
            SnapshotNode::button("Order"),
            SnapshotNode::button("Pesan"),
        ])
        .into_ref();

        let found = collect_candidates(root, &texts(&["Pesan", "Order"]), MatchMode::Exact);
        let order: Vec<_> = found.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(order, vec!["Pesan", "Order"]);
        assert_eq!(found[0].rank, 0);
        assert_eq!(found[1].rank, 1);
    }

    #[test]
    fn test_same_text_uses_preorder_traversal() {
        let root = SnapshotNode::container(vec![
            SnapshotNode::container(vec![SnapshotNode::button("Pesan").with_id("first")]),
            SnapshotNode::button("Pesan").with_id("second"),
        ])
        .with_text("Pesan")
        .with_id("root")
        .into_ref();

        let found = collect_candidates(root, &texts(&["Pesan"]), MatchMode::Exact);
        let ids: Vec<_> = found.iter().filter_map(|c| c.node.id.clone()).collect();
        assert_eq!(ids, vec!["root", "first", "second"]);
    }

    #[test]
    fn test_no_text_nodes_are_ignored() {
        let root = SnapshotNode::container(vec![SnapshotNode::container(vec![])]).into_ref();
        assert!(collect_candidates(root, &texts(&["Pesan"]), MatchMode::Exact).is_empty());
    }

    #[test]
    fn test_contains_mode_places_node_under_earliest_text() {
        let root = SnapshotNode::container(vec![SnapshotNode::button("Pesan Order")]).into_ref();
        let found = collect_candidates(
            root,
            &texts(&["order", "pesan"]),
            MatchMode::ContainsIgnoreCase,
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rank, 0);
    }

    #[test]
    fn test_first_clickable_skips_disabled_matches() {
        let root = SnapshotNode::container(vec![
            SnapshotNode::label("Pesan").with_id("label"),
            SnapshotNode::button("Order").with_id("button"),
        ])
        .into_ref();
        let found = collect_candidates(root, &texts(&["Pesan", "Order"]), MatchMode::Exact);
        let chosen = first_clickable(found).unwrap();
        assert_eq!(chosen.node.id.as_deref(), Some("button"));
    }
}
