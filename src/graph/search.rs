use super::Identified;

/// First node whose id equals the query or whose name contains it, ignoring case.
///
/// The query is trimmed; an empty query matches nothing.
pub fn find_node<'a, N: Identified>(nodes: &'a [N], query: &str) -> Option<&'a N> {
	let query = query.trim().to_lowercase();
	if query.is_empty() {
		return None;
	}
	nodes.iter().find(|node| {
		node.id().to_string() == query
			|| node
				.name()
				.is_some_and(|name| name.to_lowercase().contains(&query))
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{annotate, Dataset, Link, Node, NodeId};

	fn nodes() -> Vec<Node> {
		vec![
			Node::new(1).with_name("A"),
			Node::new(2).with_name("B"),
			Node::new(3).with_name("C"),
		]
	}

	#[test]
	fn name_match_is_case_insensitive() {
		let nodes = nodes();
		assert_eq!(find_node(&nodes, "b").map(|n| &n.id), Some(&NodeId::Int(2)));
		assert_eq!(find_node(&nodes, "  B ").map(|n| &n.id), Some(&NodeId::Int(2)));
	}

	#[test]
	fn miss_and_empty_query_find_nothing() {
		let nodes = nodes();
		assert!(find_node(&nodes, "zzz").is_none());
		assert!(find_node(&nodes, "   ").is_none());
	}

	#[test]
	fn id_must_match_exactly() {
		let nodes = vec![Node::new(12), Node::new(2)];
		assert_eq!(find_node(&nodes, "2").map(|n| &n.id), Some(&NodeId::Int(2)));
	}

	#[test]
	fn first_match_wins() {
		let nodes = vec![
			Node::new("a").with_name("Marco Rossi"),
			Node::new("b").with_name("Marco Bianchi"),
		];
		assert_eq!(find_node(&nodes, "marco").map(|n| &n.id), Some(&NodeId::from("a")));
	}

	#[test]
	fn text_ids_are_compared_lowercased_query() {
		let nodes = vec![Node::new("abc")];
		assert!(find_node(&nodes, "ABC").is_some());
		let upper = vec![Node::new("ABC")];
		assert!(find_node(&upper, "abc").is_none());
	}

	#[test]
	fn works_over_annotated_nodes() {
		let data = annotate(&Dataset::new(nodes(), vec![Link::new(1, 2)]));
		let hit = find_node(&data.nodes, "c").unwrap();
		assert_eq!(hit.label, "C");
	}
}
