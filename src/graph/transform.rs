use std::collections::HashMap;

use super::{AnnotatedNode, Dataset, Link, NodeId};

const UNKNOWN_GROUP: &str = "unknown";

/// Counts incident links per node id. Both endpoints of a self-loop count.
pub fn degree_map(links: &[Link]) -> HashMap<&NodeId, u32> {
	let mut degrees = HashMap::new();
	for link in links {
		*degrees.entry(&link.source).or_insert(0) += 1;
		*degrees.entry(&link.target).or_insert(0) += 1;
	}
	degrees
}

/// Derives `size`, `label` and `group` for every node. Links pass through untouched.
pub fn annotate(data: &Dataset) -> Dataset<AnnotatedNode> {
	let degrees = degree_map(&data.links);
	let nodes = data
		.nodes
		.iter()
		.map(|node| AnnotatedNode {
			size: degrees.get(&node.id).copied().unwrap_or(0).max(1),
			label: node.name.clone().unwrap_or_else(|| node.id.to_string()),
			group: node.tag.clone().unwrap_or_else(|| UNKNOWN_GROUP.to_owned()),
			node: node.clone(),
		})
		.collect();
	Dataset::new(nodes, data.links.clone())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::Node;

	fn sample() -> Dataset {
		Dataset::new(
			vec![
				Node::new(1).with_name("A"),
				Node::new(2).with_name("B"),
				Node::new(3).with_name("C"),
			],
			vec![
				Link::new(1, 2).with_weight(5.0),
				Link::new(2, 3).with_weight(1.0),
			],
		)
	}

	fn sizes(data: &Dataset<AnnotatedNode>) -> Vec<u32> {
		data.nodes.iter().map(|n| n.size).collect()
	}

	#[test]
	fn size_is_degree() {
		let annotated = annotate(&sample());
		assert_eq!(sizes(&annotated), vec![1, 2, 1]);
	}

	#[test]
	fn isolated_node_is_floored_at_one() {
		let mut data = sample();
		data.nodes.push(Node::new(4));
		let annotated = annotate(&data);
		assert_eq!(annotated.nodes[3].size, 1);
	}

	#[test]
	fn degree_counts_every_incidence() {
		let links = vec![
			Link::new(1, 2),
			Link::new(2, 1),
			Link::new(1, 3),
			Link::new(1, 1),
			Link::new(9, 8),
		];
		let degrees = degree_map(&links);
		assert_eq!(degrees[&NodeId::Int(1)], 5);
		assert_eq!(degrees[&NodeId::Int(2)], 2);
		assert_eq!(degrees[&NodeId::Int(3)], 1);
		assert_eq!(degrees[&NodeId::Int(9)], 1);
		assert!(!degrees.contains_key(&NodeId::Int(4)));
	}

	#[test]
	fn labels_and_groups_fall_back() {
		let data = Dataset::new(
			vec![
				Node::new("x").with_name("Xavier").with_tag("dealer"),
				Node::new(7),
			],
			vec![],
		);
		let annotated = annotate(&data);
		assert_eq!(annotated.nodes[0].label, "Xavier");
		assert_eq!(annotated.nodes[0].group, "dealer");
		assert_eq!(annotated.nodes[1].label, "7");
		assert_eq!(annotated.nodes[1].group, "unknown");
	}

	#[test]
	fn annotate_is_idempotent() {
		let data = sample();
		let first = annotate(&data);
		let second = annotate(&data);
		assert_eq!(first, second);
		assert_eq!(first.links, data.links);
	}

	#[test]
	fn mixed_id_forms_are_not_conflated() {
		let data = Dataset::new(vec![Node::new(1), Node::new(2)], vec![Link::new("1", 2)]);
		let annotated = annotate(&data);
		assert_eq!(annotated.nodes[0].size, 1);
		assert_eq!(degree_map(&data.links).get(&NodeId::Int(1)), None);
		assert_eq!(degree_map(&data.links)[&NodeId::from("1")], 1);
	}

	#[test]
	fn dangling_links_do_not_size_missing_nodes() {
		let data = Dataset::new(vec![Node::new(1)], vec![Link::new(1, 99)]);
		let annotated = annotate(&data);
		assert_eq!(annotated.nodes.len(), 1);
		assert_eq!(annotated.nodes[0].size, 1);
		assert_eq!(annotated.links.len(), 1);
	}
}
