use std::collections::HashSet;

use super::{Dataset, Identified};

/// Keeps links whose weight (absent = 0) is at least `min_weight`, and the nodes they touch.
///
/// Always derives from `data`, so raising the threshold again restores what a lower one
/// dropped.
pub fn filter_by_weight<N: Identified + Clone>(data: &Dataset<N>, min_weight: f64) -> Dataset<N> {
	let links: Vec<_> = data
		.links
		.iter()
		.filter(|link| link.filter_weight() >= min_weight)
		.cloned()
		.collect();
	let used: HashSet<_> = links
		.iter()
		.flat_map(|link| [&link.source, &link.target])
		.collect();
	let nodes = data
		.nodes
		.iter()
		.filter(|node| used.contains(node.id()))
		.cloned()
		.collect();
	Dataset::new(nodes, links)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{annotate, Link, Node, NodeId};

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

	fn ids<N: Identified>(data: &Dataset<N>) -> Vec<NodeId> {
		data.nodes.iter().map(|n| n.id().clone()).collect()
	}

	#[test]
	fn threshold_drops_light_links_and_orphans() {
		let filtered = filter_by_weight(&sample(), 3.0);
		assert_eq!(filtered.links, vec![Link::new(1, 2).with_weight(5.0)]);
		assert_eq!(ids(&filtered), vec![NodeId::Int(1), NodeId::Int(2)]);
	}

	#[test]
	fn threshold_is_inclusive() {
		let filtered = filter_by_weight(&sample(), 5.0);
		assert_eq!(filtered.links.len(), 1);
		let none = filter_by_weight(&sample(), 5.5);
		assert!(none.is_empty());
	}

	#[test]
	fn floor_threshold_keeps_connected_nodes() {
		let mut data = sample();
		data.nodes.push(Node::new(4));
		data.links.push(Link::new(3, 1));
		let filtered = filter_by_weight(&data, 0.0);
		assert_eq!(filtered.links, data.links);
		assert_eq!(
			ids(&filtered),
			vec![NodeId::Int(1), NodeId::Int(2), NodeId::Int(3)]
		);
	}

	#[test]
	fn unweighted_links_count_as_zero() {
		let data = Dataset::new(vec![Node::new(1), Node::new(2)], vec![Link::new(1, 2)]);
		assert_eq!(filter_by_weight(&data, 0.0).links.len(), 1);
		assert!(filter_by_weight(&data, 0.1).is_empty());
		assert_eq!(filter_by_weight(&data, -1.0).links.len(), 1);
	}

	#[test]
	fn higher_threshold_is_a_subset() {
		let data = Dataset::new(
			(1..=6).map(Node::new).collect(),
			vec![
				Link::new(1, 2).with_weight(0.5),
				Link::new(2, 3).with_weight(2.0),
				Link::new(3, 4).with_weight(4.0),
				Link::new(4, 5),
				Link::new(5, 6).with_weight(7.5),
			],
		);
		let thresholds = [-1.0, 0.0, 0.5, 1.0, 2.0, 4.0, 7.5, 10.0];
		for pair in thresholds.windows(2) {
			let low = filter_by_weight(&data, pair[0]);
			let high = filter_by_weight(&data, pair[1]);
			assert!(high.links.iter().all(|l| low.links.contains(l)));
			for node in &high.nodes {
				assert!(high.links.iter().any(|l| l.touches(node.id())));
			}
		}
	}

	#[test]
	fn lowering_again_restores_nodes() {
		let data = sample();
		assert_eq!(filter_by_weight(&data, 3.0).nodes.len(), 2);
		assert_eq!(filter_by_weight(&data, 0.0).nodes.len(), 3);
	}

	#[test]
	fn annotated_nodes_keep_full_degree() {
		let annotated = annotate(&sample());
		let filtered = filter_by_weight(&annotated, 3.0);
		assert_eq!(filtered.nodes[1].size, 2);
	}
}
