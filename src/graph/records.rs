use std::collections::HashMap;

use serde::Deserialize;

use super::{lenient, Dataset, Link, Node, NodeId};

/// A person record as written by the records editor.
#[derive(Clone, Debug, Deserialize)]
pub struct PersonRecord {
	/// Record id, becomes the node id.
	pub id: NodeId,
	/// Full name.
	#[serde(default, deserialize_with = "lenient::string")]
	pub name: Option<String>,
	/// Free-form classification tag.
	#[serde(default, deserialize_with = "lenient::string")]
	pub tag: Option<String>,
	/// Age in years.
	#[serde(default, deserialize_with = "lenient::number")]
	pub age: Option<f64>,
	/// Last known location.
	#[serde(default, deserialize_with = "lenient::string")]
	pub location: Option<String>,
	/// Outgoing connections.
	#[serde(default)]
	pub connections: Vec<Connection>,
}

/// One side of a connection between two records.
#[derive(Clone, Debug, Deserialize)]
pub struct Connection {
	/// The other record.
	#[serde(rename = "targetId")]
	pub target_id: NodeId,
	/// Relationship kind.
	#[serde(default, rename = "type", deserialize_with = "lenient::string")]
	pub kind: Option<String>,
	/// Relationship strength.
	#[serde(default, deserialize_with = "lenient::number")]
	pub weight: Option<f64>,
}

type EdgeKey = (NodeId, NodeId, Option<String>, Option<u64>);

/// The editor stores each connection on both endpoints. A connection whose mirror was
/// already emitted is consumed instead of producing a second link.
pub(super) fn into_dataset(records: Vec<PersonRecord>) -> Dataset {
	let mut pending: HashMap<EdgeKey, usize> = HashMap::new();
	let mut nodes = Vec::with_capacity(records.len());
	let mut links = Vec::new();

	for record in records {
		for conn in record.connections {
			let weight_bits = conn.weight.map(f64::to_bits);
			let key = (
				record.id.clone(),
				conn.target_id.clone(),
				conn.kind.clone(),
				weight_bits,
			);
			if let Some(count) = pending.get_mut(&key).filter(|c| **c > 0) {
				*count -= 1;
				continue;
			}
			let mirror = (conn.target_id.clone(), record.id.clone(), conn.kind.clone(), weight_bits);
			*pending.entry(mirror).or_insert(0) += 1;
			links.push(Link {
				source: record.id.clone(),
				target: conn.target_id,
				weight: conn.weight,
				kind: conn.kind,
			});
		}
		nodes.push(Node {
			id: record.id,
			name: record.name,
			tag: record.tag,
		});
	}

	Dataset::new(nodes, links)
}
