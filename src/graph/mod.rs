//! Graph dataset model and the pure operations the viewer runs over it.
//!
//! Nothing in here touches the browser: datasets are decoded with `serde`, annotated,
//! filtered and searched as plain values so every rule can be tested on the host.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::de::DeserializeOwned;
use serde::Deserialize;

mod filter;
mod lenient;
mod records;
mod search;
mod transform;

pub use filter::filter_by_weight;
pub use records::{Connection, PersonRecord};
pub use search::find_node;
pub use transform::{annotate, degree_map};

/// Identifier of a node. JSON ids may be numbers or strings; `1` and `"1"` are distinct.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
	/// Integral numeric id.
	Int(i64),
	/// Non-integral (or out of range) numeric id, kept in its decimal text form.
	Decimal(String),
	/// String id, kept verbatim.
	Text(String),
}

impl NodeId {
	/// The numeric value for ids that were numbers on the wire.
	pub fn as_number(&self) -> Option<f64> {
		match self {
			NodeId::Int(n) => Some(*n as f64),
			NodeId::Decimal(s) => s.parse().ok(),
			NodeId::Text(_) => None,
		}
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NodeId::Int(n) => write!(f, "{n}"),
			NodeId::Decimal(s) | NodeId::Text(s) => f.write_str(s),
		}
	}
}

impl From<i32> for NodeId {
	fn from(value: i32) -> Self {
		NodeId::Int(value.into())
	}
}

impl From<i64> for NodeId {
	fn from(value: i64) -> Self {
		NodeId::Int(value)
	}
}

impl From<&str> for NodeId {
	fn from(value: &str) -> Self {
		NodeId::Text(value.to_owned())
	}
}

struct NodeIdVisitor;

impl<'de> Visitor<'de> for NodeIdVisitor {
	type Value = NodeId;

	fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str("a string or numeric node id")
	}

	fn visit_i64<E: de::Error>(self, v: i64) -> Result<NodeId, E> {
		Ok(NodeId::Int(v))
	}

	fn visit_u64<E: de::Error>(self, v: u64) -> Result<NodeId, E> {
		match i64::try_from(v) {
			Ok(n) => Ok(NodeId::Int(n)),
			Err(_) => Ok(NodeId::Decimal(v.to_string())),
		}
	}

	// JS numbers arrive as f64; integral values map onto the integer form
	fn visit_f64<E: de::Error>(self, v: f64) -> Result<NodeId, E> {
		if v.fract() == 0.0 && v.abs() < 9_007_199_254_740_992.0 {
			Ok(NodeId::Int(v as i64))
		} else {
			Ok(NodeId::Decimal(v.to_string()))
		}
	}

	fn visit_str<E: de::Error>(self, v: &str) -> Result<NodeId, E> {
		Ok(NodeId::Text(v.to_owned()))
	}

	fn visit_string<E: de::Error>(self, v: String) -> Result<NodeId, E> {
		Ok(NodeId::Text(v))
	}
}

impl<'de> Deserialize<'de> for NodeId {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		deserializer.deserialize_any(NodeIdVisitor)
	}
}

/// A raw node as received from the data source.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Node {
	/// Unique identifier.
	pub id: NodeId,
	/// Optional display name.
	#[serde(default, deserialize_with = "lenient::string")]
	pub name: Option<String>,
	/// Optional grouping tag, used for colouring.
	#[serde(default, deserialize_with = "lenient::string")]
	pub tag: Option<String>,
}

impl Node {
	/// Node with only an id.
	pub fn new(id: impl Into<NodeId>) -> Self {
		Self {
			id: id.into(),
			name: None,
			tag: None,
		}
	}

	/// Sets the display name.
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Sets the grouping tag.
	pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
		self.tag = Some(tag.into());
		self
	}
}

/// A node carrying the fields derived by [`annotate`].
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotatedNode {
	/// The untouched raw node.
	pub node: Node,
	/// Incident link count, never below 1.
	pub size: u32,
	/// Name, or the stringified id.
	pub label: String,
	/// Tag, or `"unknown"`.
	pub group: String,
}

/// Common view over raw and annotated nodes.
pub trait Identified {
	/// The node id.
	fn id(&self) -> &NodeId;
	/// The raw display name, if any.
	fn name(&self) -> Option<&str>;
}

impl Identified for Node {
	fn id(&self) -> &NodeId {
		&self.id
	}

	fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}
}

impl Identified for AnnotatedNode {
	fn id(&self) -> &NodeId {
		&self.node.id
	}

	fn name(&self) -> Option<&str> {
		self.node.name.as_deref()
	}
}

/// An edge between two node ids. Dangling ids are carried as-is.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Link {
	/// Source node id.
	pub source: NodeId,
	/// Target node id.
	pub target: NodeId,
	/// Optional numeric weight.
	#[serde(default, deserialize_with = "lenient::number")]
	pub weight: Option<f64>,
	/// Optional relationship kind.
	#[serde(default, rename = "type", deserialize_with = "lenient::string")]
	pub kind: Option<String>,
}

impl Link {
	/// Unweighted link between two ids.
	pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			weight: None,
			kind: None,
		}
	}

	/// Sets the weight.
	pub fn with_weight(mut self, weight: f64) -> Self {
		self.weight = Some(weight);
		self
	}

	/// Weight used for thresholding; absent weights count as 0.
	pub fn filter_weight(&self) -> f64 {
		self.weight.unwrap_or(0.0)
	}

	/// Whether `id` is either endpoint.
	pub fn touches(&self, id: &NodeId) -> bool {
		&self.source == id || &self.target == id
	}
}

/// Nodes plus links. Replaced wholesale, never patched.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(bound(deserialize = "N: DeserializeOwned"))]
pub struct Dataset<N = Node> {
	/// Node list. Entries without a usable id are dropped.
	#[serde(default, deserialize_with = "lenient::list")]
	pub nodes: Vec<N>,
	/// Link list. Entries without a usable source or target are dropped.
	#[serde(default, deserialize_with = "lenient::list")]
	pub links: Vec<Link>,
}

impl<N> Default for Dataset<N> {
	fn default() -> Self {
		Self {
			nodes: Vec::new(),
			links: Vec::new(),
		}
	}
}

impl<N> Dataset<N> {
	/// Builds a dataset from parts.
	pub fn new(nodes: Vec<N>, links: Vec<Link>) -> Self {
		Self { nodes, links }
	}

	/// True when there is nothing to draw.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.links.is_empty()
	}
}

/// Any document shape the viewer accepts as a dataset.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum GraphDocument {
	/// Person records exported by the records editor.
	Records(Vec<PersonRecord>),
	/// `{ nodes, links }`.
	Graph(Dataset),
}

impl From<GraphDocument> for Dataset {
	fn from(doc: GraphDocument) -> Self {
		match doc {
			GraphDocument::Graph(data) => data,
			GraphDocument::Records(records) => records::into_dataset(records),
		}
	}
}

/// Decodes a JSON document of either accepted shape.
pub fn parse_document(json: &str) -> Result<Dataset, serde_json::Error> {
	serde_json::from_str::<GraphDocument>(json).map(Dataset::from)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn numeric_and_string_ids_stay_distinct() {
		let data = parse_document(r#"{"nodes":[{"id":1},{"id":"1"}],"links":[]}"#).unwrap();
		assert_eq!(data.nodes[0].id, NodeId::Int(1));
		assert_eq!(data.nodes[1].id, NodeId::Text("1".into()));
		assert_ne!(data.nodes[0].id, data.nodes[1].id);
		assert_eq!(data.nodes[0].id.to_string(), data.nodes[1].id.to_string());
	}

	#[test]
	fn malformed_fields_decode_as_absent() {
		let data = parse_document(
			r#"{"nodes":[{"id":"a","name":42,"tag":null}],
			    "links":[{"source":"a","target":"b","weight":"heavy","type":7}]}"#,
		)
		.unwrap();
		assert_eq!(data.nodes[0].name, None);
		assert_eq!(data.nodes[0].tag, None);
		assert_eq!(data.links[0].weight, None);
		assert_eq!(data.links[0].kind, None);
		assert_eq!(data.links[0].filter_weight(), 0.0);
	}

	#[test]
	fn missing_lists_default_to_empty() {
		let data = parse_document(r#"{"nodes":[{"id":3}]}"#).unwrap();
		assert_eq!(data.nodes.len(), 1);
		assert!(data.links.is_empty());

		let empty = parse_document("{}").unwrap();
		assert!(empty.is_empty());
	}

	#[test]
	fn unknown_fields_are_ignored() {
		let data = parse_document(
			r#"{"nodes":[{"id":1,"x":3.5,"color":"red","size":9}],"links":[],"meta":{}}"#,
		)
		.unwrap();
		assert_eq!(data.nodes[0], Node::new(1));
	}

	#[test]
	fn non_document_is_rejected() {
		assert!(parse_document("null").is_err());
		assert!(parse_document("not json").is_err());
	}

	#[test]
	fn bundled_sample_decodes() {
		let data = parse_document(include_str!("../../data.json")).unwrap();
		assert_eq!(data.nodes.len(), 7);
		assert_eq!(data.links.len(), 8);
		assert_eq!(data.links[0].kind.as_deref(), Some("business"));
		assert_eq!(data.nodes[6].name, None);
	}

	#[test]
	fn fractional_ids_keep_their_text() {
		let data = parse_document(r#"{"nodes":[{"id":1.5}]}"#).unwrap();
		assert_eq!(data.nodes[0].id, NodeId::Decimal("1.5".into()));
		assert_eq!(data.nodes[0].id.to_string(), "1.5");
	}

	#[test]
	fn numeric_ids_keep_their_number() {
		let data = parse_document(r#"{"nodes":[{"id":1.5},{"id":7},{"id":"7"}]}"#).unwrap();
		assert_eq!(data.nodes[0].id.as_number(), Some(1.5));
		assert_eq!(data.nodes[1].id.as_number(), Some(7.0));
		assert_eq!(data.nodes[2].id.as_number(), None);
	}

	#[test]
	fn null_lists_decode_as_empty() {
		let data = parse_document(r#"{"nodes":[{"id":1},{"id":2}],"links":null}"#).unwrap();
		assert_eq!(data.nodes.len(), 2);
		assert!(data.links.is_empty());

		let data = parse_document(r#"{"nodes":"none","links":{}}"#).unwrap();
		assert!(data.is_empty());
	}

	#[test]
	fn bad_entries_are_skipped_not_fatal() {
		let data = parse_document(
			r#"{"nodes":[{"id":1,"name":"A"},{"id":2},{"id":null},{"name":"no id"}],
			    "links":[{"source":1,"target":2,"weight":5},{"source":1},{"target":[2]}]}"#,
		)
		.unwrap();
		assert_eq!(data.nodes, vec![Node::new(1).with_name("A"), Node::new(2)]);
		assert_eq!(data.links, vec![Link::new(1, 2).with_weight(5.0)]);
	}
}
