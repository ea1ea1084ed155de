//! Graph snapshot data structures read by the display model.
//!
//! Snapshots use the cytoscape element layout served by the mesh graph API:
//! every node and edge wraps its attributes in a `data` object.
//!
//! ```json
//! {
//!   "nodes": [{ "data": { "id": "n0", "nodeType": "service", "namespace": "bookinfo" } }],
//!   "edges": [{ "data": { "id": "e0", "source": "n0", "target": "n1", "hasTraffic": true } }]
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::error::DisplayError;

/// Attribute keys the display model reads.
pub mod attr {
	/// `app`, `service`, `workload`, `operation`, ...
	pub const NODE_TYPE: &str = "nodeType";
	/// Box kind of a synthetic grouping node.
	pub const IS_BOX: &str = "isBox";
	/// Node saw no traffic in the window.
	pub const IS_IDLE: &str = "isIdle";
	/// Node lies outside the requested namespaces.
	pub const IS_OUTSIDE: &str = "isOutside";
	/// Element matched the hide expression.
	pub const IS_HIDDEN: &str = "isHidden";
	/// Computed importance rank.
	pub const RANK: &str = "rank";
	/// Percentage of mTLS traffic on an edge.
	pub const IS_MTLS: &str = "isMTLS";
	/// Edge saw traffic in the window.
	pub const HAS_TRAFFIC: &str = "hasTraffic";
	/// Workload runs without a sidecar.
	pub const HAS_MISSING_SC: &str = "hasMissingSC";
	/// Service has a virtual service.
	pub const HAS_VS: &str = "hasVS";
	/// Owning namespace.
	pub const NAMESPACE: &str = "namespace";
	/// HTTP request rate.
	pub const HTTP: &str = "http";
	/// Share of the source's HTTP requests.
	pub const HTTP_PERCENT_REQ: &str = "httpPercentReq";
	/// Response time in milliseconds.
	pub const RESPONSE_TIME: &str = "responseTime";
	/// Throughput in bytes per second.
	pub const THROUGHPUT: &str = "throughput";
}

/// A single attribute value as delivered by the data source.
///
/// Numeric traffic rates are frequently serialized as strings, so
/// [`AttrValue::as_f64`] parses text values as well.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
	/// JSON `null`.
	Null,
	/// JSON boolean.
	Bool(bool),
	/// JSON number.
	Number(f64),
	/// JSON string.
	Text(String),
	/// Nested arrays/objects the model never inspects.
	Other(serde_json::Value),
}

impl AttrValue {
	/// `null` and `false` count as "not set"; anything else is set.
	pub fn is_set(&self) -> bool {
		!matches!(self, AttrValue::Null | AttrValue::Bool(false))
	}

	/// Finite numeric value, parsing numeric strings.
	pub fn as_f64(&self) -> Option<f64> {
		let value: Option<f64> = match self {
			AttrValue::Number(n) => Some(*n),
			AttrValue::Text(s) => s.trim().parse().ok(),
			_ => None,
		};
		value.filter(|n| n.is_finite())
	}

	/// String value, if this is text.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			AttrValue::Text(s) => Some(s),
			_ => None,
		}
	}
}

impl From<bool> for AttrValue {
	fn from(value: bool) -> Self {
		AttrValue::Bool(value)
	}
}

impl From<f64> for AttrValue {
	fn from(value: f64) -> Self {
		AttrValue::Number(value)
	}
}

impl From<&str> for AttrValue {
	fn from(value: &str) -> Self {
		AttrValue::Text(value.to_string())
	}
}

/// Read access to an element's named attributes.
pub trait Attributes {
	/// All attributes of the element.
	fn attributes(&self) -> &BTreeMap<String, AttrValue>;

	/// Raw attribute value.
	fn attr(&self, key: &str) -> Option<&AttrValue> {
		self.attributes().get(key)
	}

	/// True when the key is present and its value is set (see [`AttrValue::is_set`]).
	fn has(&self, key: &str) -> bool {
		self.attr(key).is_some_and(AttrValue::is_set)
	}

	/// Attribute as text.
	fn text(&self, key: &str) -> Option<&str> {
		self.attr(key).and_then(AttrValue::as_str)
	}

	/// Attribute as a finite number.
	fn number(&self, key: &str) -> Option<f64> {
		self.attr(key).and_then(AttrValue::as_f64)
	}
}

/// Which collection of a snapshot an element belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementKind {
	/// Snapshot node.
	Node,
	/// Snapshot edge.
	Edge,
}

impl fmt::Display for ElementKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ElementKind::Node => f.write_str("node"),
			ElementKind::Edge => f.write_str("edge"),
		}
	}
}

/// A node of the topology graph (workload, app, service, operation or box).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	/// Element id, unique within its kind.
	pub id: String,
	/// Every other key of the element's `data` object.
	#[serde(flatten)]
	pub attributes: BTreeMap<String, AttrValue>,
}

impl GraphNode {
	/// Node without attributes.
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			attributes: BTreeMap::new(),
		}
	}

	/// Builder-style attribute setter, mostly for tests and fixtures.
	pub fn with(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
		self.attributes.insert(key.to_string(), value.into());
		self
	}
}

impl Attributes for GraphNode {
	fn attributes(&self) -> &BTreeMap<String, AttrValue> {
		&self.attributes
	}
}

/// A directed traffic edge between two nodes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
	/// Element id, unique within its kind.
	pub id: String,
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	#[serde(flatten)]
	pub attributes: BTreeMap<String, AttrValue>,
}

impl GraphEdge {
	/// Edge without attributes.
	pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			source: source.into(),
			target: target.into(),
			attributes: BTreeMap::new(),
		}
	}

	/// Builder-style attribute setter.
	pub fn with(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
		self.attributes.insert(key.to_string(), value.into());
		self
	}
}

impl Attributes for GraphEdge {
	fn attributes(&self) -> &BTreeMap<String, AttrValue> {
		&self.attributes
	}
}

/// Attribute keys the data source promises to supply, per element kind.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct AttributeSchema {
	/// Node attribute keys.
	#[serde(default)]
	pub nodes: BTreeSet<String>,
	/// Edge attribute keys.
	#[serde(default)]
	pub edges: BTreeSet<String>,
}

/// One immutable snapshot of the graph as delivered by the data source.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GraphSnapshot {
	/// All nodes, boxes included.
	#[serde(default, deserialize_with = "element_data")]
	pub nodes: Vec<GraphNode>,
	/// All edges.
	#[serde(default, deserialize_with = "element_data")]
	pub edges: Vec<GraphEdge>,
	/// Optional declaration of supplied attribute keys.
	#[serde(default)]
	pub schema: Option<AttributeSchema>,
}

#[derive(Deserialize)]
struct Element<T> {
	data: T,
}

fn element_data<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
	D: Deserializer<'de>,
	T: Deserialize<'de>,
{
	let elements: Vec<Element<T>> = Vec::deserialize(deserializer)?;
	Ok(elements.into_iter().map(|e| e.data).collect())
}

impl GraphSnapshot {
	/// Snapshot without a schema.
	pub fn new(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
		Self {
			nodes,
			edges,
			schema: None,
		}
	}

	/// Parse the cytoscape element JSON.
	pub fn from_json(json: &str) -> Result<Self, DisplayError> {
		Ok(serde_json::from_str(json)?)
	}

	/// Whether the attribute is known for this element kind: declared by the
	/// schema, or carried by at least one element of that kind.
	pub fn declares(&self, kind: ElementKind, key: &str) -> bool {
		let in_schema = self.schema.as_ref().is_some_and(|s| match kind {
			ElementKind::Node => s.nodes.contains(key),
			ElementKind::Edge => s.edges.contains(key),
		});
		in_schema
			|| match kind {
				ElementKind::Node => self.nodes.iter().any(|n| n.attr(key).is_some()),
				ElementKind::Edge => self.edges.iter().any(|e| e.attr(key).is_some()),
			}
	}

	/// Distinct `namespace` attribute values, in first-seen order.
	pub fn namespaces(&self) -> Vec<&str> {
		let mut seen = Vec::new();
		for ns in self.nodes.iter().filter_map(|n| n.text(attr::NAMESPACE)) {
			if !seen.contains(&ns) {
				seen.push(ns);
			}
		}
		seen
	}
}
