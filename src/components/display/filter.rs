//! Applies compiled predicates to a graph snapshot.
//!
//! Nodes and edges are evaluated independently: an edge stays visible even if
//! one of its endpoints is hidden. Use [`VisibilityResult::connected_only`]
//! when a renderer needs dangling edges removed.

use std::collections::{BTreeSet, HashSet};

use log::warn;

use super::error::MissingAttribute;
use super::predicates::{CompiledPredicates, EdgeMetric, Overlay};
use super::types::{Attributes, ElementKind, GraphEdge, GraphNode, GraphSnapshot};

/// Label drawn on an edge for the active metric.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeLabel {
	/// Metric the label shows.
	pub metric: EdgeMetric,
	/// Raw value read from the edge.
	pub value: f64,
	/// Formatted text with units.
	pub text: String,
}

impl EdgeLabel {
	/// Edge attribute the value was read from.
	pub fn attribute(&self) -> &'static str {
		self.metric.attribute()
	}
}

/// Outcome for one node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeVisibility {
	/// Node id from the snapshot.
	pub id: String,
	/// False when any node predicate hides it.
	pub visible: bool,
	/// Overlays whose attribute test passes on this node.
	pub overlays: Vec<Overlay>,
}

/// Outcome for one edge.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeVisibility {
	/// Edge id from the snapshot.
	pub id: String,
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// False when any edge predicate hides it.
	pub visible: bool,
	/// Overlays whose attribute test passes on this edge.
	pub overlays: Vec<Overlay>,
	/// Only set on visible edges carrying a positive metric value.
	pub label: Option<EdgeLabel>,
}

/// What to draw for one snapshot under one set of predicates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VisibilityResult {
	/// One entry per snapshot node, in snapshot order.
	pub nodes: Vec<NodeVisibility>,
	/// One entry per snapshot edge, in snapshot order.
	pub edges: Vec<EdgeVisibility>,
	/// Attributes referenced by active predicates that the snapshot lacks.
	pub diagnostics: Vec<MissingAttribute>,
}

impl VisibilityResult {
	/// Nodes that passed every node predicate.
	pub fn visible_nodes(&self) -> impl Iterator<Item = &NodeVisibility> {
		self.nodes.iter().filter(|n| n.visible)
	}

	/// Edges that passed every edge predicate.
	pub fn visible_edges(&self) -> impl Iterator<Item = &EdgeVisibility> {
		self.edges.iter().filter(|e| e.visible)
	}

	/// Look up a node outcome by id.
	pub fn node(&self, id: &str) -> Option<&NodeVisibility> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// Look up an edge outcome by id.
	pub fn edge(&self, id: &str) -> Option<&EdgeVisibility> {
		self.edges.iter().find(|e| e.id == id)
	}

	/// Whether the node with this id is visible. Unknown ids are not.
	pub fn node_visible(&self, id: &str) -> bool {
		self.node(id).is_some_and(|n| n.visible)
	}

	/// Whether the edge with this id is visible. Unknown ids are not.
	pub fn edge_visible(&self, id: &str) -> bool {
		self.edge(id).is_some_and(|e| e.visible)
	}

	/// Whether a node or an edge with this id is visible.
	///
	/// Node and edge ids live in separate namespaces; when both a node and an
	/// edge share `id` this answers for the node. Use [`Self::edge_visible`]
	/// to query the edge.
	pub fn is_visible(&self, id: &str) -> bool {
		match self.node(id) {
			Some(node) => node.visible,
			None => self.edge_visible(id),
		}
	}

	/// Visible elements (nodes and edges) decorated with the overlay.
	pub fn with_overlay(&self, overlay: Overlay) -> Vec<&str> {
		let nodes = self
			.visible_nodes()
			.filter(|n| n.overlays.contains(&overlay))
			.map(|n| n.id.as_str());
		let edges = self
			.visible_edges()
			.filter(|e| e.overlays.contains(&overlay))
			.map(|e| e.id.as_str());
		nodes.chain(edges).collect()
	}

	/// Hide visible edges whose source or target node is hidden or unknown.
	pub fn connected_only(mut self) -> Self {
		let shown: HashSet<&str> = self.visible_nodes().map(|n| n.id.as_str()).collect();
		let dangling: Vec<usize> = self
			.edges
			.iter()
			.enumerate()
			.filter(|(_, e)| {
				e.visible && !(shown.contains(e.source.as_str()) && shown.contains(e.target.as_str()))
			})
			.map(|(i, _)| i)
			.collect();
		for i in dangling {
			self.edges[i].visible = false;
			self.edges[i].label = None;
		}
		self
	}
}

/// Evaluates [`CompiledPredicates`] against a [`GraphSnapshot`].
///
/// Holds no state: the same inputs always produce the same result, and a new
/// snapshot never sees anything computed for an earlier one.
#[derive(Clone, Copy, Debug, Default)]
pub struct GraphFilter;

impl GraphFilter {
	/// Evaluate every node and edge of the snapshot. Never fails; missing
	/// attributes end up in [`VisibilityResult::diagnostics`].
	pub fn apply(predicates: &CompiledPredicates, snapshot: &GraphSnapshot) -> VisibilityResult {
		let diagnostics = missing_attributes(predicates, snapshot);
		if !diagnostics.is_empty() {
			let listed: Vec<String> = diagnostics
				.iter()
				.map(|m| format!("{}.{}", m.element, m.attribute))
				.collect();
			warn!(
				"mesh-graph: snapshot lacks {}; treating as absent",
				listed.join(", ")
			);
		}

		VisibilityResult {
			nodes: snapshot
				.nodes
				.iter()
				.map(|node| node_visibility(predicates, node))
				.collect(),
			edges: snapshot
				.edges
				.iter()
				.map(|edge| edge_visibility(predicates, edge))
				.collect(),
			diagnostics,
		}
	}
}

fn overlays_for(predicates: &CompiledPredicates, kind: ElementKind, element: &impl Attributes) -> Vec<Overlay> {
	predicates
		.overlays
		.iter()
		.copied()
		.filter(|o| o.applies_to(kind) && o.marks(element))
		.collect()
}

fn node_visibility(predicates: &CompiledPredicates, node: &GraphNode) -> NodeVisibility {
	NodeVisibility {
		id: node.id.clone(),
		visible: !predicates.node_predicates.iter().any(|p| p.hides(node)),
		overlays: overlays_for(predicates, ElementKind::Node, node),
	}
}

fn edge_visibility(predicates: &CompiledPredicates, edge: &GraphEdge) -> EdgeVisibility {
	let visible = !predicates.edge_predicates.iter().any(|p| p.hides(edge));
	let label = predicates
		.edge_metric
		.filter(|_| visible)
		.and_then(|metric| {
			edge.number(metric.attribute())
				.filter(|&value| value > 0.0)
				.map(|value| EdgeLabel {
					metric,
					value,
					text: metric.format(value),
				})
		});
	EdgeVisibility {
		id: edge.id.clone(),
		source: edge.source.clone(),
		target: edge.target.clone(),
		visible,
		overlays: overlays_for(predicates, ElementKind::Edge, edge),
		label,
	}
}

fn missing_attributes(predicates: &CompiledPredicates, snapshot: &GraphSnapshot) -> Vec<MissingAttribute> {
	// Presence flags (`isIdle`, `hasVS`, ...) are legitimately absent; only
	// attributes whose value is read can be missing.
	let mut referenced = BTreeSet::new();
	for p in predicates.node_predicates.iter().filter(|p| p.reads_value()) {
		referenced.insert((ElementKind::Node, p.attribute()));
	}
	for &overlay in predicates.overlays.iter().filter(|o| o.reads_value()) {
		for kind in [ElementKind::Node, ElementKind::Edge] {
			if overlay.applies_to(kind) {
				referenced.insert((kind, overlay.attribute()));
			}
		}
	}
	if let Some(metric) = predicates.edge_metric {
		referenced.insert((ElementKind::Edge, metric.attribute()));
	}

	referenced
		.into_iter()
		.filter(|&(kind, attribute)| !snapshot.declares(kind, attribute))
		.map(|(element, attribute)| MissingAttribute { element, attribute })
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::display::predicates::PredicateCompiler;
	use crate::components::display::settings::{SettingId, SettingsStore};
	use crate::components::display::types::attr;

	fn snapshot() -> GraphSnapshot {
		GraphSnapshot::new(
			vec![
				GraphNode::new("productpage").with(attr::NODE_TYPE, "app"),
				GraphNode::new("reviews").with(attr::NODE_TYPE, "service"),
				GraphNode::new("idle").with(attr::NODE_TYPE, "app").with(attr::IS_IDLE, true),
			],
			vec![
				GraphEdge::new("e0", "productpage", "reviews")
					.with(attr::HAS_TRAFFIC, true)
					.with(attr::HTTP, "4.20")
					.with(attr::IS_MTLS, 100.0),
				GraphEdge::new("e1", "reviews", "idle"),
			],
		)
	}

	#[test]
	fn labels_only_positive_numeric_metrics() {
		let mut settings = SettingsStore::new();
		settings.enable(SettingId::TrafficRate);
		settings.enable(SettingId::FilterIdleEdges);
		let mut snap = snapshot();
		snap.edges[1] = snap.edges[1].clone().with(attr::HTTP, 0.0);
		let result = GraphFilter::apply(&PredicateCompiler::compile(&settings).unwrap(), &snap);

		let label = result.edge("e0").and_then(|e| e.label.clone()).unwrap();
		assert_eq!(label.attribute(), "http");
		assert_eq!(label.value, 4.2);
		assert_eq!(label.text, "4.20rps");
		assert!(result.is_visible("e1"));
		assert_eq!(result.edge("e1").unwrap().label, None);
	}

	#[test]
	fn hidden_edges_get_no_label() {
		let mut settings = SettingsStore::new();
		settings.enable(SettingId::TrafficRate);
		let mut snap = snapshot();
		snap.edges[1] = snap.edges[1].clone().with(attr::HTTP, 3.0);
		let result = GraphFilter::apply(&PredicateCompiler::compile(&settings).unwrap(), &snap);
		assert!(!result.is_visible("e1"));
		assert_eq!(result.edge("e1").unwrap().label, None);
	}

	#[test]
	fn security_overlay_follows_the_toggle() {
		let mut settings = SettingsStore::new();
		let snap = snapshot();
		let off = GraphFilter::apply(&PredicateCompiler::compile(&settings).unwrap(), &snap);
		assert!(off.with_overlay(Overlay::Security).is_empty());
		assert!(off.is_visible("e0"));

		settings.enable(SettingId::FilterSecurity);
		let on = GraphFilter::apply(&PredicateCompiler::compile(&settings).unwrap(), &snap);
		assert_eq!(on.with_overlay(Overlay::Security), vec!["e0"]);
	}

	#[test]
	fn missing_attributes_are_reported_not_fatal() {
		let mut settings = SettingsStore::new();
		settings.enable(SettingId::FilterSecurity);
		let snap = GraphSnapshot::new(
			vec![GraphNode::new("a")],
			vec![GraphEdge::new("e", "a", "a").with(attr::HAS_TRAFFIC, true)],
		);
		let result = GraphFilter::apply(&PredicateCompiler::compile(&settings).unwrap(), &snap);
		assert!(result.diagnostics.contains(&MissingAttribute {
			element: ElementKind::Edge,
			attribute: attr::IS_MTLS,
		}));
		assert!(result.is_visible("e"));
		assert!(result.edge("e").unwrap().overlays.is_empty());
	}

	#[test]
	fn connected_only_drops_dangling_edges() {
		let settings = SettingsStore::new();
		let mut snap = snapshot();
		snap.edges[1] = snap.edges[1].clone().with(attr::HAS_TRAFFIC, true);
		let result = GraphFilter::apply(&PredicateCompiler::compile(&settings).unwrap(), &snap);
		assert!(result.is_visible("e1"));
		assert!(!result.is_visible("idle"));

		let connected = result.connected_only();
		assert!(connected.is_visible("e0"));
		assert!(!connected.is_visible("e1"));
	}

	#[test]
	fn absent_presence_flags_are_not_diagnosed() {
		let snap = GraphSnapshot::new(
			vec![
				GraphNode::new("box-app").with(attr::IS_BOX, "app"),
				GraphNode::new("box-ns").with(attr::IS_BOX, "namespace"),
				GraphNode::new("reviews").with(attr::NODE_TYPE, "service"),
			],
			vec![GraphEdge::new("e", "box-app", "reviews").with(attr::HAS_TRAFFIC, true)],
		);
		let result = GraphFilter::apply(&PredicateCompiler::compile(&SettingsStore::new()).unwrap(), &snap);
		assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
		assert!(result.is_visible("reviews"));
	}

	#[test]
	fn missing_label_metric_is_diagnosed() {
		let mut settings = SettingsStore::new();
		settings.enable(SettingId::ResponseTime);
		let result = GraphFilter::apply(&PredicateCompiler::compile(&settings).unwrap(), &snapshot());
		assert_eq!(
			result.diagnostics,
			vec![MissingAttribute {
				element: ElementKind::Edge,
				attribute: attr::RESPONSE_TIME,
			}]
		);
	}

	#[test]
	fn shared_ids_are_queried_per_kind() {
		let snap = GraphSnapshot::new(
			vec![GraphNode::new("x").with(attr::NODE_TYPE, "app")],
			vec![GraphEdge::new("x", "x", "x")],
		);
		let result = GraphFilter::apply(&PredicateCompiler::compile(&SettingsStore::new()).unwrap(), &snap);
		assert!(result.node_visible("x"));
		assert!(!result.edge_visible("x"));
		assert!(result.is_visible("x"));
		assert!(!result.edge_visible("missing"));
	}
}
