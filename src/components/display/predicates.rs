//! Compiles display settings into element predicates.
//!
//! Predicates are plain data so two compilations of the same settings compare
//! equal. Visibility predicates decide whether an element is shown at all;
//! overlays only decorate elements that are already visible.

use log::debug;

use super::error::DisplayError;
use super::settings::{SettingGroup, SettingId, SettingsStore};
use super::types::{Attributes, ElementKind, attr};

/// Traffic statistic used as the edge label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeMetric {
	/// Mean response time in milliseconds.
	ResponseTime,
	/// Bytes per second.
	Throughput,
	/// Percentage of the source's requests.
	TrafficDistribution,
	/// Requests per second.
	TrafficRate,
}

impl EdgeMetric {
	/// Metric selected by an edge-label setting.
	pub fn from_setting(id: SettingId) -> Option<Self> {
		match id {
			SettingId::ResponseTime => Some(EdgeMetric::ResponseTime),
			SettingId::Throughput => Some(EdgeMetric::Throughput),
			SettingId::TrafficDistribution => Some(EdgeMetric::TrafficDistribution),
			SettingId::TrafficRate => Some(EdgeMetric::TrafficRate),
			_ => None,
		}
	}

	/// Edge attribute holding the metric value.
	pub const fn attribute(self) -> &'static str {
		match self {
			EdgeMetric::ResponseTime => attr::RESPONSE_TIME,
			EdgeMetric::Throughput => attr::THROUGHPUT,
			EdgeMetric::TrafficDistribution => attr::HTTP_PERCENT_REQ,
			EdgeMetric::TrafficRate => attr::HTTP,
		}
	}

	/// Render a metric value the way it is drawn on the edge.
	pub fn format(self, value: f64) -> String {
		match self {
			EdgeMetric::ResponseTime => format!("{value:.0}ms"),
			EdgeMetric::Throughput if value >= 1024.0 * 1024.0 => {
				format!("{:.2}mbps", value / (1024.0 * 1024.0))
			}
			EdgeMetric::Throughput if value >= 1024.0 => format!("{:.2}kbps", value / 1024.0),
			EdgeMetric::Throughput => format!("{value:.0}bps"),
			EdgeMetric::TrafficDistribution => format!("{value:.1}%"),
			EdgeMetric::TrafficRate => format!("{value:.2}rps"),
		}
	}
}

/// Kind of synthetic box node, from the `isBox` attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoxKind {
	/// `isBox="cluster"`.
	Cluster,
	/// `isBox="namespace"`.
	Namespace,
	/// `isBox="app"`, never hidden.
	App,
}

impl BoxKind {
	/// Value of the `isBox` attribute.
	pub const fn as_str(self) -> &'static str {
		match self {
			BoxKind::Cluster => "cluster",
			BoxKind::Namespace => "namespace",
			BoxKind::App => "app",
		}
	}
}

/// A node is hidden when any active predicate matches it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodePredicate {
	/// Box nodes of this kind.
	HideBoxes(BoxKind),
	/// Elements without observed traffic.
	HideIdle,
	/// Service nodes, except those routed outside the mesh (`isOutside`).
	HideServices,
	/// Operation nodes.
	HideOperations,
	/// Nodes flagged by the data source's find/hide expression.
	HideMarked,
}

impl NodePredicate {
	/// True when the node must be hidden.
	pub fn hides(self, node: &impl Attributes) -> bool {
		match self {
			NodePredicate::HideBoxes(kind) => node.text(attr::IS_BOX) == Some(kind.as_str()),
			NodePredicate::HideIdle => node.has(attr::IS_IDLE),
			NodePredicate::HideServices => {
				node.text(attr::NODE_TYPE) == Some("service") && !node.has(attr::IS_OUTSIDE)
			}
			NodePredicate::HideOperations => node.text(attr::NODE_TYPE) == Some("operation"),
			NodePredicate::HideMarked => node.has(attr::IS_HIDDEN),
		}
	}

	/// Attribute the predicate reads to decide.
	pub const fn attribute(self) -> &'static str {
		match self {
			NodePredicate::HideBoxes(_) => attr::IS_BOX,
			NodePredicate::HideIdle => attr::IS_IDLE,
			NodePredicate::HideServices | NodePredicate::HideOperations => attr::NODE_TYPE,
			NodePredicate::HideMarked => attr::IS_HIDDEN,
		}
	}

	/// True when the attribute's value is compared, false for presence flags.
	pub const fn reads_value(self) -> bool {
		matches!(
			self,
			NodePredicate::HideBoxes(_) | NodePredicate::HideServices | NodePredicate::HideOperations
		)
	}
}

/// An edge is hidden when any active predicate matches it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgePredicate {
	/// Edges without observed traffic (no `hasTraffic`).
	HideIdle,
	/// Elements flagged by the find/hide expression.
	HideMarked,
}

impl EdgePredicate {
	/// True when the edge must be hidden.
	pub fn hides(self, edge: &impl Attributes) -> bool {
		match self {
			EdgePredicate::HideIdle => !edge.has(attr::HAS_TRAFFIC),
			EdgePredicate::HideMarked => edge.has(attr::IS_HIDDEN),
		}
	}

	/// Attribute the test reads.
	pub const fn attribute(self) -> &'static str {
		match self {
			EdgePredicate::HideIdle => attr::HAS_TRAFFIC,
			EdgePredicate::HideMarked => attr::IS_HIDDEN,
		}
	}
}

/// Decoration drawn on visible elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Overlay {
	/// mTLS lock on edges with `isMTLS` > 0.
	Security,
	/// Workloads without a sidecar (`hasMissingSC`).
	MissingSidecar,
	/// Services with a virtual service (`hasVS`).
	VirtualService,
	/// Animated edges carrying traffic (`hasTraffic`).
	TrafficAnimation,
	/// Elements with a computed `rank`.
	Rank,
}

impl Overlay {
	/// Attribute the test reads.
	pub const fn attribute(self) -> &'static str {
		match self {
			Overlay::Security => attr::IS_MTLS,
			Overlay::MissingSidecar => attr::HAS_MISSING_SC,
			Overlay::VirtualService => attr::HAS_VS,
			Overlay::TrafficAnimation => attr::HAS_TRAFFIC,
			Overlay::Rank => attr::RANK,
		}
	}

	/// Whether the overlay decorates this element kind.
	pub const fn applies_to(self, kind: ElementKind) -> bool {
		match self {
			Overlay::Security | Overlay::TrafficAnimation => matches!(kind, ElementKind::Edge),
			Overlay::MissingSidecar | Overlay::VirtualService => matches!(kind, ElementKind::Node),
			Overlay::Rank => true,
		}
	}

	/// Only the mTLS overlay compares a value; the others test presence.
	pub const fn reads_value(self) -> bool {
		matches!(self, Overlay::Security)
	}

	/// True when the element gets the decoration.
	pub fn marks(self, element: &impl Attributes) -> bool {
		match self {
			Overlay::Security => element.number(attr::IS_MTLS).is_some_and(|v| v > 0.0),
			_ => element.has(self.attribute()),
		}
	}
}

/// Output of [`PredicateCompiler::compile`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompiledPredicates {
	/// Any match hides a node.
	pub node_predicates: Vec<NodePredicate>,
	/// Any match hides an edge.
	pub edge_predicates: Vec<EdgePredicate>,
	/// Active decorations.
	pub overlays: Vec<Overlay>,
	/// Metric drawn as edge label, if any.
	pub edge_metric: Option<EdgeMetric>,
	/// Ranking metrics in effect when [`Overlay::Rank`] is active.
	pub rank_by: Vec<SettingId>,
}

impl CompiledPredicates {
	/// Whether the overlay is active.
	pub fn has_overlay(&self, overlay: Overlay) -> bool {
		self.overlays.contains(&overlay)
	}
}

/// Turns a [`SettingsStore`] into [`CompiledPredicates`].
#[derive(Clone, Copy, Debug, Default)]
pub struct PredicateCompiler;

impl PredicateCompiler {
	/// Pure: equal settings always compile to equal predicates.
	///
	/// Fails with [`DisplayError::RankWithoutMetric`] when rank display is on
	/// but neither ranking metric is selected.
	pub fn compile(settings: &SettingsStore) -> Result<CompiledPredicates, DisplayError> {
		let on = |id| settings.value(id);
		let mut out = CompiledPredicates {
			edge_metric: settings
				.active_in(SettingGroup::EdgeLabels)
				.and_then(EdgeMetric::from_setting),
			..Default::default()
		};

		if !on(SettingId::BoxByCluster) {
			out.node_predicates.push(NodePredicate::HideBoxes(BoxKind::Cluster));
		}
		if !on(SettingId::BoxByNamespace) {
			out.node_predicates.push(NodePredicate::HideBoxes(BoxKind::Namespace));
		}
		if !on(SettingId::FilterIdleNodes) {
			out.node_predicates.push(NodePredicate::HideIdle);
		}
		if !on(SettingId::FilterServiceNodes) {
			out.node_predicates.push(NodePredicate::HideServices);
		}
		if !on(SettingId::FilterOperationNodes) {
			out.node_predicates.push(NodePredicate::HideOperations);
		}
		if !on(SettingId::FilterIdleEdges) {
			out.edge_predicates.push(EdgePredicate::HideIdle);
		}
		if on(SettingId::FilterHide) {
			out.node_predicates.push(NodePredicate::HideMarked);
			out.edge_predicates.push(EdgePredicate::HideMarked);
		}

		for (id, overlay) in [
			(SettingId::FilterSecurity, Overlay::Security),
			(SettingId::FilterSidecars, Overlay::MissingSidecar),
			(SettingId::FilterVS, Overlay::VirtualService),
			(SettingId::FilterTrafficAnimation, Overlay::TrafficAnimation),
		] {
			if on(id) {
				out.overlays.push(overlay);
			}
		}

		if on(SettingId::Rank) {
			if !settings.has_rank_metric() {
				return Err(DisplayError::RankWithoutMetric);
			}
			out.overlays.push(Overlay::Rank);
			out.rank_by = SettingId::RANK_METRICS
				.into_iter()
				.filter(|&id| on(id))
				.collect();
		}

		debug!(
			"mesh-graph: compiled {} node, {} edge predicates, overlays {:?}, label {:?}",
			out.node_predicates.len(),
			out.edge_predicates.len(),
			out.overlays,
			out.edge_metric
		);
		Ok(out)
	}
}
