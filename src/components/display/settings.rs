//! Display settings: the toggles behind the graph's "Display" dropdown.
//!
//! Every setting is a boolean. Edge-label metrics form a mutually exclusive
//! group, so at most one of them is on at any time. Two couplings are applied
//! as explicit side effects of [`SettingsStore::enable`]:
//!
//! - enabling a member of an exclusive group disables the other members;
//! - enabling [`SettingId::Rank`] also enables [`SettingId::InboundEdges`],
//!   since ranks are computed from a ranking metric.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use log::debug;

use super::error::DisplayError;

/// Identifier of a registered display setting.
///
/// Declaration order is the store's iteration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SettingId {
	/// Label edges with response time.
	ResponseTime,
	/// Label edges with throughput.
	Throughput,
	/// Label edges with their share of requests.
	TrafficDistribution,
	/// Label edges with request rate.
	TrafficRate,
	/// Show cluster boxes.
	BoxByCluster,
	/// Show namespace boxes.
	BoxByNamespace,
	/// Apply the find/hide marks.
	FilterHide,
	/// Show edges without traffic.
	FilterIdleEdges,
	/// Show nodes without traffic.
	FilterIdleNodes,
	/// Show operation nodes.
	FilterOperationNodes,
	/// Mark ranked elements.
	Rank,
	/// Rank by inbound edge count.
	InboundEdges,
	/// Rank by outbound edge count.
	OutboundEdges,
	/// Show service nodes.
	FilterServiceNodes,
	/// Animate edges carrying traffic.
	FilterTrafficAnimation,
	/// Mark workloads missing a sidecar.
	FilterSidecars,
	/// Mark mTLS edges.
	FilterSecurity,
	/// Mark services with a virtual service.
	FilterVS,
}

/// Mutually exclusive groups of settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SettingGroup {
	/// Edge-label metric radios.
	EdgeLabels,
}

impl SettingGroup {
	/// Settings belonging to the group, in display order.
	pub const fn members(self) -> &'static [SettingId] {
		match self {
			SettingGroup::EdgeLabels => &[
				SettingId::ResponseTime,
				SettingId::Throughput,
				SettingId::TrafficDistribution,
				SettingId::TrafficRate,
			],
		}
	}
}

/// How a setting is rendered and how enabling it behaves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingKind {
	/// Independent checkbox.
	Boolean,
	/// Radio within a mutually exclusive group.
	Exclusive(SettingGroup),
}

impl SettingId {
	/// Every registered setting, in store order.
	pub const ALL: [SettingId; 18] = [
		SettingId::ResponseTime,
		SettingId::Throughput,
		SettingId::TrafficDistribution,
		SettingId::TrafficRate,
		SettingId::BoxByCluster,
		SettingId::BoxByNamespace,
		SettingId::FilterHide,
		SettingId::FilterIdleEdges,
		SettingId::FilterIdleNodes,
		SettingId::FilterOperationNodes,
		SettingId::Rank,
		SettingId::InboundEdges,
		SettingId::OutboundEdges,
		SettingId::FilterServiceNodes,
		SettingId::FilterTrafficAnimation,
		SettingId::FilterSidecars,
		SettingId::FilterSecurity,
		SettingId::FilterVS,
	];

	/// Settings that can serve as the ranking metric.
	pub const RANK_METRICS: [SettingId; 2] = [SettingId::InboundEdges, SettingId::OutboundEdges];

	/// Internal id, also used as the DOM input id and URL query key.
	pub const fn as_str(self) -> &'static str {
		match self {
			SettingId::ResponseTime => "responseTime",
			SettingId::Throughput => "throughput",
			SettingId::TrafficDistribution => "trafficDistribution",
			SettingId::TrafficRate => "trafficRate",
			SettingId::BoxByCluster => "boxByCluster",
			SettingId::BoxByNamespace => "boxByNamespace",
			SettingId::FilterHide => "filterHide",
			SettingId::FilterIdleEdges => "filterIdleEdges",
			SettingId::FilterIdleNodes => "filterIdleNodes",
			SettingId::FilterOperationNodes => "filterOperationNodes",
			SettingId::Rank => "rank",
			SettingId::InboundEdges => "inboundEdges",
			SettingId::OutboundEdges => "outboundEdges",
			SettingId::FilterServiceNodes => "filterServiceNodes",
			SettingId::FilterTrafficAnimation => "filterTrafficAnimation",
			SettingId::FilterSidecars => "filterSidecars",
			SettingId::FilterSecurity => "filterSecurity",
			SettingId::FilterVS => "filterVS",
		}
	}

	/// Text shown next to the control in the settings panel.
	pub const fn label(self) -> &'static str {
		match self {
			SettingId::ResponseTime => "Response Time",
			SettingId::Throughput => "Throughput",
			SettingId::TrafficDistribution => "Traffic Distribution",
			SettingId::TrafficRate => "Traffic Rate",
			SettingId::BoxByCluster => "Cluster Boxes",
			SettingId::BoxByNamespace => "Namespace Boxes",
			SettingId::FilterHide => "Hide",
			SettingId::FilterIdleEdges => "Idle Edges",
			SettingId::FilterIdleNodes => "Idle Nodes",
			SettingId::FilterOperationNodes => "Operation Nodes",
			SettingId::Rank => "Rank",
			SettingId::InboundEdges => "Inbound Edges",
			SettingId::OutboundEdges => "Outbound Edges",
			SettingId::FilterServiceNodes => "Service Nodes",
			SettingId::FilterTrafficAnimation => "Traffic Animation",
			SettingId::FilterSidecars => "Missing Sidecars",
			SettingId::FilterSecurity => "Security",
			SettingId::FilterVS => "Virtual Services",
		}
	}

	/// Value after store creation or [`SettingsStore::reset`].
	pub const fn default_value(self) -> bool {
		matches!(
			self,
			SettingId::BoxByCluster
				| SettingId::BoxByNamespace
				| SettingId::FilterHide
				| SettingId::FilterServiceNodes
				| SettingId::FilterSidecars
				| SettingId::FilterVS
		)
	}

	/// Boolean or member of an exclusive group.
	pub const fn kind(self) -> SettingKind {
		match self {
			SettingId::ResponseTime
			| SettingId::Throughput
			| SettingId::TrafficDistribution
			| SettingId::TrafficRate => SettingKind::Exclusive(SettingGroup::EdgeLabels),
			_ => SettingKind::Boolean,
		}
	}
}

impl fmt::Display for SettingId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for SettingId {
	type Err = DisplayError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		SettingId::ALL
			.into_iter()
			.find(|id| id.as_str() == s)
			.ok_or_else(|| DisplayError::UnknownSetting(s.to_string()))
	}
}

/// Human-facing option names accepted by [`SettingsStore::toggle_option`].
///
/// Test scripts drive the store with these exact phrases.
pub const OPTION_NAMES: &[(&str, SettingId)] = &[
	("cluster boxes", SettingId::BoxByCluster),
	("namespace boxes", SettingId::BoxByNamespace),
	("idle edges", SettingId::FilterIdleEdges),
	("idle nodes", SettingId::FilterIdleNodes),
	("missing sidecars", SettingId::FilterSidecars),
	("operation nodes", SettingId::FilterOperationNodes),
	("rank", SettingId::Rank),
	("security", SettingId::FilterSecurity),
	("service nodes", SettingId::FilterServiceNodes),
	("traffic animation", SettingId::FilterTrafficAnimation),
	("virtual services", SettingId::FilterVS),
	("hide", SettingId::FilterHide),
	("response time", SettingId::ResponseTime),
	("throughput", SettingId::Throughput),
	("traffic distribution", SettingId::TrafficDistribution),
	("traffic rate", SettingId::TrafficRate),
];

/// Look up the setting behind a human-facing option name (case-insensitive).
pub fn option_setting(option: &str) -> Result<SettingId, DisplayError> {
	let wanted = option.trim().to_lowercase();
	OPTION_NAMES
		.iter()
		.find(|(name, _)| *name == wanted)
		.map(|(_, id)| *id)
		.ok_or_else(|| DisplayError::UnknownOption(option.to_string()))
}

/// What to do with an option: the "enables"/"disables" step words.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleAction {
	/// Turn the option on.
	Enable,
	/// Turn the option off.
	Disable,
}

impl FromStr for ToggleAction {
	type Err = DisplayError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_lowercase().as_str() {
			"enable" | "enables" | "appear" => Ok(ToggleAction::Enable),
			"disable" | "disables" | "not appear" => Ok(ToggleAction::Disable),
			_ => Err(DisplayError::UnknownAction(s.to_string())),
		}
	}
}

/// Current value of every display setting.
///
/// Created with all defaults; only the named operations below mutate it, so
/// every id always has a defined value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SettingsStore {
	values: BTreeMap<SettingId, bool>,
}

impl Default for SettingsStore {
	fn default() -> Self {
		Self::new()
	}
}

impl SettingsStore {
	/// A store holding every default.
	pub fn new() -> Self {
		Self {
			values: SettingId::ALL
				.into_iter()
				.map(|id| (id, id.default_value()))
				.collect(),
		}
	}

	/// Current value of a setting.
	pub fn value(&self, id: SettingId) -> bool {
		self.values.get(&id).copied().unwrap_or_else(|| id.default_value())
	}

	/// Value of a setting by its internal id string.
	pub fn get(&self, id: &str) -> Result<bool, DisplayError> {
		Ok(self.value(id.parse()?))
	}

	/// Turn a setting on, applying the group and rank side effects.
	pub fn enable(&mut self, id: SettingId) {
		debug!("mesh-graph: enable {id}");
		if let SettingKind::Exclusive(group) = id.kind() {
			for &other in group.members() {
				self.values.insert(other, false);
			}
		}
		self.values.insert(id, true);
		if id == SettingId::Rank {
			self.values.insert(SettingId::InboundEdges, true);
		}
	}

	/// Turn a setting off. No side effects.
	pub fn disable(&mut self, id: SettingId) {
		debug!("mesh-graph: disable {id}");
		self.values.insert(id, false);
	}

	/// [`Self::enable`] or [`Self::disable`] depending on `on`.
	pub fn set(&mut self, id: SettingId, on: bool) {
		if on {
			self.enable(id);
		} else {
			self.disable(id);
		}
	}

	/// Apply an action to the setting behind a human-facing option name.
	/// Returns the setting that was changed.
	pub fn toggle_option(
		&mut self,
		option: &str,
		action: ToggleAction,
	) -> Result<SettingId, DisplayError> {
		let id = option_setting(option)?;
		self.set(id, action == ToggleAction::Enable);
		Ok(id)
	}

	/// Turn off every member of a group (the "no edge labels" choice).
	pub fn clear_group(&mut self, group: SettingGroup) {
		debug!("mesh-graph: clear {group:?}");
		for &id in group.members() {
			self.values.insert(id, false);
		}
	}

	/// The enabled member of a group, if any.
	pub fn active_in(&self, group: SettingGroup) -> Option<SettingId> {
		group.members().iter().copied().find(|&id| self.value(id))
	}

	/// Restore every default.
	pub fn reset(&mut self) {
		debug!("mesh-graph: reset display settings");
		*self = Self::new();
	}

	/// All settings in declaration order.
	pub fn iter(&self) -> impl Iterator<Item = (SettingId, bool)> + '_ {
		self.values.iter().map(|(&id, &on)| (id, on))
	}

	/// Settings whose value differs from the default.
	pub fn changed(&self) -> impl Iterator<Item = (SettingId, bool)> + '_ {
		self.iter().filter(|(id, on)| *on != id.default_value())
	}

	/// Whether any ranking metric is on.
	pub fn has_rank_metric(&self) -> bool {
		SettingId::RANK_METRICS.into_iter().any(|id| self.value(id))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_match_the_documented_table() {
		let store = SettingsStore::new();
		let on: Vec<&str> = store
			.iter()
			.filter(|(_, on)| *on)
			.map(|(id, _)| id.as_str())
			.collect();
		assert_eq!(
			on,
			vec![
				"boxByCluster",
				"boxByNamespace",
				"filterHide",
				"filterServiceNodes",
				"filterSidecars",
				"filterVS"
			]
		);
		assert_eq!(store.changed().count(), 0);
	}

	#[test]
	fn ids_round_trip_through_strings() {
		for id in SettingId::ALL {
			assert_eq!(id.as_str().parse::<SettingId>().ok(), Some(id));
		}
	}

	#[test]
	fn get_rejects_unregistered_ids() {
		let store = SettingsStore::new();
		assert_eq!(store.get("filterVS").ok(), Some(true));
		assert!(matches!(
			store.get("filterNothing"),
			Err(DisplayError::UnknownSetting(id)) if id == "filterNothing"
		));
	}

	#[test]
	fn enabling_an_edge_label_clears_the_others() {
		let mut store = SettingsStore::new();
		store.enable(SettingId::ResponseTime);
		store.enable(SettingId::TrafficRate);
		assert_eq!(
			store.active_in(SettingGroup::EdgeLabels),
			Some(SettingId::TrafficRate)
		);
		assert!(!store.value(SettingId::ResponseTime));

		store.clear_group(SettingGroup::EdgeLabels);
		assert_eq!(store.active_in(SettingGroup::EdgeLabels), None);
	}

	#[test]
	fn rank_pulls_in_inbound_edges() {
		let mut store = SettingsStore::new();
		store.toggle_option("rank", ToggleAction::Enable).unwrap();
		assert!(store.value(SettingId::Rank));
		assert!(store.value(SettingId::InboundEdges));

		store.toggle_option("rank", ToggleAction::Disable).unwrap();
		assert!(!store.value(SettingId::Rank));
		assert!(store.value(SettingId::InboundEdges));
	}

	#[test]
	fn option_names_are_case_insensitive() {
		let mut store = SettingsStore::new();
		let id = store
			.toggle_option("Cluster Boxes", "disables".parse().unwrap())
			.unwrap();
		assert_eq!(id, SettingId::BoxByCluster);
		assert!(!store.value(SettingId::BoxByCluster));
	}

	#[test]
	fn unmapped_option_fails_without_mutation() {
		let mut store = SettingsStore::new();
		let before = store.clone();
		assert!(matches!(
			store.toggle_option("xxx", ToggleAction::Enable),
			Err(DisplayError::UnknownOption(_))
		));
		assert_eq!(store, before);
	}

	#[test]
	fn actions_parse_from_step_vocabulary() {
		assert_eq!("enables".parse::<ToggleAction>().ok(), Some(ToggleAction::Enable));
		assert_eq!("appear".parse::<ToggleAction>().ok(), Some(ToggleAction::Enable));
		assert_eq!("not appear".parse::<ToggleAction>().ok(), Some(ToggleAction::Disable));
		assert!("flips".parse::<ToggleAction>().is_err());
	}

	#[test]
	fn reset_restores_defaults() {
		let mut store = SettingsStore::new();
		store.enable(SettingId::Throughput);
		store.disable(SettingId::FilterVS);
		store.enable(SettingId::Rank);
		store.reset();
		assert_eq!(store, SettingsStore::new());
	}
}
