//! Graph page configuration carried in the URL query string.
//!
//! `/console/graph/namespaces?refresh=0&namespaces=bookinfo,travel&edges=responseTime&filterIdleEdges=true`
//!
//! Keys:
//! - `namespaces`: comma-separated namespaces to graph
//! - `refresh`: refresh interval in milliseconds, `0` pauses polling
//! - `edges`: edge-label metric id, or `noEdgeLabels`
//! - any setting id (`filterIdleEdges`, `rank`, ...) with `true`/`false`

use log::{debug, warn};
use regex::Regex;
use url::form_urlencoded;

use crate::components::display::{DisplayError, SettingGroup, SettingId, SettingKind, SettingsStore};

const NO_EDGE_LABELS: &str = "noEdgeLabels";

/// Namespaces never offered for graphing, as unanchored regular expressions.
#[derive(Clone, Debug, Default)]
pub struct NamespaceExcludes {
	patterns: Vec<Regex>,
}

impl NamespaceExcludes {
	/// Compile the patterns; fails on the first invalid one.
	pub fn new<I, S>(patterns: I) -> Result<Self, DisplayError>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let patterns = patterns
			.into_iter()
			.map(|p| Regex::new(p.as_ref()))
			.collect::<Result<Vec<_>, _>>()?;
		Ok(Self { patterns })
	}

	/// True when any pattern matches somewhere in the name.
	pub fn is_excluded(&self, namespace: &str) -> bool {
		self.patterns.iter().any(|p| p.is_match(namespace))
	}
}

/// Everything the graph page reads from its URL.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphPageConfig {
	/// Namespaces to graph, de-duplicated, in query order.
	pub namespaces: Vec<String>,
	/// Refresh interval in milliseconds; `0` pauses polling.
	pub refresh_ms: u64,
	/// Display settings after applying the query overrides.
	pub settings: SettingsStore,
}

impl GraphPageConfig {
	/// Strict parse without namespace exclusions.
	pub fn from_query(query: &str) -> Result<Self, DisplayError> {
		Self::from_query_with_excludes(query, &NamespaceExcludes::default())
	}

	/// Parse a query string (with or without the leading `?`). Settings are
	/// applied in query order through the store's toggle operations, so their
	/// side effects hold here too. Fails on the first invalid value.
	pub fn from_query_with_excludes(
		query: &str,
		excludes: &NamespaceExcludes,
	) -> Result<Self, DisplayError> {
		let mut config = Self::default();
		for (key, value) in pairs(query) {
			config.apply_pair(&key, &value, excludes)?;
		}
		Ok(config)
	}

	/// Like [`Self::from_query_with_excludes`], but a bad value only skips its
	/// own key. The skipped keys come back as errors next to the config.
	pub fn from_query_lossy(query: &str, excludes: &NamespaceExcludes) -> (Self, Vec<DisplayError>) {
		let mut config = Self::default();
		let mut errors = Vec::new();
		for (key, value) in pairs(query) {
			if let Err(e) = config.apply_pair(&key, &value, excludes) {
				errors.push(e);
			}
		}
		(config, errors)
	}

	fn apply_pair(&mut self, key: &str, value: &str, excludes: &NamespaceExcludes) -> Result<(), DisplayError> {
		let invalid = || DisplayError::InvalidQueryValue {
			key: key.to_string(),
			value: value.to_string(),
		};
		match key {
			"namespaces" => {
				for ns in value.split(',').map(str::trim).filter(|ns| !ns.is_empty()) {
					if excludes.is_excluded(ns) {
						debug!("mesh-graph: namespace {ns} is excluded");
					} else if !self.namespaces.iter().any(|n| n == ns) {
						self.namespaces.push(ns.to_string());
					}
				}
			}
			"refresh" => self.refresh_ms = value.parse().map_err(|_| invalid())?,
			"edges" if value == NO_EDGE_LABELS => self.settings.clear_group(SettingGroup::EdgeLabels),
			"edges" => {
				let id: SettingId = value.parse().map_err(|_| invalid())?;
				if id.kind() != SettingKind::Exclusive(SettingGroup::EdgeLabels) {
					return Err(invalid());
				}
				self.settings.enable(id);
			}
			other => match other.parse::<SettingId>() {
				Ok(id) => {
					let on = value.parse::<bool>().map_err(|_| invalid())?;
					self.settings.set(id, on);
				}
				Err(_) => warn!("mesh-graph: ignoring query parameter {other}"),
			},
		}
		Ok(())
	}

	/// Query string reproducing this configuration with [`Self::from_query`].
	pub fn to_query(&self) -> String {
		let mut query = form_urlencoded::Serializer::new(String::new());
		query.append_pair("refresh", &self.refresh_ms.to_string());
		if !self.namespaces.is_empty() {
			query.append_pair("namespaces", &self.namespaces.join(","));
		}
		if let Some(id) = self.settings.active_in(SettingGroup::EdgeLabels) {
			query.append_pair("edges", id.as_str());
		}

		let rank = self.settings.value(SettingId::Rank);
		for (id, on) in self.settings.iter() {
			if matches!(id.kind(), SettingKind::Exclusive(_)) {
				continue;
			}
			// Enabling rank forces inboundEdges on; write the metrics explicitly after it.
			let pinned = rank && SettingId::RANK_METRICS.contains(&id);
			if pinned || on != id.default_value() {
				query.append_pair(id.as_str(), if on { "true" } else { "false" });
			}
		}
		query.finish()
	}
}

fn pairs(query: &str) -> form_urlencoded::Parse<'_> {
	let query = query.strip_prefix('?').unwrap_or(query);
	form_urlencoded::parse(query.as_bytes())
}
