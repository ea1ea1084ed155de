//! Error taxonomy for the display model.

use thiserror::Error;

use super::types::ElementKind;

/// An attribute referenced by an active predicate that the snapshot never
/// supplies. Reported, then treated as absent on every element.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct MissingAttribute {
	/// Element kind that lacks the attribute.
	pub element: ElementKind,
	/// Attribute key.
	pub attribute: &'static str,
}

/// Everything the display model can reject or report.
#[derive(Debug, Error)]
pub enum DisplayError {
	/// Setting id not registered.
	#[error("unknown setting `{0}`")]
	UnknownSetting(String),

	/// Option name not in the option table.
	#[error("unknown display option `{0}`")]
	UnknownOption(String),

	/// Action word not recognised.
	#[error("unknown toggle action `{0}` (expected enables/disables)")]
	UnknownAction(String),

	/// Rank on with no ranking metric selected.
	#[error("rank display requires a ranking metric (inboundEdges or outboundEdges)")]
	RankWithoutMetric,

	/// Snapshot lacks a value-read attribute.
	#[error("invalid snapshot: no {} declares attribute `{}`", .0.element, .0.attribute)]
	InvalidSnapshot(MissingAttribute),

	/// Snapshot JSON does not parse.
	#[error("malformed snapshot: {0}")]
	MalformedSnapshot(#[from] serde_json::Error),

	/// Namespace exclusion pattern does not compile.
	#[error("invalid namespace pattern: {0}")]
	InvalidPattern(#[from] regex::Error),

	/// Recognised query key with an unusable value.
	#[error("invalid value `{value}` for query parameter `{key}`")]
	InvalidQueryValue {
		/// Query key.
		key: String,
		/// Raw value as found in the URL.
		value: String,
	},
}

impl From<MissingAttribute> for DisplayError {
	fn from(missing: MissingAttribute) -> Self {
		DisplayError::InvalidSnapshot(missing)
	}
}
