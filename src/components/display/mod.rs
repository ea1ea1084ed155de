//! Graph display settings model.
//!
//! Turns the toggles of the graph "Display" menu into element predicates and
//! evaluates them against a topology snapshot:
//!
//! - [`SettingsStore`] holds the current value of every toggle
//! - [`PredicateCompiler`] derives node/edge predicates and overlays from it
//! - [`GraphFilter`] applies them to a [`GraphSnapshot`], producing a
//!   [`VisibilityResult`]
//!
//! # Example
//!
//! ```
//! use mesh_graph_display::{GraphFilter, GraphSnapshot, PredicateCompiler, SettingsStore, ToggleAction};
//!
//! let mut settings = SettingsStore::new();
//! settings.toggle_option("idle edges", ToggleAction::Enable).unwrap();
//!
//! let snapshot = GraphSnapshot::from_json(
//!     r#"{ "nodes": [{ "data": { "id": "a" } }], "edges": [{ "data": { "id": "e", "source": "a", "target": "a" } }] }"#,
//! ).unwrap();
//! let predicates = PredicateCompiler::compile(&settings).unwrap();
//! let result = GraphFilter::apply(&predicates, &snapshot);
//! assert!(result.is_visible("e"));
//! ```

mod error;
mod filter;
mod predicates;
mod settings;
mod types;

pub use error::{DisplayError, MissingAttribute};
pub use filter::{EdgeLabel, EdgeVisibility, GraphFilter, NodeVisibility, VisibilityResult};
pub use predicates::{
	BoxKind, CompiledPredicates, EdgeMetric, EdgePredicate, NodePredicate, Overlay,
	PredicateCompiler,
};
pub use settings::{
	OPTION_NAMES, SettingGroup, SettingId, SettingKind, SettingsStore, ToggleAction,
	option_setting,
};
pub use types::{
	AttrValue, AttributeSchema, Attributes, ElementKind, GraphEdge, GraphNode, GraphSnapshot, attr,
};

/// Compile and apply in one step.
pub fn evaluate(
	settings: &SettingsStore,
	snapshot: &GraphSnapshot,
) -> Result<VisibilityResult, DisplayError> {
	let predicates = PredicateCompiler::compile(settings)?;
	Ok(GraphFilter::apply(&predicates, snapshot))
}
