//! mesh-graph-display: display settings for service-mesh topology graphs.
//!
//! The [`components::display`] module holds the framework-independent model
//! (settings, predicate compilation, graph filtering). The remaining
//! components are a thin WASM client that renders the settings menu and a
//! summary of what the current settings leave visible.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;
pub mod config;

pub use components::display::{
	DisplayError, GraphFilter, GraphSnapshot, PredicateCompiler, SettingId, SettingsStore,
	ToggleAction, VisibilityResult, evaluate,
};
pub use config::{GraphPageConfig, NamespaceExcludes};

use components::settings_panel::DisplaySettingsPanel;
use components::summary::GraphSummary;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("mesh-graph: logging initialized");
}

/// Load the graph snapshot from a script element with id="graph-data".
fn load_snapshot() -> Option<GraphSnapshot> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("graph-data")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match GraphSnapshot::from_json(&json_text) {
		Ok(snapshot) => {
			info!(
				"mesh-graph: loaded {} nodes, {} edges",
				snapshot.nodes.len(),
				snapshot.edges.len()
			);
			Some(snapshot)
		}
		Err(e) => {
			warn!("mesh-graph: {e}");
			None
		}
	}
}

/// Page configuration from `window.location.search`.
fn load_config() -> GraphPageConfig {
	let search = web_sys::window()
		.and_then(|w| w.location().search().ok())
		.unwrap_or_default();
	let (config, errors) = GraphPageConfig::from_query_lossy(&search, &NamespaceExcludes::default());
	for e in errors {
		warn!("mesh-graph: {e}; keeping its default");
	}
	config
}

/// Mirror the display state into the address bar so reloads keep it.
fn sync_location(config: &GraphPageConfig) {
	let Some(window) = web_sys::window() else {
		return;
	};
	let Ok(history) = window.history() else {
		return;
	};
	let url = format!("?{}", config.to_query());
	if let Err(e) = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&url)) {
		warn!("mesh-graph: could not update location: {e:?}");
	}
}

/// Main application component.
/// Reads the page configuration and snapshot from the DOM, then renders the
/// display settings menu next to the graph summary.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let GraphPageConfig {
		namespaces,
		refresh_ms,
		settings,
	} = load_config();
	let snapshot = load_snapshot().unwrap_or_default();

	let settings = RwSignal::new(settings);
	let snapshot_signal = Signal::derive(move || snapshot.clone());
	let namespaces_signal = {
		let namespaces = namespaces.clone();
		Signal::derive(move || namespaces.clone())
	};

	Effect::new(move |_| {
		sync_location(&GraphPageConfig {
			namespaces: namespaces.clone(),
			refresh_ms,
			settings: settings.get(),
		});
	});

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="graph-page">
			<div class="graph-toolbar">
				<DisplaySettingsPanel settings=settings />
			</div>
			<GraphSummary namespaces=namespaces_signal settings=settings snapshot=snapshot_signal />
		</div>
	}
}
