//! Summary panel for the current graph: selected namespaces, element counts
//! and the labeled edges that survive the display settings.

use leptos::prelude::*;

use super::display::{DisplayError, GraphSnapshot, SettingsStore, VisibilityResult, evaluate};

/// Re-evaluates the snapshot whenever the settings or snapshot change.
#[component]
pub fn GraphSummary(
	/// Namespaces selected in the URL.
	#[prop(into)]
	namespaces: Signal<Vec<String>>,
	/// Current display settings.
	#[prop(into)]
	settings: Signal<SettingsStore>,
	/// Latest graph snapshot.
	#[prop(into)]
	snapshot: Signal<GraphSnapshot>,
) -> impl IntoView {
	let result = Memo::new(move |_| {
		settings.with(|s| snapshot.with(|g| evaluate(s, g).map_err(|e| e.to_string())))
	});

	move || {
		if namespaces.with(Vec::is_empty) {
			return view! {
				<div id="empty-graph-no-namespace">"No namespace is selected"</div>
			}
			.into_any();
		}

		let heading = namespaces
			.get()
			.into_iter()
			.map(|ns| view! { <span id=format!("ns-{ns}") class="summary-namespace">{ns.clone()}</span> })
			.collect_view();

		let body = match result.get() {
			Ok(visible) => visibility_view(&visible).into_any(),
			Err(message) => view! { <div class="graph-error">{message}</div> }.into_any(),
		};

		view! {
			<div id="summary-panel-graph">
				<div id="summary-panel-graph-heading">{heading}</div>
				{body}
			</div>
		}
		.into_any()
	}
}

fn visibility_view(visible: &VisibilityResult) -> impl IntoView + use<> {
	let nodes = visible.visible_nodes().count();
	let edges = visible.visible_edges().count();
	let labels = visible
		.visible_edges()
		.map(|e| {
			let text = e.label.as_ref().map(|l| l.text.clone()).unwrap_or_default();
			view! {
				<div class="edge" data-edge=e.id.clone()>
					{format!("{} → {}", e.source, e.target)}
					<div class="edge-label">{text}</div>
				</div>
			}
		})
		.collect_view();
	let diagnostics = visible
		.diagnostics
		.iter()
		.map(|m| view! { <li>{DisplayError::from(m.clone()).to_string()}</li> })
		.collect_view();

	view! {
		<ul class="graph-diagnostics">{diagnostics}</ul>
		<div class="summary-counts">
			{format!("{nodes} nodes, {edges} edges")}
		</div>
		<div id="cy">{labels}</div>
	}
}
