//! The graph "Display" dropdown: one radio per edge-label metric and one
//! checkbox per remaining setting. Inputs carry the setting id as their DOM id.

use leptos::prelude::*;

use super::display::{SettingGroup, SettingId, SettingKind, SettingsStore};

/// Dropdown bound to the session's settings; every change goes through the
/// store's toggle operations.
#[component]
pub fn DisplaySettingsPanel(
	/// Session display settings.
	settings: RwSignal<SettingsStore>,
) -> impl IntoView {
	let (open, set_open) = signal(false);

	let edge_labels = SettingGroup::EdgeLabels
		.members()
		.iter()
		.copied()
		.map(|id| {
			view! {
				<label class="display-settings-option">
					<input
						type="radio"
						name="edgeLabels"
						id=id.as_str()
						prop:checked=move || settings.with(|s| s.value(id))
						on:change=move |_| settings.update(|s| s.enable(id))
					/>
					{id.label()}
				</label>
			}
		})
		.collect_view();

	let toggles = SettingId::ALL
		.into_iter()
		.filter(|id| id.kind() == SettingKind::Boolean)
		.map(|id| {
			view! {
				<label class="display-settings-option">
					<input
						type="checkbox"
						id=id.as_str()
						prop:checked=move || settings.with(|s| s.value(id))
						on:change=move |ev| {
							let checked = event_target_checked(&ev);
							settings.update(|s| s.set(id, checked));
						}
					/>
					{id.label()}
				</label>
			}
		})
		.collect_view();

	view! {
		<div class="display-settings">
			<button id="display-settings" on:click=move |_| set_open.update(|o| *o = !*o)>
				"Display"
			</button>
			<div
				class="display-settings-menu"
				style:display={move || if open.get() { "block" } else { "none" }}
			>
				<fieldset>
					<legend>"Show Edge Labels"</legend>
					<label class="display-settings-option">
						<input
							type="radio"
							name="edgeLabels"
							id="noEdgeLabels"
							prop:checked=move || {
								settings.with(|s| s.active_in(SettingGroup::EdgeLabels).is_none())
							}
							on:change=move |_| settings.update(|s| s.clear_group(SettingGroup::EdgeLabels))
						/>
						"No Edge Labels"
					</label>
					{edge_labels}
				</fieldset>
				<fieldset>
					<legend>"Show"</legend>
					{toggles}
				</fieldset>
				<button id="display-settings-reset" on:click=move |_| settings.update(SettingsStore::reset)>
					"Reset"
				</button>
			</div>
		</div>
	}
}
