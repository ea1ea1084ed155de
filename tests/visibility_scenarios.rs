use mesh_graph_display::components::display::{Overlay, attr};
use mesh_graph_display::{
	DisplayError, GraphFilter, GraphSnapshot, PredicateCompiler, SettingId, SettingsStore,
	ToggleAction, evaluate,
};
use serde_json::json;

fn snapshot(value: serde_json::Value) -> GraphSnapshot {
	serde_json::from_value(value).expect("valid snapshot")
}

fn bookinfo() -> GraphSnapshot {
	snapshot(json!({
		"nodes": [
			{ "data": { "id": "box-app", "isBox": "app", "namespace": "bookinfo" } },
			{ "data": { "id": "box-ns", "isBox": "namespace", "namespace": "bookinfo" } },
			{ "data": { "id": "productpage", "nodeType": "app", "namespace": "bookinfo", "parent": "box-app" } },
			{ "data": { "id": "reviews", "nodeType": "service", "namespace": "bookinfo" } },
			{ "data": { "id": "details", "nodeType": "workload", "namespace": "bookinfo" } }
		],
		"edges": [
			{ "data": { "id": "e-pp-rev", "source": "productpage", "target": "reviews",
				"hasTraffic": true, "http": "10.00", "httpPercentReq": "75.0", "responseTime": "23", "isMTLS": 100 } },
			{ "data": { "id": "e-pp-det", "source": "productpage", "target": "details",
				"hasTraffic": true, "http": "3.33", "httpPercentReq": "25.0", "responseTime": "8" } },
			{ "data": { "id": "e-rev-det", "source": "reviews", "target": "details" } }
		]
	}))
}

#[test]
fn apply_is_idempotent() {
	let mut settings = SettingsStore::new();
	settings.enable(SettingId::ResponseTime);
	settings.enable(SettingId::FilterSecurity);
	let predicates = PredicateCompiler::compile(&settings).unwrap();
	let snap = bookinfo();

	let first = GraphFilter::apply(&predicates, &snap);
	let second = GraphFilter::apply(&predicates, &snap);
	assert_eq!(first, second);
}

#[test]
fn default_settings_scenario() {
	let result = evaluate(&SettingsStore::new(), &bookinfo()).unwrap();

	for id in ["box-app", "box-ns", "productpage", "reviews", "details"] {
		assert!(result.is_visible(id), "{id} should be visible");
	}
	for hidden_kind in [Overlay::Rank, Overlay::MissingSidecar, Overlay::VirtualService] {
		assert!(result.with_overlay(hidden_kind).is_empty());
	}
	assert!(result.edges.iter().all(|e| e.label.is_none()));
	assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
}

#[test]
fn default_settings_hide_attribute_bearing_nodes() {
	let snap = snapshot(json!({
		"nodes": [
			{ "data": { "id": "box-cluster", "isBox": "cluster" } },
			{ "data": { "id": "idle", "nodeType": "app", "isIdle": true } },
			{ "data": { "id": "op", "nodeType": "operation" } },
			{ "data": { "id": "marked", "nodeType": "app", "isHidden": true } },
			{ "data": { "id": "ranked", "nodeType": "app", "rank": 3 } }
		],
		"edges": []
	}));
	let mut settings = SettingsStore::new();
	settings.disable(SettingId::BoxByCluster);
	let result = evaluate(&settings, &snap).unwrap();

	for id in ["box-cluster", "idle", "op", "marked"] {
		assert!(!result.is_visible(id), "{id} should be hidden");
	}
	assert!(result.is_visible("ranked"));
	assert!(result.with_overlay(Overlay::Rank).is_empty());

	settings.enable(SettingId::Rank);
	let ranked = evaluate(&settings, &snap).unwrap();
	assert_eq!(ranked.with_overlay(Overlay::Rank), vec!["ranked"]);
}

#[test]
fn idle_edges_toggle_only_changes_idle_edges() {
	let snap = bookinfo();
	let mut settings = SettingsStore::new();
	let before = evaluate(&settings, &snap).unwrap();
	settings
		.toggle_option("idle edges", ToggleAction::Enable)
		.unwrap();
	let after = evaluate(&settings, &snap).unwrap();

	assert!(!before.is_visible("e-rev-det"));
	assert!(after.is_visible("e-rev-det"));
	for (b, a) in before.edges.iter().zip(&after.edges) {
		if b.id != "e-rev-det" {
			assert_eq!(b.visible, a.visible, "{}", b.id);
		}
	}
	assert_eq!(
		before.nodes.iter().map(|n| n.visible).collect::<Vec<_>>(),
		after.nodes.iter().map(|n| n.visible).collect::<Vec<_>>()
	);
}

#[test]
fn outside_service_survives_service_filter() {
	let snap = snapshot(json!({
		"nodes": [
			{ "data": { "id": "inside", "nodeType": "service" } },
			{ "data": { "id": "outside", "nodeType": "service", "isOutside": true } },
			{ "data": { "id": "app", "nodeType": "app" } }
		]
	}));
	let mut settings = SettingsStore::new();
	settings
		.toggle_option("service nodes", ToggleAction::Disable)
		.unwrap();
	let result = evaluate(&settings, &snap).unwrap();

	assert!(!result.is_visible("inside"));
	assert!(result.is_visible("outside"));
	assert!(result.is_visible("app"));
}

#[test]
fn response_time_labels_end_in_ms() {
	let mut settings = SettingsStore::new();
	settings
		.toggle_option("response time", ToggleAction::Enable)
		.unwrap();
	let result = evaluate(&settings, &bookinfo()).unwrap();

	let labels: Vec<&str> = result
		.visible_edges()
		.filter_map(|e| e.label.as_ref())
		.map(|l| l.text.as_str())
		.collect();
	assert_eq!(labels, vec!["23ms", "8ms"]);
	assert!(
		result
			.visible_edges()
			.filter_map(|e| e.label.as_ref())
			.all(|l| l.attribute() == attr::RESPONSE_TIME)
	);
}

#[test]
fn traffic_distribution_reads_percent_requests() {
	let mut settings = SettingsStore::new();
	settings.enable(SettingId::TrafficDistribution);
	let result = evaluate(&settings, &bookinfo()).unwrap();
	let label = result.edge("e-pp-rev").and_then(|e| e.label.as_ref()).unwrap();
	assert_eq!(label.attribute(), attr::HTTP_PERCENT_REQ);
	assert_eq!(label.text, "75.0%");
}

#[test]
fn new_snapshot_does_not_inherit_previous_result() {
	let settings = SettingsStore::new();
	let stale = evaluate(&settings, &bookinfo()).unwrap();
	let fresh = evaluate(&settings, &GraphSnapshot::default()).unwrap();
	assert!(!stale.nodes.is_empty());
	assert!(fresh.nodes.is_empty());
	assert!(fresh.edges.is_empty());
}

#[test]
fn rank_without_metric_fails_fast() {
	let mut settings = SettingsStore::new();
	settings.enable(SettingId::Rank);
	settings.disable(SettingId::InboundEdges);
	assert!(matches!(
		evaluate(&settings, &bookinfo()),
		Err(DisplayError::RankWithoutMetric)
	));
}

#[test]
fn security_overlay_marks_mtls_edges_only() {
	let mut settings = SettingsStore::new();
	settings.toggle_option("security", ToggleAction::Enable).unwrap();
	let result = evaluate(&settings, &bookinfo()).unwrap();
	assert_eq!(result.with_overlay(Overlay::Security), vec!["e-pp-rev"]);
	assert!(result.is_visible("e-pp-det"));
}

#[test]
fn sidecar_and_virtual_service_marks_follow_their_toggles() {
	let snap = snapshot(json!({
		"nodes": [
			{ "data": { "id": "no-sidecar", "nodeType": "workload", "hasMissingSC": true } },
			{ "data": { "id": "routed", "nodeType": "service", "hasVS": true } },
			{ "data": { "id": "plain", "nodeType": "app" } }
		]
	}));
	let mut settings = SettingsStore::new();
	let on = evaluate(&settings, &snap).unwrap();
	assert_eq!(on.with_overlay(Overlay::MissingSidecar), vec!["no-sidecar"]);
	assert_eq!(on.with_overlay(Overlay::VirtualService), vec!["routed"]);

	settings
		.toggle_option("missing sidecars", ToggleAction::Disable)
		.unwrap();
	settings
		.toggle_option("virtual services", ToggleAction::Disable)
		.unwrap();
	let off = evaluate(&settings, &snap).unwrap();
	assert!(off.with_overlay(Overlay::MissingSidecar).is_empty());
	assert!(off.with_overlay(Overlay::VirtualService).is_empty());
	for id in ["no-sidecar", "routed", "plain"] {
		assert!(off.is_visible(id), "{id} should stay visible");
	}
}

#[test]
fn traffic_animation_marks_edges_with_traffic() {
	let snap = bookinfo();
	let mut settings = SettingsStore::new();
	settings.enable(SettingId::FilterIdleEdges);
	let off = evaluate(&settings, &snap).unwrap();
	assert!(off.with_overlay(Overlay::TrafficAnimation).is_empty());

	settings
		.toggle_option("traffic animation", ToggleAction::Enable)
		.unwrap();
	let on = evaluate(&settings, &snap).unwrap();
	assert_eq!(
		on.with_overlay(Overlay::TrafficAnimation),
		vec!["e-pp-rev", "e-pp-det"]
	);
	assert!(on.edge_visible("e-rev-det"));
}

#[test]
fn namespace_boxes_toggle_keeps_app_boxes() {
	let snap = bookinfo();
	let mut settings = SettingsStore::new();
	settings
		.toggle_option("namespace boxes", ToggleAction::Disable)
		.unwrap();
	let off = evaluate(&settings, &snap).unwrap();
	assert!(!off.node_visible("box-ns"));
	assert!(off.node_visible("box-app"));

	settings
		.toggle_option("namespace boxes", ToggleAction::Enable)
		.unwrap();
	let on = evaluate(&settings, &snap).unwrap();
	assert!(on.node_visible("box-ns"));
	assert!(on.node_visible("box-app"));
}

#[test]
fn operation_nodes_appear_when_enabled() {
	let snap = snapshot(json!({
		"nodes": [
			{ "data": { "id": "op", "nodeType": "operation" } },
			{ "data": { "id": "svc", "nodeType": "service" } }
		]
	}));
	let mut settings = SettingsStore::new();
	assert!(!evaluate(&settings, &snap).unwrap().node_visible("op"));

	settings
		.toggle_option("operation nodes", ToggleAction::Enable)
		.unwrap();
	let result = evaluate(&settings, &snap).unwrap();
	assert!(result.node_visible("op"));
	assert!(result.node_visible("svc"));
}
