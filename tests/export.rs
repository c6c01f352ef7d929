use pav_designer::config::{MissionConfig, MissionInputs, SizingConfig};
use pav_designer::export::history::write_scan_history;
use pav_designer::export::pricing::{Characteristics, estimate};
use pav_designer::export::summary::{DesignSummary, write_summary};
use pav_designer::sizing::ScanHistory;
use pav_designer::sizing::parametric::size_mission;

fn default_mission(iterate: bool) -> MissionConfig {
    MissionConfig {
        name: "export".to_string(),
        inputs: MissionInputs {
            iterate,
            ..MissionInputs::default()
        },
        sizing: SizingConfig::default(),
    }
}

#[test]
fn characteristics_are_rounded_for_the_invoice() {
    let mission = default_mission(false);
    let mut history = ScanHistory::new();
    let sized = size_mission(&mission, &mut history).expect("sized");
    let design = Characteristics::from_design(&mission.inputs, &sized.configuration);

    let cm = |v: f64| (v * 100.0).round() / 100.0;
    assert_eq!(design.wing_span_m, cm(sized.configuration.wing_span_m()));
    assert_eq!(design.fuselage_length_m, cm(sized.configuration.fuselage_length_m()));
    assert_eq!(design.baggage_allowance_kg, 120.0);
    assert_eq!(design.battery_energy_kwh.fract(), 0.0);

    let cost = estimate(&design);
    let expected_base = (design.wing_span_m + design.fuselage_length_m + 20.0) * 200.0
        + (200.0 + 300.0) * 50.0
        + 7_500.0;
    assert!((cost.base - expected_base).abs() < 1e-6);
    // Business cabin, wheels, white primary, blue secondary.
    assert!((cost.total - (expected_base + 4_000.0 + 3_000.0 + 250.0)).abs() < 1e-6);
}

#[test]
fn summary_json_describes_the_run() {
    let mission = default_mission(true);
    let mut history = ScanHistory::new();
    let sized = size_mission(&mission, &mut history).expect("sized");
    let design = Characteristics::from_design(&mission.inputs, &sized.configuration);
    let cost = estimate(&design);

    let dir = tempfile::tempdir().expect("tempdir");
    let summary_path = dir.path().join("summary.json");
    let summary = DesignSummary::new(
        &mission.name,
        &mission.inputs,
        &mission.sizing,
        &sized.result,
        &sized.configuration,
        &design,
        &cost,
    );
    write_summary(&summary_path, &summary).expect("write summary");

    let text = std::fs::read_to_string(&summary_path).expect("read summary");
    let json: serde_json::Value = serde_json::from_str(&text).expect("valid json");
    assert_eq!(json["mission"], "export");
    assert_eq!(
        json["convergence"]["outer_iterations"].as_u64(),
        Some(sized.result.outer_iterations as u64)
    );
    assert!(json["convergence"]["status"].is_string());
    assert!(json["components"].as_array().is_some_and(|c| !c.is_empty()));
    assert_eq!(json["inputs"]["quality_level"], 2);
    assert!((json["cost"]["total"].as_f64().unwrap() - cost.total).abs() < 1e-6);

    let history_path = dir.path().join("scan_history.csv");
    write_scan_history(&history_path, history.records()).expect("write history");
    let mut reader = csv::Reader::from_path(&history_path).expect("csv");
    let rows = reader.records().count();
    assert_eq!(rows, history.records().len());
}
