//! ---
//! spx_section: "15-testing-qa-runbook"
//! spx_subsection: "module"
//! spx_type: "source"
//! spx_scope: "code"
//! spx_description: "ROI calculator behaviour at the API boundary."
//! spx_version: "v0.1.0"
//! spx_owner: "tbd"
//! ---
use serde_json::json;
use spectra_common::decode_json;
use spectra_roi::model::CEILING_MESSAGE;
use spectra_roi::{RoiCalculator, RoiRequest};

fn request(value: serde_json::Value) -> RoiRequest {
    decode_json(value).expect("decodes")
}

#[test]
fn reference_payload_produces_expected_figures() {
    let input = request(json!({"volume": 10_000_000, "spread": 2.5, "optimization": 0.003}))
        .into_input()
        .unwrap();
    let result = RoiCalculator::default().compute(&input).unwrap();

    let body = serde_json::to_value(&result).unwrap();
    assert!((body["monthlySaving"].as_f64().unwrap() - 75_000.0).abs() < 1e-6);
    assert!((body["annualSaving"].as_f64().unwrap() - 900_000.0).abs() < 1e-6);
    assert_eq!(body["formatted"]["roiMultiple"], "250.8x");
    assert_eq!(body["formatted"]["annualSaving"], "900\u{202F}000\u{00A0}€");
}

#[test]
fn optimization_above_ceiling_is_rejected() {
    let err = request(json!({"volume": 1_000, "spread": 1, "optimization": 0.11}))
        .into_input()
        .unwrap_err();
    assert_eq!(err.issues().len(), 1);
    assert_eq!(err.issues()[0].path, "optimization");
    assert_eq!(err.issues()[0].message, CEILING_MESSAGE);
}

#[test]
fn optimization_at_ceiling_is_accepted() {
    let input = request(json!({"volume": 1_000, "spread": 1, "optimization": 0.1}))
        .into_input()
        .unwrap();
    let result = RoiCalculator::default().compute(&input).unwrap();
    assert!((result.monthly_saving - 100.0).abs() < 1e-9);
}

#[test]
fn tied_multiple_rounds_up() {
    let input = request(json!({"volume": 2_392, "spread": 0.5, "optimization": 0.0625}))
        .into_input()
        .unwrap();
    let result = RoiCalculator::default().compute(&input).unwrap();
    assert!((result.roi_multiple - 0.25).abs() < 1e-12);
    assert_eq!(result.formatted.roi_multiple, "0.3x");
}

#[test]
fn wrongly_typed_field_is_a_validation_error() {
    let err = decode_json::<RoiRequest>(json!({"volume": "lots", "spread": 1, "optimization": 0.01}))
        .unwrap_err();
    assert!(err.mentions("volume"));
}

#[test]
fn zero_volume_is_rejected() {
    let err = request(json!({"volume": 0, "spread": 1, "optimization": 0.01}))
        .into_input()
        .unwrap_err();
    assert!(err.mentions("volume"));
}
