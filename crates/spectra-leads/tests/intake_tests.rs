//! ---
//! spx_section: "15-testing-qa-runbook"
//! spx_subsection: "module"
//! spx_type: "source"
//! spx_scope: "code"
//! spx_description: "Lead intake validation and sink behaviour."
//! spx_version: "v0.1.0"
//! spx_owner: "tbd"
//! ---
use std::sync::Arc;

use serde_json::{json, Value};
use spectra_common::decode_json;
use spectra_leads::{validate, LeadError, LeadIntake, LeadSubmission, MemoryLeadSink};

fn valid_payload() -> Value {
    json!({
        "firstName": "Alice",
        "lastName": "Martin",
        "email": "alice.martin@example.com",
        "company": "Spectra Capital",
        "jobTitle": "Head of FX",
        "monthlyVolume": 30_000_000,
        "message": "Nous souhaitons optimiser nos opérations FX sur les marchés APAC.",
        "acceptPrivacyPolicy": true
    })
}

fn submission(value: Value) -> LeadSubmission {
    decode_json(value).expect("payload decodes")
}

#[test]
fn valid_submission_becomes_lead() {
    let lead = validate(submission(valid_payload())).expect("valid lead");
    assert_eq!(lead.first_name, "Alice");
    assert_eq!(lead.monthly_volume, 30_000_000.0);
    assert_eq!(lead.lead_id.get_version_num(), 4);
}

#[test]
fn each_lead_gets_a_distinct_identifier() {
    let first = validate(submission(valid_payload())).unwrap();
    let second = validate(submission(valid_payload())).unwrap();
    assert_ne!(first.lead_id, second.lead_id);
}

#[test]
fn surrounding_whitespace_is_not_counted() {
    let mut payload = valid_payload();
    payload["firstName"] = json!("   Al   ");
    let lead = validate(submission(payload)).unwrap();
    assert_eq!(lead.first_name, "Al");

    let mut payload = valid_payload();
    payload["message"] = json!(format!("  {}  ", "short"));
    let err = validate(submission(payload)).unwrap_err();
    assert!(err.mentions("message"));
}

#[test]
fn consent_must_be_true() {
    let mut payload = valid_payload();
    payload["acceptPrivacyPolicy"] = json!(false);
    payload["message"] = json!("Test");
    let err = validate(submission(payload)).unwrap_err();
    assert!(err.mentions("acceptPrivacyPolicy"));
    assert!(err.mentions("message"));
}

#[test]
fn invalid_email_and_volume_are_reported() {
    let mut payload = valid_payload();
    payload["email"] = json!("not-an-email");
    payload["monthlyVolume"] = json!(0);
    let err = validate(submission(payload)).unwrap_err();
    let paths: Vec<_> = err.issues().iter().map(|i| i.path.as_str()).collect();
    assert_eq!(paths, ["email", "monthlyVolume"]);
}

#[test]
fn consent_given_as_string_is_a_type_error() {
    let mut payload = valid_payload();
    payload["acceptPrivacyPolicy"] = json!("true");
    let err = decode_json::<LeadSubmission>(payload).unwrap_err();
    assert!(err.mentions("acceptPrivacyPolicy"));
}

#[test]
fn memory_sink_rejects_duplicate_email() {
    let sink = Arc::new(MemoryLeadSink::new());
    let intake = LeadIntake::new(sink.clone());

    intake.submit(submission(valid_payload())).expect("first lead");
    let mut again = valid_payload();
    again["email"] = json!("ALICE.MARTIN@example.com");
    let err = intake.submit(submission(again)).unwrap_err();

    match err {
        LeadError::Duplicate { email } => assert_eq!(email, "ALICE.MARTIN@example.com"),
        other => panic!("expected duplicate, got {other:?}"),
    }
    assert_eq!(sink.len(), 1);
}

#[test]
fn invalid_submission_never_reaches_sink() {
    let sink = Arc::new(MemoryLeadSink::new());
    let intake = LeadIntake::new(sink.clone());
    let err = intake.submit(submission(json!({}))).unwrap_err();
    assert!(matches!(err, LeadError::Invalid(_)));
    assert!(sink.is_empty());
}
