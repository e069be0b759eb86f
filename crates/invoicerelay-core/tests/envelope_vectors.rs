//! Envelope vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use invoicerelay_core::protocol::events::{InsightEvent, InvoiceEvent};
use invoicerelay_core::Envelope;

use vector_loader::load;

#[test]
fn envelope_vectors() {
    let files = [
        "envelope_min.json",
        "envelope_status_changed.json",
        "envelope_with_data.json",
        "envelope_null_members.json",
        "envelope_missing_type.json",
        "envelope_type_not_string.json",
        "envelope_timestamp_not_string.json",
        "envelope_not_json.json",
        "envelope_not_object.json",
    ];

    for f in files {
        let v = load(f);
        let res = Envelope::parse(&v.frame);

        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.code().as_str(), err.code, "vector={}", v.description);
            continue;
        }

        let env = res.expect("expected ok envelope");
        let ex = v.expect.expect("missing expect block");

        assert_eq!(env.kind, ex["type"].as_str().unwrap(), "vector={}", v.description);
        assert_eq!(env.data.is_some(), ex["has_data"].as_bool().unwrap(), "vector={}", v.description);
        assert_eq!(env.timestamp.as_deref(), ex["timestamp"].as_str(), "vector={}", v.description);

        let mut keys: Vec<&str> = env.fields.keys().map(String::as_str).collect();
        keys.sort_unstable();
        let want: Vec<&str> = ex["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|k| k.as_str().unwrap())
            .collect();
        assert_eq!(keys, want, "vector={}", v.description);
    }
}

#[test]
fn status_change_decodes_to_invoice_event() {
    let env = Envelope::parse(&load("envelope_status_changed.json").frame).unwrap();
    let ev: InvoiceEvent = env.decode().unwrap();
    assert_eq!(ev.invoice_id.as_deref(), Some("INV-2024-001"));
    assert_eq!(ev.old_status.as_deref(), Some("pending"));
    assert_eq!(ev.new_status.as_deref(), Some("approved"));
    assert_eq!(ev.changed_by.as_deref(), Some("m.dupont"));
    assert_eq!(ev.timestamp.as_deref(), Some("2024-03-01T10:15:00Z"));
}

#[test]
fn prediction_keeps_nested_data() {
    let env = Envelope::parse(&load("envelope_with_data.json").frame).unwrap();
    let ev: InsightEvent = env.decode().unwrap();
    assert_eq!(ev.prediction_type.as_deref(), Some("cash_flow"));
    assert_eq!(ev.data.unwrap()["horizon_days"], 30);
    assert!(ev.anomalies.is_empty());
}
