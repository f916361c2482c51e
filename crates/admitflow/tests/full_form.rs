//! One application filled end to end: every tab goes valid, the whole
//! record validates clean, and submission-style gating passes.

use admitflow::{FormSession, LookupConfig};
use admitflow_test_utils::{init_test_logging, parent_entry, school_entry, ScriptedLookup};
use serde_json::json;

#[tokio::test(start_paused = true)]
async fn test_complete_application_validates_clean() {
    init_test_logging();
    let lookup = ScriptedLookup::new();
    let mut session = FormSession::new(lookup.clone(), &LookupConfig::default());

    // Student tab.
    session.set_value("first_name", json!("Asha")).unwrap();
    session.set_value("last_name", json!("Iyer")).unwrap();
    session.set_value("gender", json!("Female")).unwrap();
    session.set_value("date_of_birth", json!("2016-04-12")).unwrap();
    session.set_value("nationality", json!("Indian")).unwrap();
    session
        .set_value("aadhaar_number", json!("123456789012"))
        .unwrap();
    assert!(session.is_tab_valid("student").unwrap());

    // Family tab: one parent pair, a sibling, a guardian, a language.
    session.set_value("has_sibling_in_ihs", json!("Yes")).unwrap();
    session.set_value("local_guardian", json!("Yes")).unwrap();

    for (relation, name) in [("Father", "Arun Iyer"), ("Mother", "Lakshmi Iyer")] {
        let id = session.append_item("parents").unwrap();
        for (field, value) in parent_entry(relation, name).as_object().unwrap() {
            session
                .set_item_value("parents", &id, field, value.clone())
                .unwrap();
        }
    }

    let sibling = session.append_item("siblings").unwrap();
    session
        .set_item_value("siblings", &sibling, "full_name", json!("Rohan Iyer"))
        .unwrap();
    session
        .set_item_value("siblings", &sibling, "class", json!("Class VII"))
        .unwrap();

    let guardian = session.append_item("guardians").unwrap();
    for (field, value) in [
        ("full_name", json!("Kamala Natarajan")),
        ("relation_to_student", json!("Grandmother")),
        ("phone", json!("+91 98400 11223")),
    ] {
        session
            .set_item_value("guardians", &guardian, field, value)
            .unwrap();
    }

    let language = session.append_item("languages").unwrap();
    session
        .set_item_value("languages", &language, "language", json!("Tamil"))
        .unwrap();
    session
        .set_item_value("languages", &language, "can_speak", json!(true))
        .unwrap();
    assert!(session.is_tab_valid("family").unwrap());

    // Academics tab.
    session.set_value("applying_for_class", json!("Class VI")).unwrap();
    let school = session.append_item("previous_schools").unwrap();
    for (field, value) in school_entry("Hill School", 2019, 2025).as_object().unwrap() {
        session
            .set_item_value("previous_schools", &school, field, value.clone())
            .unwrap();
    }
    assert!(session.is_tab_valid("academics").unwrap());

    // Address tab: permanent resolves by lookup, communication copies it,
    // the guardian address is entered by hand.
    session.set_value("permanent_country", json!("India")).unwrap();
    session
        .set_value("permanent_postal_code", json!("600001"))
        .unwrap();
    session
        .set_value("permanent_address_line1", json!("12 Beach Road"))
        .unwrap();
    assert!(session.pump_address_event().await);
    assert!(session.pump_address_event().await);
    assert_eq!(session.record().get_str("permanent_state"), Some("State-600001"));

    session.set_same_address("communication", true).unwrap();

    session.set_value("guardian_country", json!("India")).unwrap();
    session
        .set_value("guardian_postal_code", json!("641001"))
        .unwrap();
    session
        .set_value("guardian_address_line1", json!("4 Temple Street"))
        .unwrap();
    assert!(session.pump_address_event().await);
    assert!(session.pump_address_event().await);
    assert!(session.is_tab_valid("address").unwrap());

    // Declarations tab.
    session.set_value("transport_required", json!("Yes")).unwrap();
    session.set_value("pickup_point", json!("Main Gate")).unwrap();
    session.set_value("declaration_accepted", json!(true)).unwrap();
    assert!(session.is_tab_valid("declarations").unwrap());

    // The whole record is clean; only two lookups ever left the session.
    assert!(session.validate_all().is_clean());
    assert_eq!(lookup.calls(), ["IN-600001", "IN-641001"]);
}
