//! Address resolution through the session: debounce collapsing, the
//! stale-response race, copy mode, and failure advisories.

use admitflow::{ErrorKind, FormSession, LookupConfig, LookupError, SlotEvent};
use admitflow_address::{QueryKey, SlotPhase, Ticket};
use admitflow_test_utils::{init_test_logging, pincode_record, ScriptedLookup};
use serde_json::json;
use std::time::Duration;

fn session_with(lookup: ScriptedLookup) -> FormSession<ScriptedLookup> {
    init_test_logging();
    FormSession::new(lookup, &LookupConfig::default())
}

#[tokio::test(start_paused = true)]
async fn test_debounce_collapses_rapid_edits_to_one_lookup() {
    let lookup = ScriptedLookup::new();
    let mut session = session_with(lookup.clone());

    session.set_value("permanent_country", json!("India")).unwrap();
    session.set_value("permanent_postal_code", json!("600")).unwrap();
    tokio::time::advance(Duration::from_millis(100)).await;
    session.set_value("permanent_postal_code", json!("6000")).unwrap();
    tokio::time::advance(Duration::from_millis(100)).await;
    session
        .set_value("permanent_postal_code", json!("600001"))
        .unwrap();

    // Debounce elapses, dispatch, completion.
    assert!(session.pump_address_event().await);
    assert!(session.pump_address_event().await);

    assert_eq!(lookup.calls(), ["IN-600001"]);
    assert_eq!(session.record().get_str("permanent_state"), Some("State-600001"));
    assert_eq!(session.record().get_str("permanent_city"), Some("City-600001"));
    assert_eq!(session.slot_phase("permanent"), Some(SlotPhase::Resolved));
}

#[tokio::test(start_paused = true)]
async fn test_short_postal_never_dispatches() {
    let lookup = ScriptedLookup::new();
    let mut session = session_with(lookup.clone());

    session.set_value("permanent_country", json!("India")).unwrap();
    session.set_value("permanent_postal_code", json!("60")).unwrap();
    tokio::time::advance(Duration::from_millis(2000)).await;

    assert_eq!(session.pump_pending_address_events(), 0);
    assert_eq!(lookup.call_count(), 0);
    assert_eq!(session.slot_phase("permanent"), Some(SlotPhase::Idle));
}

#[tokio::test(start_paused = true)]
async fn test_unknown_country_never_dispatches() {
    let lookup = ScriptedLookup::new();
    let mut session = session_with(lookup.clone());

    session.set_value("permanent_country", json!("Atlantis")).unwrap();
    session
        .set_value("permanent_postal_code", json!("600001"))
        .unwrap();
    tokio::time::advance(Duration::from_millis(2000)).await;

    assert_eq!(session.pump_pending_address_events(), 0);
    assert_eq!(lookup.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stale_response_never_wins_over_newer_edit() {
    let (lookup, gate) = ScriptedLookup::gated();
    let mut session = session_with(lookup.clone());

    session.set_value("permanent_country", json!("India")).unwrap();
    session
        .set_value("permanent_postal_code", json!("600001"))
        .unwrap();

    // First query reaches in-flight and parks on the gate.
    assert!(session.pump_address_event().await);
    assert_eq!(session.slot_phase("permanent"), Some(SlotPhase::InFlight));
    assert_eq!(lookup.calls(), ["IN-600001"]);

    // A newer edit supersedes it before any response lands.
    session
        .set_value("permanent_postal_code", json!("600002"))
        .unwrap();

    // Even a first-query response that was already queued is discarded:
    // country edits bumped the epoch to 1, the first postal edit to 2.
    session.handle_address_event(SlotEvent::LookupCompleted {
        slot: "permanent".to_string(),
        ticket: Ticket {
            epoch: 2,
            key: QueryKey::new("IN", "600001"),
        },
        outcome: Ok(pincode_record("Wrong State", &["Wrong City"], None)),
    });
    assert!(session.record().get("permanent_state").is_none());
    assert!(session.record().get("permanent_city").is_none());

    // Only the second query's data is applied.
    assert!(session.pump_address_event().await);
    gate.notify_one();
    assert!(session.pump_address_event().await);
    assert_eq!(session.record().get_str("permanent_state"), Some("State-600002"));
    assert_eq!(lookup.calls(), ["IN-600001", "IN-600002"]);
}

#[tokio::test(start_paused = true)]
async fn test_server_default_city_preferred() {
    let lookup = ScriptedLookup::new();
    lookup.push_ok("Tamil Nadu", &["Tambaram", "Chennai"], Some("Chennai"));
    let mut session = session_with(lookup.clone());

    session.set_value("permanent_country", json!("India")).unwrap();
    session
        .set_value("permanent_postal_code", json!("600001"))
        .unwrap();
    assert!(session.pump_address_event().await);
    assert!(session.pump_address_event().await);

    assert_eq!(session.record().get_str("permanent_city"), Some("Chennai"));
}

#[tokio::test(start_paused = true)]
async fn test_lookup_failure_is_advisory_only() {
    let lookup = ScriptedLookup::new();
    lookup.push_err(LookupError::Status(503));
    let mut session = session_with(lookup.clone());

    session.set_value("permanent_country", json!("India")).unwrap();
    session
        .set_value("permanent_postal_code", json!("600001"))
        .unwrap();
    assert!(session.pump_address_event().await);
    assert!(session.pump_address_event().await);

    assert_eq!(session.slot_phase("permanent"), Some(SlotPhase::Failed));
    assert!(session.record().get("permanent_state").is_none());

    let advisory = session.errors().advisory("permanent_postal_code").unwrap();
    assert_eq!(advisory.kind, ErrorKind::ExternalLookupFailed);
    assert!(advisory.message.contains("503"));

    // The advisory shows on the field view but does not block.
    let view = session.field_view("permanent_postal_code").unwrap();
    assert_eq!(view.error.map(|e| e.kind), Some(ErrorKind::ExternalLookupFailed));

    // A retry that succeeds clears the advisory.
    session
        .set_value("permanent_postal_code", json!("600002"))
        .unwrap();
    assert!(session.pump_address_event().await);
    assert!(session.pump_address_event().await);
    assert!(session.errors().advisory("permanent_postal_code").is_none());
    assert_eq!(session.record().get_str("permanent_state"), Some("State-600002"));
}

#[tokio::test(start_paused = true)]
async fn test_copy_mode_round_trip_is_stable() {
    let lookup = ScriptedLookup::new();
    let mut session = session_with(lookup.clone());

    session.set_value("permanent_country", json!("India")).unwrap();
    session
        .set_value("permanent_postal_code", json!("600001"))
        .unwrap();
    session
        .set_value("permanent_address_line1", json!("12 Beach Road"))
        .unwrap();
    assert!(session.pump_address_event().await);
    assert!(session.pump_address_event().await);

    session.set_same_address("communication", true).unwrap();
    let copied: Vec<Option<String>> = [
        "communication_country",
        "communication_postal_code",
        "communication_state",
        "communication_city",
        "communication_address_line1",
    ]
    .iter()
    .map(|f| session.record().get_str(f).map(str::to_string))
    .collect();
    assert_eq!(copied[0].as_deref(), Some("India"));
    assert_eq!(copied[2].as_deref(), Some("State-600001"));
    assert_eq!(copied[4].as_deref(), Some("12 Beach Road"));
    // Copied fields validate clean without any lookup for this slot.
    assert_eq!(lookup.call_count(), 1);
    assert!(session.is_tab_valid("address").is_ok());

    // Disable: derived fields clear, manual values stay.
    session.set_same_address("communication", false).unwrap();
    assert!(session.record().get("communication_state").is_none());
    assert!(session.record().get("communication_city").is_none());
    assert_eq!(
        session.record().get_str("communication_postal_code"),
        Some("600001")
    );

    // Disabling re-enters the lookup machine with the retained inputs.
    assert_eq!(
        session.slot_phase("communication"),
        Some(SlotPhase::PendingDebounce)
    );

    // Re-enable without intervening edits: identical copy.
    session.set_same_address("communication", true).unwrap();
    let recopied: Vec<Option<String>> = [
        "communication_country",
        "communication_postal_code",
        "communication_state",
        "communication_city",
        "communication_address_line1",
    ]
    .iter()
    .map(|f| session.record().get_str(f).map(str::to_string))
    .collect();
    assert_eq!(copied, recopied);
}

#[tokio::test(start_paused = true)]
async fn test_enabling_copy_mode_cancels_pending_lookup() {
    let lookup = ScriptedLookup::new();
    let mut session = session_with(lookup.clone());

    // Fill the source slot manually; no lookup needed for it.
    session.set_value("permanent_country", json!("India")).unwrap();
    session.set_value("permanent_state", json!("Tamil Nadu")).unwrap();
    session.set_value("permanent_city", json!("Chennai")).unwrap();

    // Start a lookup on the communication slot, then switch to copy mode
    // inside the debounce window.
    session
        .set_value("communication_country", json!("India"))
        .unwrap();
    session
        .set_value("communication_postal_code", json!("560001"))
        .unwrap();
    assert_eq!(
        session.slot_phase("communication"),
        Some(SlotPhase::PendingDebounce)
    );

    session
        .set_value("communication_same_as_permanent", json!(true))
        .unwrap();
    assert_eq!(session.slot_phase("communication"), Some(SlotPhase::Idle));

    tokio::time::advance(Duration::from_millis(2000)).await;
    assert_eq!(session.pump_pending_address_events(), 0);
    // The permanent-country edit never raised a query either: no postal.
    assert_eq!(lookup.call_count(), 0);

    // The copy filled the slot from the source.
    assert_eq!(
        session.record().get_str("communication_state"),
        Some("Tamil Nadu")
    );
}
