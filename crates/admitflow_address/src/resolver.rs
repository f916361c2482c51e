//! Tokio driver for the slot machines.
//!
//! Design principles:
//! - One timer/lookup task per slot at most, tracked with a JoinHandle and
//!   aborted on supersession, copy mode, or drop
//! - Completions re-enter through an mpsc channel and are applied on the
//!   session's event loop, in arrival order
//! - The machine's epoch check closes the race a queued-but-stale event
//!   survives the abort

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use admitflow_schema::countries;

use crate::config::LookupConfig;
use crate::lookup::{LookupError, PincodeLookup, PincodeRecord};
use crate::machine::{MachineAction, SlotMachine, Ticket};

const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Async completions delivered to the session's event loop.
#[derive(Debug)]
pub enum SlotEvent {
    /// The quiet window after the last edit elapsed.
    DebounceElapsed { slot: String, ticket: Ticket },
    /// A dispatched lookup finished.
    LookupCompleted {
        slot: String,
        ticket: Ticket,
        outcome: Result<PincodeRecord, LookupError>,
    },
}

struct SlotRuntime {
    machine: SlotMachine,
    task: Option<JoinHandle<()>>,
}

impl SlotRuntime {
    fn cancel_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Drives debounce and lookup for every address slot of one form session.
pub struct AddressResolver<L> {
    lookup: Arc<L>,
    debounce: Duration,
    slots: HashMap<String, SlotRuntime>,
    events_tx: mpsc::Sender<SlotEvent>,
}

impl<L: PincodeLookup + 'static> AddressResolver<L> {
    /// Create a resolver for the named slots. The receiver is handed to
    /// the session's event loop.
    pub fn new(
        lookup: L,
        config: &LookupConfig,
        slot_names: impl IntoIterator<Item = String>,
    ) -> (Self, mpsc::Receiver<SlotEvent>) {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let slots = slot_names
            .into_iter()
            .map(|name| {
                (
                    name,
                    SlotRuntime {
                        machine: SlotMachine::new(),
                        task: None,
                    },
                )
            })
            .collect();
        (
            Self {
                lookup: Arc::new(lookup),
                debounce: config.debounce(),
                slots,
                events_tx,
            },
            events_rx,
        )
    }

    pub fn machine(&self, slot: &str) -> Option<&SlotMachine> {
        self.slots.get(slot).map(|rt| &rt.machine)
    }

    /// A country or postal-code field of `slot` changed.
    ///
    /// Cancels pending work, then either restarts the debounce window or
    /// resets the slot. The returned action tells the caller whether to
    /// clear the derived fields.
    pub fn input_changed(
        &mut self,
        slot: &str,
        country_name: Option<&str>,
        postal: &str,
    ) -> MachineAction {
        let tx = self.events_tx.clone();
        let debounce = self.debounce;
        let Some(runtime) = self.slots.get_mut(slot) else {
            warn!(slot, "input change for unknown address slot");
            return MachineAction::None;
        };
        runtime.cancel_task();

        let alpha2 = resolve_alpha2(country_name);
        let action = runtime.machine.input_changed(alpha2, postal);
        if let MachineAction::StartDebounce { ticket } = &action {
            debug!(slot, key = %ticket.key, "debounce restarted");
            runtime.task = Some(spawn_debounce(tx, debounce, slot.to_string(), ticket.clone()));
        }
        action
    }

    /// The debounce timer for `ticket` fired; re-confirm and dispatch.
    pub fn debounce_elapsed(
        &mut self,
        slot: &str,
        ticket: &Ticket,
        country_name: Option<&str>,
        postal: &str,
    ) -> MachineAction {
        let tx = self.events_tx.clone();
        let lookup = Arc::clone(&self.lookup);
        let Some(runtime) = self.slots.get_mut(slot) else {
            return MachineAction::Discard;
        };

        let alpha2 = resolve_alpha2(country_name);
        let action = runtime.machine.debounce_elapsed(ticket, alpha2, postal);
        match &action {
            MachineAction::Dispatch { ticket } => {
                debug!(slot, key = %ticket.key, "dispatching lookup");
                runtime.task = Some(spawn_lookup(
                    lookup,
                    tx,
                    slot.to_string(),
                    ticket.clone(),
                    alpha2.unwrap_or_default().to_string(),
                    postal.trim().to_string(),
                ));
            }
            MachineAction::Discard => {
                debug!(slot, key = %ticket.key, "superseded debounce discarded");
            }
            _ => {}
        }
        action
    }

    /// A lookup completed. Maps the outcome through the machine; stale
    /// completions come back as `Discard`.
    pub fn lookup_completed(
        &mut self,
        slot: &str,
        ticket: &Ticket,
        outcome: &Result<PincodeRecord, LookupError>,
    ) -> MachineAction {
        let Some(runtime) = self.slots.get_mut(slot) else {
            return MachineAction::Discard;
        };
        let action = match outcome {
            Ok(record) => runtime.machine.lookup_succeeded(ticket, record),
            Err(error) => {
                warn!(slot, key = %ticket.key, %error, "pincode lookup failed");
                runtime.machine.lookup_failed(ticket, error.to_string())
            }
        };
        if action == MachineAction::Discard {
            debug!(slot, key = %ticket.key, "stale lookup completion discarded");
        }
        action
    }

    /// Toggle "same as another address" mode for `slot`.
    ///
    /// Entering cancels any pending timer or in-flight lookup and forces
    /// the machine to `Idle`.
    pub fn set_copy_mode(&mut self, slot: &str, enabled: bool) {
        let Some(runtime) = self.slots.get_mut(slot) else {
            return;
        };
        if enabled {
            runtime.cancel_task();
            runtime.machine.enter_copy_mode();
        } else {
            runtime.machine.leave_copy_mode();
        }
    }
}

fn spawn_debounce(
    tx: mpsc::Sender<SlotEvent>,
    debounce: Duration,
    slot: String,
    ticket: Ticket,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(debounce).await;
        let _ = tx.send(SlotEvent::DebounceElapsed { slot, ticket }).await;
    })
}

fn spawn_lookup<L: PincodeLookup + 'static>(
    lookup: Arc<L>,
    tx: mpsc::Sender<SlotEvent>,
    slot: String,
    ticket: Ticket,
    alpha2: String,
    postal: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let outcome = lookup.lookup(&alpha2, &postal).await;
        let _ = tx
            .send(SlotEvent::LookupCompleted {
                slot,
                ticket,
                outcome,
            })
            .await;
    })
}

impl<L> Drop for AddressResolver<L> {
    fn drop(&mut self) {
        for runtime in self.slots.values_mut() {
            runtime.cancel_task();
        }
    }
}

fn resolve_alpha2(country_name: Option<&str>) -> Option<&'static str> {
    country_name
        .and_then(countries::find_by_name)
        .map(|c| c.alpha2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::SlotPhase;
    use std::sync::Mutex;

    /// Records calls; replies with a fixed state per postal code.
    struct FixedLookup {
        calls: Mutex<Vec<String>>,
    }

    impl FixedLookup {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl PincodeLookup for FixedLookup {
        fn lookup<'a>(
            &'a self,
            alpha2: &'a str,
            postal: &'a str,
        ) -> crate::lookup::LookupFuture<'a> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{alpha2}-{postal}"));
            Box::pin(async move {
                Ok(PincodeRecord {
                    state: format!("State-{postal}"),
                    accepted_cities: vec![format!("City-{postal}")],
                    default_city: None,
                })
            })
        }
    }

    fn resolver(
        debounce_ms: u64,
    ) -> (AddressResolver<FixedLookup>, mpsc::Receiver<SlotEvent>) {
        let config = LookupConfig {
            debounce_ms,
            ..LookupConfig::default()
        };
        AddressResolver::new(
            FixedLookup::new(),
            &config,
            ["permanent".to_string()].into_iter(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_rapid_edits_collapse_to_one_lookup() {
        let (mut resolver, mut events) = resolver(800);

        resolver.input_changed("permanent", Some("India"), "600");
        tokio::time::advance(Duration::from_millis(100)).await;
        resolver.input_changed("permanent", Some("India"), "6000");
        tokio::time::advance(Duration::from_millis(100)).await;
        resolver.input_changed("permanent", Some("India"), "600001");

        tokio::time::advance(Duration::from_millis(900)).await;

        // Exactly one timer survives, keyed to the final value.
        let event = events.recv().await.unwrap();
        let SlotEvent::DebounceElapsed { slot, ticket } = event else {
            panic!("expected DebounceElapsed");
        };
        assert_eq!(ticket.key.as_str(), "IN-600001");

        let action = resolver.debounce_elapsed(&slot, &ticket, Some("India"), "600001");
        assert!(matches!(action, MachineAction::Dispatch { .. }));

        let event = events.recv().await.unwrap();
        let SlotEvent::LookupCompleted { outcome, .. } = event else {
            panic!("expected LookupCompleted");
        };
        assert_eq!(outcome.unwrap().state, "State-600001");

        // No second event is pending.
        tokio::time::advance(Duration::from_millis(2000)).await;
        assert!(events.try_recv().is_err());

        assert_eq!(
            resolver.lookup.calls.lock().unwrap().as_slice(),
            ["IN-600001"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_completion_is_discarded() {
        let (mut resolver, mut events) = resolver(800);

        resolver.input_changed("permanent", Some("India"), "600001");
        tokio::time::advance(Duration::from_millis(900)).await;
        let SlotEvent::DebounceElapsed { ticket: first, .. } = events.recv().await.unwrap()
        else {
            panic!("expected DebounceElapsed");
        };
        resolver.debounce_elapsed("permanent", &first, Some("India"), "600001");

        // Supersede before the first completion is applied.
        resolver.input_changed("permanent", Some("India"), "600002");

        // Even if the first completion was already queued, it is stale now.
        let stale = resolver.lookup_completed(
            "permanent",
            &first,
            &Ok(PincodeRecord {
                state: "Stale".to_string(),
                accepted_cities: vec![],
                default_city: None,
            }),
        );
        assert_eq!(stale, MachineAction::Discard);

        // The second query resolves normally.
        tokio::time::advance(Duration::from_millis(900)).await;
        let SlotEvent::DebounceElapsed { ticket: second, .. } = events.recv().await.unwrap()
        else {
            panic!("expected DebounceElapsed");
        };
        resolver.debounce_elapsed("permanent", &second, Some("India"), "600002");
        let SlotEvent::LookupCompleted { ticket, outcome, .. } = events.recv().await.unwrap()
        else {
            panic!("expected LookupCompleted");
        };
        let action = resolver.lookup_completed("permanent", &ticket, &outcome);
        assert_eq!(
            action,
            MachineAction::Apply {
                state: "State-600002".to_string(),
                city: "City-600002".to_string()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_copy_mode_cancels_pending_work() {
        let (mut resolver, mut events) = resolver(800);

        resolver.input_changed("permanent", Some("India"), "600001");
        resolver.set_copy_mode("permanent", true);
        assert_eq!(
            resolver.machine("permanent").unwrap().phase(),
            SlotPhase::Idle
        );

        tokio::time::advance(Duration::from_millis(2000)).await;
        assert!(events.try_recv().is_err());

        // Edits while in copy mode do nothing.
        let action = resolver.input_changed("permanent", Some("India"), "600002");
        assert_eq!(action, MachineAction::None);
    }
}
