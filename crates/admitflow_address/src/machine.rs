//! Per-slot resolution state machine, sans IO.
//!
//! The epoch counter is the single-writer token: every input edit bumps
//! it, and any debounce or lookup completion carrying a stale epoch is
//! discarded. Last edit wins, never last response.

use std::fmt;

use crate::lookup::PincodeRecord;

/// Minimum postal-code length before a lookup is considered.
pub const MIN_POSTAL_LEN: usize = 3;

/// Resolution phase of one address slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotPhase {
    Idle,
    PendingDebounce,
    InFlight,
    Resolved,
    Failed,
}

/// Composite identity of one lookup query: `{alpha2}-{postal}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(String);

impl QueryKey {
    pub fn new(alpha2: &str, postal: &str) -> Self {
        Self(format!("{}-{}", alpha2, postal.trim()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Freshness proof carried by every async step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub epoch: u64,
    pub key: QueryKey,
}

/// What the caller must do after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum MachineAction {
    /// Nothing to do (copy mode, or no-op edit).
    None,
    /// Start the debounce timer for this ticket.
    StartDebounce { ticket: Ticket },
    /// Inputs insufficient: cancel pending work and clear derived fields.
    Reset,
    /// Debounce confirmed; issue exactly one lookup for this ticket.
    Dispatch { ticket: Ticket },
    /// Write resolved state/city into the record and revalidate them.
    Apply { state: String, city: String },
    /// Clear derived fields and surface an advisory error.
    Fail { message: String },
    /// Stale completion; no write, no error.
    Discard,
}

/// State machine for one address slot.
#[derive(Debug)]
pub struct SlotMachine {
    phase: SlotPhase,
    epoch: u64,
    active_key: Option<QueryKey>,
    copy_mode: bool,
}

impl Default for SlotMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotMachine {
    pub fn new() -> Self {
        Self {
            phase: SlotPhase::Idle,
            epoch: 0,
            active_key: None,
            copy_mode: false,
        }
    }

    pub fn phase(&self) -> SlotPhase {
        self.phase
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn active_key(&self) -> Option<&QueryKey> {
        self.active_key.as_ref()
    }

    pub fn in_copy_mode(&self) -> bool {
        self.copy_mode
    }

    /// Country or postal code changed.
    ///
    /// Supersedes any pending debounce or in-flight lookup. Sufficient
    /// inputs restart the debounce window; insufficient inputs reset to
    /// `Idle`.
    pub fn input_changed(&mut self, alpha2: Option<&str>, postal: &str) -> MachineAction {
        if self.copy_mode {
            return MachineAction::None;
        }
        self.epoch += 1;
        let postal = postal.trim();
        match alpha2 {
            Some(alpha2) if postal.len() >= MIN_POSTAL_LEN => {
                let key = QueryKey::new(alpha2, postal);
                self.phase = SlotPhase::PendingDebounce;
                self.active_key = Some(key.clone());
                MachineAction::StartDebounce {
                    ticket: Ticket {
                        epoch: self.epoch,
                        key,
                    },
                }
            }
            _ => {
                self.phase = SlotPhase::Idle;
                self.active_key = None;
                MachineAction::Reset
            }
        }
    }

    /// The debounce window elapsed for `ticket`.
    ///
    /// Re-confirms that the inputs still name the same query before moving
    /// to `InFlight`.
    pub fn debounce_elapsed(
        &mut self,
        ticket: &Ticket,
        alpha2: Option<&str>,
        postal: &str,
    ) -> MachineAction {
        if self.copy_mode
            || ticket.epoch != self.epoch
            || self.phase != SlotPhase::PendingDebounce
        {
            return MachineAction::Discard;
        }
        let postal = postal.trim();
        let confirmed = match alpha2 {
            Some(alpha2) if postal.len() >= MIN_POSTAL_LEN => {
                Some(QueryKey::new(alpha2, postal))
            }
            _ => None,
        };
        match confirmed {
            Some(key) if Some(&key) == self.active_key.as_ref() => {
                self.phase = SlotPhase::InFlight;
                MachineAction::Dispatch {
                    ticket: ticket.clone(),
                }
            }
            _ => {
                self.phase = SlotPhase::Idle;
                self.active_key = None;
                MachineAction::Reset
            }
        }
    }

    /// A lookup for `ticket` resolved.
    pub fn lookup_succeeded(&mut self, ticket: &Ticket, record: &PincodeRecord) -> MachineAction {
        if !self.is_current(ticket) {
            return MachineAction::Discard;
        }
        self.phase = SlotPhase::Resolved;
        MachineAction::Apply {
            state: record.state.clone(),
            city: default_city(record),
        }
    }

    /// A lookup for `ticket` failed.
    pub fn lookup_failed(&mut self, ticket: &Ticket, message: impl Into<String>) -> MachineAction {
        if !self.is_current(ticket) {
            return MachineAction::Discard;
        }
        self.phase = SlotPhase::Failed;
        self.active_key = None;
        MachineAction::Fail {
            message: message.into(),
        }
    }

    /// Enter "same as another address" mode: force `Idle`, invalidate the
    /// active key so late completions drop.
    pub fn enter_copy_mode(&mut self) {
        self.copy_mode = true;
        self.epoch += 1;
        self.phase = SlotPhase::Idle;
        self.active_key = None;
    }

    /// Leave copy mode. The caller re-feeds the current inputs if they are
    /// sufficient.
    pub fn leave_copy_mode(&mut self) {
        self.copy_mode = false;
        self.phase = SlotPhase::Idle;
    }

    fn is_current(&self, ticket: &Ticket) -> bool {
        !self.copy_mode
            && ticket.epoch == self.epoch
            && self.active_key.as_ref() == Some(&ticket.key)
    }
}

/// Default city preference: server default among the accepted options,
/// else the first accepted option, else empty.
pub fn default_city(record: &PincodeRecord) -> String {
    if let Some(default) = &record.default_city {
        if record.accepted_cities.is_empty() || record.accepted_cities.contains(default) {
            return default.clone();
        }
    }
    record.accepted_cities.first().cloned().unwrap_or_default()
}
