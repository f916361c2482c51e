//! Address Resolution
//!
//! Derives state and city from a (country, postal code) pair through an
//! external pincode lookup. The subsystem is split in two layers:
//!
//! - [`machine`]: a sans-IO state machine per address slot
//!   (`Idle -> PendingDebounce -> InFlight -> Resolved | Failed`), driven
//!   by an epoch token. Every input edit bumps the epoch; any async
//!   completion carrying a stale epoch is discarded. Cancellation and
//!   supersession are testable without timers or a UI harness.
//! - [`resolver`]: the tokio driver owning the debounce timer tasks, the
//!   lookup client, and the completion channel. At most one in-flight
//!   lookup per slot; a new edit always wins over a stale response.
//!
//! "Same as another address" mode bypasses the machine entirely: the slot
//! is forced to `Idle`, pending work is aborted, and fields are copied
//! verbatim by the session.

pub mod config;
pub mod lookup;
pub mod machine;
pub mod resolver;

pub use config::LookupConfig;
pub use lookup::{HttpPincodeLookup, LookupError, LookupFuture, PincodeLookup, PincodeRecord};
pub use machine::{MachineAction, QueryKey, SlotMachine, SlotPhase, Ticket, MIN_POSTAL_LEN};
pub use resolver::{AddressResolver, SlotEvent};
