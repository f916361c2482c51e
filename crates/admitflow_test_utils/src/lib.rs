//! Admitflow Test Utilities
//!
//! Shared fixtures for the workspace's integration tests:
//!
//! - [`ScriptedLookup`]: a `PincodeLookup` with queued outcomes, call
//!   counting, and an optional gate so a test can hold a response in
//!   flight while it edits the record
//! - item builders for the repeatable groups
//! - [`init_test_logging`]: tracing subscriber for test output
//!
//! # Usage
//!
//! ```rust,ignore
//! let lookup = ScriptedLookup::new();
//! lookup.push_ok("Tamil Nadu", &["Chennai"], Some("Chennai"));
//! let mut session = FormSession::new(lookup.clone(), &LookupConfig::default());
//! // ... later: assert_eq!(lookup.calls(), ["IN-600001"]);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;

use admitflow_address::{LookupError, LookupFuture, PincodeLookup, PincodeRecord};

/// A scripted pincode lookup. Clones share state, so a test keeps one
/// handle for assertions after the session takes the other.
///
/// Outcomes are served FIFO; with an empty queue the lookup answers
/// `State-{postal}` / `City-{postal}` so tests can assert provenance.
#[derive(Clone)]
pub struct ScriptedLookup {
    inner: Arc<Inner>,
}

struct Inner {
    responses: Mutex<VecDeque<Result<PincodeRecord, LookupError>>>,
    calls: Mutex<Vec<String>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedLookup {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                responses: Mutex::new(VecDeque::new()),
                calls: Mutex::new(Vec::new()),
                gate: None,
            }),
        }
    }

    /// A lookup whose responses each wait for one `notify_one`, letting a
    /// test interleave edits with an in-flight request.
    pub fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        (
            Self {
                inner: Arc::new(Inner {
                    responses: Mutex::new(VecDeque::new()),
                    calls: Mutex::new(Vec::new()),
                    gate: Some(Arc::clone(&gate)),
                }),
            },
            gate,
        )
    }

    pub fn push_ok(&self, state: &str, cities: &[&str], default_city: Option<&str>) {
        self.inner
            .responses
            .lock()
            .unwrap()
            .push_back(Ok(pincode_record(state, cities, default_city)));
    }

    pub fn push_err(&self, error: LookupError) {
        self.inner.responses.lock().unwrap().push_back(Err(error));
    }

    /// Keys dispatched so far, in order (`{alpha2}-{postal}`).
    pub fn calls(&self) -> Vec<String> {
        self.inner.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.inner.calls.lock().unwrap().len()
    }
}

impl Default for ScriptedLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl PincodeLookup for ScriptedLookup {
    fn lookup<'a>(&'a self, alpha2: &'a str, postal: &'a str) -> LookupFuture<'a> {
        self.inner
            .calls
            .lock()
            .unwrap()
            .push(format!("{alpha2}-{postal}"));
        let response = self.inner.responses.lock().unwrap().pop_front();
        let gate = self.inner.gate.clone();
        Box::pin(async move {
            if let Some(gate) = gate {
                gate.notified().await;
            }
            response.unwrap_or_else(|| {
                Ok(PincodeRecord {
                    state: format!("State-{postal}"),
                    accepted_cities: vec![format!("City-{postal}")],
                    default_city: None,
                })
            })
        })
    }
}

/// Build a lookup payload.
pub fn pincode_record(state: &str, cities: &[&str], default_city: Option<&str>) -> PincodeRecord {
    PincodeRecord {
        state: state.to_string(),
        accepted_cities: cities.iter().map(|c| c.to_string()).collect(),
        default_city: default_city.map(|c| c.to_string()),
    }
}

/// A complete parent entry for the `parents` group.
pub fn parent_entry(relation: &str, name: &str) -> serde_json::Value {
    serde_json::json!({
        "relation": relation,
        "full_name": name,
        "email": format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        "phone": "+91 98765 43210",
    })
}

/// A complete previous-school entry.
pub fn school_entry(name: &str, from_year: i64, to_year: i64) -> serde_json::Value {
    serde_json::json!({
        "school_name": name,
        "city": "Chennai",
        "from_year": from_year.to_string(),
        "to_year": to_year.to_string(),
        "from_class": "Class I",
        "to_class": "Class V",
    })
}

/// Install a test tracing subscriber once; later calls are no-ops.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("admitflow=debug,admitflow_address=debug,admitflow_engine=debug")
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
