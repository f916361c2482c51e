//! The form session: one record, one owner.
//!
//! Design principles:
//! - The record is mutated only here; the engine stays pure
//! - Every mutation settles conditional clearing before revalidation, one
//!   pass per dependency level
//! - Multi-field transactions (copy-address) validate once after all
//!   writes, never per-write
//! - Async lookup completions re-enter through the event channel and are
//!   applied in arrival order; stale ones drop on the machine's epoch check

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use admitflow_address::{
    AddressResolver, LookupConfig, MachineAction, PincodeLookup, SlotEvent,
};
use admitflow_engine::{
    is_tab_valid, seed_item, validate_record, validate_subset, ErrorMap, FieldError, Record,
};
use admitflow_schema::{admission_schema, AddressSlotSpec, FormSchema, SchemaError};

use crate::view::FieldView;

/// Bound on conditional-clearing passes; one per dependency level.
const MAX_CLEARING_PASSES: usize = 8;

/// One in-progress application and everything that validates it.
pub struct FormSession<L: PincodeLookup + 'static> {
    schema: Arc<FormSchema>,
    record: Record,
    errors: ErrorMap,
    touched: BTreeSet<String>,
    resolver: AddressResolver<L>,
    events_rx: mpsc::Receiver<SlotEvent>,
}

impl<L: PincodeLookup + 'static> FormSession<L> {
    /// Session over the canonical admission schema.
    pub fn new(lookup: L, config: &LookupConfig) -> Self {
        Self::with_schema(admission_schema(), lookup, config)
    }

    pub fn with_schema(schema: FormSchema, lookup: L, config: &LookupConfig) -> Self {
        let slot_names: Vec<String> = schema
            .address_slots
            .iter()
            .map(|slot| slot.name.clone())
            .collect();
        let (resolver, events_rx) = AddressResolver::new(lookup, config, slot_names);
        Self {
            schema: Arc::new(schema),
            record: Record::new(),
            errors: ErrorMap::new(),
            touched: BTreeSet::new(),
            resolver,
            events_rx,
        }
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    /// Set one scalar field from a raw value-change event.
    ///
    /// Applies conditional clearing, notifies the owning address slot, and
    /// revalidates the touched field set.
    pub fn set_value(&mut self, field: &str, value: Value) -> Result<(), SchemaError> {
        let schema = Arc::clone(&self.schema);
        schema.require_field(field)?;

        // Copy-mode toggles route through the copy contract.
        if let Some(slot) = schema
            .address_slots
            .iter()
            .find(|slot| slot.same_as_field.as_deref() == Some(field))
        {
            let enabled = value.as_bool().unwrap_or(false);
            let slot_name = slot.name.clone();
            return self.set_same_address(&slot_name, enabled);
        }

        self.record.set(field, value);
        self.touched.insert(field.to_string());
        self.apply_conditional_clearing();
        self.note_address_input(field);
        self.revalidate_touched();
        Ok(())
    }

    /// Set one field of a collection item, addressed by stable identity.
    pub fn set_item_value(
        &mut self,
        collection: &str,
        item_id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), SchemaError> {
        let schema = Arc::clone(&self.schema);
        let group = schema.require_group(collection)?;
        if group.item_field(field).is_none() {
            return Err(SchemaError::UnknownField(format!("{collection}.{field}")));
        }
        self.record.set_item_field(collection, item_id, field, value);
        self.touched.insert(collection.to_string());
        self.revalidate_touched();
        Ok(())
    }

    /// Append a fresh item seeded with the group's declared defaults.
    pub fn append_item(&mut self, collection: &str) -> Result<String, SchemaError> {
        let schema = Arc::clone(&self.schema);
        let group = schema.require_group(collection)?;
        let item_id = self.record.push_item(collection, seed_item(group));
        self.touched.insert(collection.to_string());
        self.revalidate_touched();
        Ok(item_id)
    }

    /// Remove an item by identity. Unrelated items keep their error
    /// association under reorder.
    pub fn remove_item(&mut self, collection: &str, item_id: &str) -> Result<bool, SchemaError> {
        let schema = Arc::clone(&self.schema);
        schema.require_group(collection)?;
        let removed = self.record.remove_item(collection, item_id);
        self.touched.insert(collection.to_string());
        self.revalidate_touched();
        Ok(removed)
    }

    /// Validate named fields or collections on demand (blur/commit).
    pub fn validate(&mut self, names: &[&str]) -> &ErrorMap {
        for name in names {
            self.touched.insert((*name).to_string());
        }
        self.revalidate_touched();
        &self.errors
    }

    /// Validate the whole record, advisories preserved.
    pub fn validate_all(&mut self) -> &ErrorMap {
        let schema = Arc::clone(&self.schema);
        for spec in &schema.fields {
            self.touched.insert(spec.name.clone());
        }
        for group in &schema.groups {
            self.touched.insert(group.field.clone());
        }
        let fresh = validate_record(&schema, &self.record);
        self.errors.replace_blocking(fresh);
        &self.errors
    }

    /// The per-field contract for widgets.
    pub fn field_view(&self, field: &str) -> Result<FieldView, SchemaError> {
        let spec = self.schema.require_field(field)?;
        let rule = spec.effective_rule(&self.record);
        Ok(FieldView {
            current_value: self.record.get(field).cloned().unwrap_or(Value::Null),
            effective_required: rule.required.is_some(),
            error: self
                .errors
                .field(field)
                .cloned()
                .or_else(|| self.errors.advisory(field).cloned()),
        })
    }

    /// Tab gating: every field and collection of the tab validates clean.
    pub fn is_tab_valid(&self, tab: &str) -> Result<bool, SchemaError> {
        is_tab_valid(&self.schema, &self.record, tab)
    }

    /// Toggle "same as another address" for a slot.
    ///
    /// Enabling copies the source slot verbatim and bypasses the lookup
    /// machine; disabling clears the derived fields and re-enters it.
    pub fn set_same_address(&mut self, slot_name: &str, enabled: bool) -> Result<(), SchemaError> {
        let schema = Arc::clone(&self.schema);
        let slot = schema.require_slot(slot_name)?;
        let source_name = slot
            .copy_source
            .clone()
            .ok_or_else(|| SchemaError::NoCopySource(slot_name.to_string()))?;
        let source = schema.require_slot(&source_name)?;

        if let Some(flag) = &slot.same_as_field {
            self.record.set(flag.clone(), Value::Bool(enabled));
            self.touched.insert(flag.clone());
        }

        if enabled {
            self.resolver.set_copy_mode(&slot.name, true);
            for (src, dst) in source.copied_fields().iter().zip(slot.copied_fields()) {
                let value = self.record.get(src).cloned().unwrap_or(Value::Null);
                self.record.set(dst.clone(), value);
                self.touched.insert(dst);
            }
            self.errors.set_advisory(slot.postal_field(), None);
        } else {
            self.resolver.set_copy_mode(&slot.name, false);
            for field in slot.derived_fields() {
                self.record.clear(&field);
                self.touched.insert(field);
            }
            // Re-enter the lookup machine with whatever the user had.
            let country = self.record.get_str(&slot.country_field()).map(str::to_string);
            let postal = self
                .record
                .get_str(&slot.postal_field())
                .unwrap_or_default()
                .to_string();
            self.resolver
                .input_changed(&slot.name, country.as_deref(), &postal);
        }

        // One validation pass after all writes of the transaction.
        self.revalidate_touched();
        Ok(())
    }

    /// Apply one async completion from the resolver.
    pub fn handle_address_event(&mut self, event: SlotEvent) {
        match event {
            SlotEvent::DebounceElapsed { slot, ticket } => {
                let Some(spec) = self.slot_spec(&slot) else {
                    return;
                };
                let country = self.record.get_str(&spec.country_field()).map(str::to_string);
                let postal = self
                    .record
                    .get_str(&spec.postal_field())
                    .unwrap_or_default()
                    .to_string();
                let action =
                    self.resolver
                        .debounce_elapsed(&slot, &ticket, country.as_deref(), &postal);
                if action == MachineAction::Reset {
                    self.clear_derived(&slot);
                    self.revalidate_touched();
                }
            }
            SlotEvent::LookupCompleted {
                slot,
                ticket,
                outcome,
            } => {
                let action = self.resolver.lookup_completed(&slot, &ticket, &outcome);
                match action {
                    MachineAction::Apply { state, city } => {
                        let Some(spec) = self.slot_spec(&slot) else {
                            return;
                        };
                        let (state_field, city_field) = (spec.state_field(), spec.city_field());
                        let postal_field = spec.postal_field();
                        self.record.set(state_field.clone(), Value::String(state));
                        self.record.set(city_field.clone(), Value::String(city));
                        self.touched.insert(state_field);
                        self.touched.insert(city_field);
                        self.errors.set_advisory(postal_field, None);
                        self.revalidate_touched();
                    }
                    MachineAction::Fail { message } => {
                        let Some(spec) = self.slot_spec(&slot) else {
                            return;
                        };
                        let postal_field = spec.postal_field();
                        self.clear_derived(&slot);
                        self.errors
                            .set_advisory(postal_field, Some(FieldError::lookup(message)));
                        self.revalidate_touched();
                    }
                    _ => {
                        debug!(slot = %slot, "address completion not applied");
                    }
                }
            }
        }
    }

    /// Await and apply the next async completion. False when the channel
    /// closed.
    pub async fn pump_address_event(&mut self) -> bool {
        match self.events_rx.recv().await {
            Some(event) => {
                self.handle_address_event(event);
                true
            }
            None => false,
        }
    }

    /// Apply every already-queued completion without waiting.
    pub fn pump_pending_address_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_address_event(event);
            applied += 1;
        }
        applied
    }

    /// Resolution phase of one slot, for hosts that surface progress.
    pub fn slot_phase(&self, slot: &str) -> Option<admitflow_address::SlotPhase> {
        self.resolver.machine(slot).map(|m| m.phase())
    }

    fn slot_spec(&self, slot: &str) -> Option<AddressSlotSpec> {
        self.schema.slot(slot).cloned()
    }

    fn clear_derived(&mut self, slot: &str) {
        let Some(spec) = self.slot_spec(slot) else {
            return;
        };
        for field in spec.derived_fields() {
            self.record.clear(&field);
            self.touched.insert(field);
        }
    }

    /// Clear now-inapplicable fields and collections, one pass per
    /// dependency level.
    fn apply_conditional_clearing(&mut self) {
        let schema = Arc::clone(&self.schema);
        for _ in 0..MAX_CLEARING_PASSES {
            let fields = schema.clearable_fields(&self.record);
            let groups = schema.clearable_groups(&self.record);
            if fields.is_empty() && groups.is_empty() {
                return;
            }
            for field in fields {
                debug!(field = %field, "clearing inapplicable field");
                self.record.clear(&field);
                self.touched.insert(field);
            }
            for group in groups {
                debug!(collection = %group, "clearing inapplicable collection");
                self.record.clear(&group);
                self.touched.insert(group);
            }
        }
        warn!("conditional clearing did not settle; dependency cycle suspected");
    }

    /// Feed a country/postal edit into the owning slot's machine.
    fn note_address_input(&mut self, field: &str) {
        let schema = Arc::clone(&self.schema);
        let Some(slot) = schema.slot_for_field(field) else {
            return;
        };
        let country = self.record.get_str(&slot.country_field()).map(str::to_string);
        let postal = self
            .record
            .get_str(&slot.postal_field())
            .unwrap_or_default()
            .to_string();
        let action = self
            .resolver
            .input_changed(&slot.name, country.as_deref(), &postal);
        if action == MachineAction::Reset {
            let name = slot.name.clone();
            self.clear_derived(&name);
            self.errors.set_advisory(slot.postal_field(), None);
        }
    }

    /// Revalidate the touched field set against the full record.
    fn revalidate_touched(&mut self) {
        let schema = Arc::clone(&self.schema);
        let names: Vec<String> = self.touched.iter().cloned().collect();
        let fresh = validate_subset(&schema, &self.record, &names);
        for name in &names {
            if schema.field(name).is_some() {
                self.errors.set_field(name.clone(), fresh.field(name).cloned());
            } else if schema.group(name).is_some() {
                self.errors
                    .set_collection(name.clone(), fresh.collection(name).cloned().unwrap_or_default());
            }
        }
    }
}
