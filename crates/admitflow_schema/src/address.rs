//! Address slot specs.
//!
//! One slot per logical address (applicant's permanent, communication,
//! local guardian's). The "same as another address" coupling is a named
//! cross-reference between slots, not an ad hoc field-path read.

/// Declaration of one address slot.
#[derive(Debug, Clone)]
pub struct AddressSlotSpec {
    pub name: String,
    /// Prefix of the slot's fields in the record (`<p>_country`, ...).
    pub field_prefix: String,
    /// Slot this one can copy verbatim from ("same as" mode).
    pub copy_source: Option<String>,
    /// Boolean discriminator field toggling copy mode.
    pub same_as_field: Option<String>,
}

impl AddressSlotSpec {
    pub fn new(name: impl Into<String>, field_prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_prefix: field_prefix.into(),
            copy_source: None,
            same_as_field: None,
        }
    }

    pub fn copies_from(
        mut self,
        source_slot: impl Into<String>,
        same_as_field: impl Into<String>,
    ) -> Self {
        self.copy_source = Some(source_slot.into());
        self.same_as_field = Some(same_as_field.into());
        self
    }

    pub fn country_field(&self) -> String {
        format!("{}_country", self.field_prefix)
    }

    pub fn postal_field(&self) -> String {
        format!("{}_postal_code", self.field_prefix)
    }

    pub fn state_field(&self) -> String {
        format!("{}_state", self.field_prefix)
    }

    pub fn city_field(&self) -> String {
        format!("{}_city", self.field_prefix)
    }

    pub fn line1_field(&self) -> String {
        format!("{}_address_line1", self.field_prefix)
    }

    pub fn line2_field(&self) -> String {
        format!("{}_address_line2", self.field_prefix)
    }

    /// Fields copied verbatim when "same as" mode is enabled.
    pub fn copied_fields(&self) -> [String; 6] {
        [
            self.country_field(),
            self.postal_field(),
            self.state_field(),
            self.city_field(),
            self.line1_field(),
            self.line2_field(),
        ]
    }

    /// Fields derived by the lookup, cleared on failure or mode exit.
    pub fn derived_fields(&self) -> [String; 2] {
        [self.state_field(), self.city_field()]
    }
}
