//! Admission Form Schema
//!
//! # Philosophy: the schema is data, not code
//!
//! Every conditional requirement in the admission form is declared here as
//! an explicit, statically enumerable rule: "when X equals V, field F
//! becomes required with constraint C; otherwise F is cleared". No closures,
//! no hidden branching - the whole dependency set can be introspected,
//! tested, and re-evaluated deterministically bottom-up.
//!
//! The schema never touches a record directly. Consumers implement
//! [`FieldReader`] and the schema resolves effective rules against it on
//! every pass, so multi-level dependency chains settle without caching.
//!
//! # Modules
//!
//! - [`field`]: field specs, predicates, rule overrides, value checks
//! - [`group`]: repeatable collection specs (min/max count, unique key)
//! - [`tabs`]: named partitions of the field set for staged validation
//! - [`address`]: address slot specs and the copy-source cross-reference
//! - [`options`]: canonical option sets, the class ladder, compiled patterns
//! - [`countries`]: country reference directory (name -> ISO2)
//! - [`admission`]: the canonical admission form schema

pub mod address;
pub mod admission;
pub mod countries;
pub mod field;
pub mod group;
pub mod options;
pub mod schema;
pub mod tabs;

pub use address::AddressSlotSpec;
pub use admission::admission_schema;
pub use countries::{find_by_name, CountryRef};
pub use field::{
    ConditionalRule, EffectiveRule, FieldReader, FieldRule, FieldSpec, Predicate, Requirement,
    RuleOverride, ValueCheck,
};
pub use group::GroupSpec;
pub use schema::{FormSchema, SchemaError};
pub use tabs::TabSpec;
