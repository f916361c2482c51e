//! Field specs, predicates, and tagged conditional rules.
//!
//! A [`FieldSpec`] pairs a base rule with zero or more conditional
//! branches. Branches are evaluated in declaration order against the
//! current record on every pass; the first matching predicate wins, and no
//! match falls back to the base rule. An unset or invalid discriminator
//! never matches a predicate, so the dependent field lands on its
//! "otherwise" branch - inapplicable, not an error.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Read access to the current record, implemented by consumers.
///
/// The schema layer resolves predicates and effective rules through this
/// seam; it never holds a record itself.
pub trait FieldReader {
    /// Scalar value as text: strings as-is, booleans as "true"/"false",
    /// numbers rendered. None for unset, null, or non-scalar values.
    fn value_text(&self, field: &str) -> Option<String>;

    /// True when the field holds a non-empty value of any shape.
    fn has_value(&self, field: &str) -> bool;
}

/// A predicate over the record. Tagged and enumerable, never a closure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Equals { field: String, value: String },
    NotEquals { field: String, value: String },
    In { field: String, values: Vec<String> },
    IsTrue { field: String },
    /// Matches when the field has no value. The one predicate that fires on
    /// an unset field; used to cascade clearing down dependency chains.
    IsUnset { field: String },
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
}

impl Predicate {
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn not_equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::NotEquals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn is_true(field: impl Into<String>) -> Self {
        Self::IsTrue {
            field: field.into(),
        }
    }

    pub fn is_unset(field: impl Into<String>) -> Self {
        Self::IsUnset {
            field: field.into(),
        }
    }

    /// Evaluate against the current record.
    ///
    /// `Equals`/`NotEquals`/`In`/`IsTrue` only match when the discriminator
    /// field is actually set.
    pub fn matches(&self, reader: &dyn FieldReader) -> bool {
        match self {
            Predicate::Equals { field, value } => {
                reader.value_text(field).is_some_and(|v| v == *value)
            }
            Predicate::NotEquals { field, value } => {
                reader.value_text(field).is_some_and(|v| v != *value)
            }
            Predicate::In { field, values } => reader
                .value_text(field)
                .is_some_and(|v| values.iter().any(|w| *w == v)),
            Predicate::IsTrue { field } => {
                reader.value_text(field).is_some_and(|v| v == "true")
            }
            Predicate::IsUnset { field } => !reader.has_value(field),
            Predicate::All(preds) => preds.iter().all(|p| p.matches(reader)),
            Predicate::Any(preds) => preds.iter().any(|p| p.matches(reader)),
        }
    }
}

/// Broad category of a value check, used to order evaluation:
/// format before range before cross-field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckCategory {
    Format,
    Range,
    CrossField,
}

/// A single constraint on a field value. Tagged and introspectable.
#[derive(Debug, Clone)]
pub enum ValueCheck {
    /// Non-empty after trim, optionally bounded in length.
    NonEmptyText { max_len: Option<usize> },
    /// Full match against a compiled pattern.
    Pattern {
        regex: &'static Regex,
        message: &'static str,
    },
    /// Membership in a fixed option set.
    OneOf { options: &'static [&'static str] },
    /// Integer with optional inclusive bounds.
    IntegerRange { min: Option<i64>, max: Option<i64> },
    /// Exactly `count` ASCII digits (e.g. Aadhaar: 12).
    ExactDigits { count: usize },
    /// Parseable ISO date (%Y-%m-%d).
    ValidDate,
    /// Date strictly before yesterday (date of birth).
    DateBeforeYesterday,
    /// Date strictly after another date field in the same scope.
    DateAfterField { other: &'static str },
    /// Year not before another year field in the same scope.
    YearNotBefore { other: &'static str },
    /// Class-ladder rank not before another class field in the same scope.
    ClassRankNotBefore { other: &'static str },
    /// Resolvable through the country directory.
    KnownCountry,
    /// Boolean that must be true (declaration checkboxes).
    MustBeTrue,
}

impl ValueCheck {
    pub fn category(&self) -> CheckCategory {
        match self {
            ValueCheck::NonEmptyText { .. }
            | ValueCheck::Pattern { .. }
            | ValueCheck::OneOf { .. }
            | ValueCheck::ExactDigits { .. }
            | ValueCheck::ValidDate
            | ValueCheck::KnownCountry
            | ValueCheck::MustBeTrue => CheckCategory::Format,
            ValueCheck::IntegerRange { .. } | ValueCheck::DateBeforeYesterday => {
                CheckCategory::Range
            }
            ValueCheck::DateAfterField { .. }
            | ValueCheck::YearNotBefore { .. }
            | ValueCheck::ClassRankNotBefore { .. } => CheckCategory::CrossField,
        }
    }
}

/// Whether a field must hold a value.
#[derive(Debug, Clone)]
pub enum Requirement {
    Required { message: String },
    Optional,
}

/// Base rule for a field: requirement plus value checks.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub requirement: Requirement,
    pub checks: Vec<ValueCheck>,
}

/// Constraint override selected by a matching branch.
///
/// `None` for `checks` inherits the base rule's checks.
#[derive(Debug, Clone)]
pub enum RuleOverride {
    Required {
        message: String,
        checks: Option<Vec<ValueCheck>>,
    },
    Optional {
        checks: Option<Vec<ValueCheck>>,
    },
    /// Optional AND the value is forced to empty on transition.
    Cleared,
}

impl RuleOverride {
    pub fn required(message: impl Into<String>) -> Self {
        Self::Required {
            message: message.into(),
            checks: None,
        }
    }

    pub fn required_with(message: impl Into<String>, checks: Vec<ValueCheck>) -> Self {
        Self::Required {
            message: message.into(),
            checks: Some(checks),
        }
    }
}

/// One conditional branch: when the predicate matches, the override applies.
#[derive(Debug, Clone)]
pub struct ConditionalRule {
    pub when: Predicate,
    pub then: RuleOverride,
}

/// A scalar field declaration.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub base: FieldRule,
    pub branches: Vec<ConditionalRule>,
}

/// The rule in effect for a field given the current record.
#[derive(Debug, Clone)]
pub struct EffectiveRule<'a> {
    /// Required-message when the field is required, None when optional.
    pub required: Option<&'a str>,
    pub checks: &'a [ValueCheck],
    /// The field is inapplicable and its value must be cleared.
    pub cleared: bool,
}

impl FieldSpec {
    /// A field that is unconditionally required.
    pub fn required(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: FieldRule {
                requirement: Requirement::Required {
                    message: message.into(),
                },
                checks: Vec::new(),
            },
            branches: Vec::new(),
        }
    }

    /// A field that is optional unless a branch overrides it.
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: FieldRule {
                requirement: Requirement::Optional,
                checks: Vec::new(),
            },
            branches: Vec::new(),
        }
    }

    /// Append a value check to the base rule.
    pub fn check(mut self, check: ValueCheck) -> Self {
        self.base.checks.push(check);
        self
    }

    /// Append a conditional branch. Branches are tried in declaration order.
    pub fn when(mut self, when: Predicate, then: RuleOverride) -> Self {
        self.branches.push(ConditionalRule { when, then });
        self
    }

    /// Resolve the branch in effect for the current record.
    pub fn effective_rule(&self, reader: &dyn FieldReader) -> EffectiveRule<'_> {
        for branch in &self.branches {
            if branch.when.matches(reader) {
                return match &branch.then {
                    RuleOverride::Required { message, checks } => EffectiveRule {
                        required: Some(message.as_str()),
                        checks: checks.as_deref().unwrap_or(&self.base.checks),
                        cleared: false,
                    },
                    RuleOverride::Optional { checks } => EffectiveRule {
                        required: None,
                        checks: checks.as_deref().unwrap_or(&self.base.checks),
                        cleared: false,
                    },
                    RuleOverride::Cleared => EffectiveRule {
                        required: None,
                        checks: &[],
                        cleared: true,
                    },
                };
            }
        }
        EffectiveRule {
            required: match &self.base.requirement {
                Requirement::Required { message } => Some(message.as_str()),
                Requirement::Optional => None,
            },
            checks: &self.base.checks,
            cleared: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    struct MapReader(BTreeMap<String, String>);

    impl FieldReader for MapReader {
        fn value_text(&self, field: &str) -> Option<String> {
            self.0.get(field).cloned()
        }

        fn has_value(&self, field: &str) -> bool {
            self.0.get(field).is_some_and(|v| !v.is_empty())
        }
    }

    fn reader(pairs: &[(&str, &str)]) -> MapReader {
        MapReader(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_unset_discriminator_never_matches() {
        let r = reader(&[]);
        assert!(!Predicate::equals("nationality", "Indian").matches(&r));
        assert!(!Predicate::not_equals("nationality", "Indian").matches(&r));
        assert!(!Predicate::is_true("same_as").matches(&r));
        // The one exception: IsUnset exists to fire on absent fields.
        assert!(Predicate::is_unset("pickup_point").matches(&r));
    }

    #[test]
    fn test_combinators() {
        let r = reader(&[("nationality", "Indian"), ("local_guardian", "Yes")]);
        let membership = Predicate::In {
            field: "nationality".to_string(),
            values: vec!["Indian".to_string(), "Nepalese".to_string()],
        };
        assert!(membership.matches(&r));
        assert!(Predicate::All(vec![
            membership.clone(),
            Predicate::equals("local_guardian", "Yes"),
        ])
        .matches(&r));
        assert!(!Predicate::All(vec![
            membership.clone(),
            Predicate::equals("local_guardian", "No"),
        ])
        .matches(&r));
        assert!(Predicate::Any(vec![
            Predicate::equals("local_guardian", "No"),
            membership,
        ])
        .matches(&r));
    }

    #[test]
    fn test_first_matching_branch_wins() {
        let spec = FieldSpec::optional("aadhaar_number")
            .when(
                Predicate::equals("nationality", "Indian"),
                RuleOverride::required("Aadhaar number is required"),
            )
            .when(
                Predicate::not_equals("nationality", "Indian"),
                RuleOverride::Cleared,
            );

        let indian = reader(&[("nationality", "Indian")]);
        let rule = spec.effective_rule(&indian);
        assert_eq!(rule.required, Some("Aadhaar number is required"));
        assert!(!rule.cleared);

        let other = reader(&[("nationality", "British")]);
        let rule = spec.effective_rule(&other);
        assert!(rule.required.is_none());
        assert!(rule.cleared);

        // Unset discriminator resolves to the base rule.
        let unset = reader(&[]);
        let rule = spec.effective_rule(&unset);
        assert!(rule.required.is_none());
        assert!(!rule.cleared);
    }

    #[test]
    fn test_override_inherits_base_checks() {
        let spec = FieldSpec::optional("pickup_point")
            .check(ValueCheck::NonEmptyText { max_len: Some(50) })
            .when(
                Predicate::equals("transport_required", "Yes"),
                RuleOverride::required("Pickup point is required"),
            );

        let r = reader(&[("transport_required", "Yes")]);
        let rule = spec.effective_rule(&r);
        assert_eq!(rule.checks.len(), 1);
    }

    #[test]
    fn test_check_categories_order() {
        assert!(
            ValueCheck::ValidDate.category()
                < ValueCheck::DateBeforeYesterday.category()
        );
        assert!(
            ValueCheck::IntegerRange { min: None, max: None }.category()
                < ValueCheck::YearNotBefore { other: "from_year" }.category()
        );
    }
}
