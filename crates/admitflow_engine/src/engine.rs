//! Scalar field validation.
//!
//! Per field, checks run in a fixed priority: required-check, then
//! type/format, then range/pattern, then cross-field. The first failing
//! rule wins; a field never stacks errors.

use admitflow_schema::{countries, options, FieldReader, FieldSpec, FormSchema, ValueCheck};
use chrono::{Days, Local, NaiveDate};

use crate::errors::{ErrorMap, FieldError};
use crate::groups::validate_group;
use crate::record::Record;

/// Validate one scalar field against the full record.
///
/// Unknown field names validate clean; the session guards its inputs
/// through [`FormSchema::require_field`].
pub fn validate_field(schema: &FormSchema, record: &Record, name: &str) -> Option<FieldError> {
    let spec = schema.field(name)?;
    validate_spec(spec, record)
}

/// Validate every field and collection of the record.
pub fn validate_record(schema: &FormSchema, record: &Record) -> ErrorMap {
    let mut errors = ErrorMap::new();
    for spec in &schema.fields {
        errors.set_field(spec.name.clone(), validate_spec(spec, record));
    }
    for group in &schema.groups {
        errors.set_collection(group.field.clone(), validate_group(group, record));
    }
    errors
}

/// Validate a named subset of fields and collections.
///
/// Conditions still resolve against the full record, so a discriminator
/// outside the subset keeps steering the fields inside it.
pub fn validate_subset<S: AsRef<str>>(
    schema: &FormSchema,
    record: &Record,
    names: &[S],
) -> ErrorMap {
    let mut errors = ErrorMap::new();
    for name in names {
        let name = name.as_ref();
        if let Some(spec) = schema.field(name) {
            errors.set_field(name.to_string(), validate_spec(spec, record));
        } else if let Some(group) = schema.group(name) {
            errors.set_collection(name.to_string(), validate_group(group, record));
        } else {
            tracing::debug!(field = name, "subset validation skipped unknown name");
        }
    }
    errors
}

/// Validate one spec against a reader (the record, or one item's view).
pub(crate) fn validate_spec(spec: &FieldSpec, reader: &dyn FieldReader) -> Option<FieldError> {
    let rule = spec.effective_rule(reader);
    if rule.cleared {
        // Inapplicable: no error regardless of any stale value.
        return None;
    }

    if !reader.has_value(&spec.name) {
        return rule.required.map(FieldError::required);
    }

    let text = reader.value_text(&spec.name);
    let mut checks: Vec<&ValueCheck> = rule.checks.iter().collect();
    checks.sort_by_key(|c| c.category());
    for check in checks {
        if let Some(error) = apply_check(check, text.as_deref(), reader, rule.required) {
            return Some(error);
        }
    }
    None
}

fn apply_check(
    check: &ValueCheck,
    text: Option<&str>,
    reader: &dyn FieldReader,
    required_message: Option<&str>,
) -> Option<FieldError> {
    match check {
        ValueCheck::NonEmptyText { max_len } => {
            let value = match text {
                Some(t) => t.trim().to_string(),
                None => return Some(FieldError::format("Must be text")),
            };
            if value.is_empty() {
                return Some(FieldError::format("Must not be blank"));
            }
            if let Some(max) = max_len {
                if value.chars().count() > *max {
                    return Some(FieldError::format(format!(
                        "Must be at most {max} characters"
                    )));
                }
            }
            None
        }
        ValueCheck::Pattern { regex, message } => {
            let value = text?;
            if regex.is_match(value.trim()) {
                None
            } else {
                Some(FieldError::format(*message))
            }
        }
        ValueCheck::OneOf { options } => {
            let value = text?;
            if options.contains(&value.trim()) {
                None
            } else {
                Some(FieldError::format("Not a valid option"))
            }
        }
        ValueCheck::IntegerRange { min, max } => {
            let value = match text.and_then(|t| t.trim().parse::<i64>().ok()) {
                Some(v) => v,
                None => return Some(FieldError::format("Must be a whole number")),
            };
            if min.is_some_and(|lo| value < lo) || max.is_some_and(|hi| value > hi) {
                return Some(FieldError::range(range_message(*min, *max)));
            }
            None
        }
        ValueCheck::ExactDigits { count } => {
            let value = text?.trim().to_string();
            if value.len() == *count && value.bytes().all(|b| b.is_ascii_digit()) {
                None
            } else {
                Some(FieldError::format(format!("Must be exactly {count} digits")))
            }
        }
        ValueCheck::ValidDate => {
            if text.and_then(parse_date).is_some() {
                None
            } else {
                Some(FieldError::format("Must be a valid date (YYYY-MM-DD)"))
            }
        }
        ValueCheck::DateBeforeYesterday => {
            let date = text.and_then(parse_date)?;
            let yesterday = Local::now()
                .date_naive()
                .checked_sub_days(Days::new(1))?;
            if date < yesterday {
                None
            } else {
                Some(FieldError::range("Must be a date before yesterday"))
            }
        }
        ValueCheck::DateAfterField { other } => {
            let date = text.and_then(parse_date)?;
            // An unset or unparseable counterpart makes the comparison
            // inapplicable, not an error.
            let other_date = reader.value_text(other).as_deref().and_then(parse_date)?;
            if date > other_date {
                None
            } else {
                Some(FieldError::cross_field(format!("Must be later than {other}")))
            }
        }
        ValueCheck::YearNotBefore { other } => {
            let year = text.and_then(|t| t.trim().parse::<i64>().ok())?;
            let other_year = reader
                .value_text(other)
                .and_then(|t| t.trim().parse::<i64>().ok())?;
            if year >= other_year {
                None
            } else {
                Some(FieldError::cross_field(format!(
                    "Cannot be earlier than {other}"
                )))
            }
        }
        ValueCheck::ClassRankNotBefore { other } => {
            let rank = text.and_then(|t| options::class_rank(t.trim()))?;
            let other_rank = reader
                .value_text(other)
                .and_then(|t| options::class_rank(t.trim()))?;
            if rank >= other_rank {
                None
            } else {
                Some(FieldError::cross_field(format!(
                    "Cannot be earlier than {other}"
                )))
            }
        }
        ValueCheck::KnownCountry => {
            let value = text?;
            if countries::is_known_country(value.trim()) {
                None
            } else {
                Some(FieldError::format("Select a valid country"))
            }
        }
        ValueCheck::MustBeTrue => {
            if text == Some("true") {
                None
            } else {
                Some(FieldError::required(
                    required_message.unwrap_or("Must be accepted"),
                ))
            }
        }
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

fn range_message(min: Option<i64>, max: Option<i64>) -> String {
    match (min, max) {
        (Some(lo), Some(hi)) => format!("Must be between {lo} and {hi}"),
        (Some(lo), None) => format!("Must be at least {lo}"),
        (None, Some(hi)) => format!("Must be at most {hi}"),
        (None, None) => "Out of range".to_string(),
    }
}
