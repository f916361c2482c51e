//! Canonical option sets and compiled patterns shared across the form.

use once_cell::sync::Lazy;
use regex::Regex;

/// Fixed ordinal ladder of class levels. Rank comparisons use list index.
pub const CLASS_LADDER: &[&str] = &[
    "Nursery", "LKG", "UKG", "Class I", "Class II", "Class III", "Class IV", "Class V",
    "Class VI", "Class VII", "Class VIII", "Class IX", "Class X", "Class XI", "Class XII",
];

/// Rank of a class level in the ladder, or None for an unknown label.
pub fn class_rank(class: &str) -> Option<usize> {
    CLASS_LADDER.iter().position(|c| *c == class)
}

pub const GENDERS: &[&str] = &["Male", "Female", "Other"];

pub const YES_NO: &[&str] = &["Yes", "No"];

pub const NATIONALITIES: &[&str] = &[
    "Indian", "Nepalese", "Bhutanese", "Sri Lankan", "Bangladeshi", "American", "British",
    "Other",
];

/// Parent relation values. At most one of each per application.
pub const PARENT_RELATIONS: &[&str] = &["Father", "Mother"];

pub const CURRICULA: &[&str] = &["CBSE", "ICSE", "IGCSE", "IB", "State Board", "Other"];

pub const BLOOD_GROUPS: &[&str] = &["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

pub const PICKUP_POINTS: &[&str] = &["Main Gate", "City Centre", "Railway Station", "Other"];

/// Accepted bounds for school years.
pub const YEAR_MIN: i64 = 1990;
pub const YEAR_MAX: i64 = 2100;

static POSTAL_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9\s-]{3,20}$").unwrap());

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[0-9][0-9\s-]{6,14}$").unwrap());

/// Postal code shape accepted before a lookup is attempted.
pub fn postal_code_re() -> &'static Regex {
    Lazy::force(&POSTAL_CODE_RE)
}

pub fn email_re() -> &'static Regex {
    Lazy::force(&EMAIL_RE)
}

pub fn phone_re() -> &'static Regex {
    Lazy::force(&PHONE_RE)
}
