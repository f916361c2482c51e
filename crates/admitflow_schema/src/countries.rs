//! Country reference directory.
//!
//! The lookup service is addressed by ISO2 code; the form stores country
//! names. This table owns the mapping. `find_by_name` is the collaborator
//! contract the address subsystem consumes.

/// A country reference entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountryRef {
    pub name: &'static str,
    pub alpha2: &'static str,
}

/// Countries selectable in the form, with their ISO2 codes.
pub const COUNTRIES: &[CountryRef] = &[
    CountryRef { name: "India", alpha2: "IN" },
    CountryRef { name: "Nepal", alpha2: "NP" },
    CountryRef { name: "Bhutan", alpha2: "BT" },
    CountryRef { name: "Sri Lanka", alpha2: "LK" },
    CountryRef { name: "Bangladesh", alpha2: "BD" },
    CountryRef { name: "United States", alpha2: "US" },
    CountryRef { name: "United Kingdom", alpha2: "GB" },
    CountryRef { name: "United Arab Emirates", alpha2: "AE" },
    CountryRef { name: "Singapore", alpha2: "SG" },
    CountryRef { name: "Malaysia", alpha2: "MY" },
    CountryRef { name: "Australia", alpha2: "AU" },
    CountryRef { name: "Canada", alpha2: "CA" },
    CountryRef { name: "Germany", alpha2: "DE" },
    CountryRef { name: "France", alpha2: "FR" },
    CountryRef { name: "Japan", alpha2: "JP" },
    CountryRef { name: "South Africa", alpha2: "ZA" },
    CountryRef { name: "Kenya", alpha2: "KE" },
    CountryRef { name: "Oman", alpha2: "OM" },
    CountryRef { name: "Qatar", alpha2: "QA" },
    CountryRef { name: "Saudi Arabia", alpha2: "SA" },
    CountryRef { name: "Kuwait", alpha2: "KW" },
    CountryRef { name: "Bahrain", alpha2: "BH" },
    CountryRef { name: "Thailand", alpha2: "TH" },
    CountryRef { name: "Indonesia", alpha2: "ID" },
    CountryRef { name: "Nigeria", alpha2: "NG" },
];

/// Look up a country by display name, case-insensitive.
pub fn find_by_name(name: &str) -> Option<&'static CountryRef> {
    let wanted = name.trim();
    if wanted.is_empty() {
        return None;
    }
    COUNTRIES
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(wanted))
}

/// True when the name resolves through the directory.
pub fn is_known_country(name: &str) -> bool {
    find_by_name(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_name() {
        assert_eq!(find_by_name("India").map(|c| c.alpha2), Some("IN"));
        assert_eq!(find_by_name("  india  ").map(|c| c.alpha2), Some("IN"));
        assert_eq!(find_by_name("UNITED KINGDOM").map(|c| c.alpha2), Some("GB"));
        assert!(find_by_name("Atlantis").is_none());
        assert!(find_by_name("").is_none());
    }
}
