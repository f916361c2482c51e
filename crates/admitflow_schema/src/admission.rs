//! The canonical admission form schema.
//!
//! One versioned definition, one naming convention: collections use nested
//! item fields (`previous_schools[].school_name`), never flattened copies.

use crate::address::AddressSlotSpec;
use crate::field::{FieldSpec, Predicate, RuleOverride, ValueCheck};
use crate::group::GroupSpec;
use crate::options;
use crate::schema::FormSchema;
use crate::tabs::TabSpec;

/// Build the full admission form schema.
pub fn admission_schema() -> FormSchema {
    let mut fields = Vec::new();
    fields.extend(student_fields());
    fields.extend(family_fields());
    fields.extend(academic_fields());
    fields.extend(address_fields());
    fields.extend(declaration_fields());

    FormSchema {
        fields,
        groups: groups(),
        tabs: tabs(),
        address_slots: address_slots(),
    }
}

fn student_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::required("first_name", "First name is required")
            .check(ValueCheck::NonEmptyText { max_len: Some(100) }),
        FieldSpec::optional("middle_name").check(ValueCheck::NonEmptyText { max_len: Some(100) }),
        FieldSpec::required("last_name", "Last name is required")
            .check(ValueCheck::NonEmptyText { max_len: Some(100) }),
        FieldSpec::required("gender", "Select a gender")
            .check(ValueCheck::OneOf { options: options::GENDERS }),
        FieldSpec::required("date_of_birth", "Date of birth is required")
            .check(ValueCheck::ValidDate)
            .check(ValueCheck::DateBeforeYesterday),
        FieldSpec::optional("age").check(ValueCheck::IntegerRange {
            min: Some(0),
            max: Some(25),
        }),
        FieldSpec::optional("blood_group")
            .check(ValueCheck::OneOf { options: options::BLOOD_GROUPS }),
        FieldSpec::required("nationality", "Select a nationality")
            .check(ValueCheck::OneOf { options: options::NATIONALITIES }),
        FieldSpec::optional("religion").check(ValueCheck::NonEmptyText { max_len: Some(50) }),
        // Opaque file reference produced by the upload widget.
        FieldSpec::optional("photo"),
        FieldSpec::optional("aadhaar_number")
            .check(ValueCheck::ExactDigits { count: 12 })
            .when(
                Predicate::equals("nationality", "Indian"),
                RuleOverride::required("Aadhaar number is required"),
            )
            .when(
                Predicate::not_equals("nationality", "Indian"),
                RuleOverride::Cleared,
            ),
        FieldSpec::optional("passport_number")
            .check(ValueCheck::NonEmptyText { max_len: Some(20) })
            .when(
                Predicate::not_equals("nationality", "Indian"),
                RuleOverride::required("Passport number is required"),
            )
            .when(
                Predicate::equals("nationality", "Indian"),
                RuleOverride::Cleared,
            ),
        FieldSpec::optional("passport_issue_date")
            .check(ValueCheck::ValidDate)
            .when(
                Predicate::not_equals("nationality", "Indian"),
                RuleOverride::required("Passport issue date is required"),
            )
            .when(
                Predicate::equals("nationality", "Indian"),
                RuleOverride::Cleared,
            ),
        FieldSpec::optional("passport_expiry_date")
            .check(ValueCheck::ValidDate)
            .check(ValueCheck::DateAfterField { other: "passport_issue_date" })
            .when(
                Predicate::not_equals("nationality", "Indian"),
                RuleOverride::required("Passport expiry date is required"),
            )
            .when(
                Predicate::equals("nationality", "Indian"),
                RuleOverride::Cleared,
            ),
    ]
}

fn family_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::required("has_sibling_in_ihs", "Select Yes or No")
            .check(ValueCheck::OneOf { options: options::YES_NO }),
        FieldSpec::required("local_guardian", "Select Yes or No")
            .check(ValueCheck::OneOf { options: options::YES_NO }),
    ]
}

fn academic_fields() -> Vec<FieldSpec> {
    vec![FieldSpec::required("applying_for_class", "Select the class applied for")
        .check(ValueCheck::OneOf { options: options::CLASS_LADDER })]
}

fn address_fields() -> Vec<FieldSpec> {
    let mut fields = vec![
        FieldSpec::required("permanent_country", "Select a country")
            .check(ValueCheck::KnownCountry),
        FieldSpec::required("permanent_postal_code", "Postal code is required").check(
            ValueCheck::Pattern {
                regex: options::postal_code_re(),
                message: "Enter a valid postal code",
            },
        ),
        FieldSpec::required("permanent_state", "State is required")
            .check(ValueCheck::NonEmptyText { max_len: Some(100) }),
        FieldSpec::required("permanent_city", "City is required")
            .check(ValueCheck::NonEmptyText { max_len: Some(100) }),
        FieldSpec::required("permanent_address_line1", "Address is required")
            .check(ValueCheck::NonEmptyText { max_len: Some(200) }),
        FieldSpec::optional("permanent_address_line2")
            .check(ValueCheck::NonEmptyText { max_len: Some(200) }),
        // Copy-mode discriminators (checkbox booleans).
        FieldSpec::optional("communication_same_as_permanent"),
        FieldSpec::required("communication_country", "Select a country")
            .check(ValueCheck::KnownCountry),
        FieldSpec::required("communication_postal_code", "Postal code is required").check(
            ValueCheck::Pattern {
                regex: options::postal_code_re(),
                message: "Enter a valid postal code",
            },
        ),
        FieldSpec::required("communication_state", "State is required")
            .check(ValueCheck::NonEmptyText { max_len: Some(100) }),
        FieldSpec::required("communication_city", "City is required")
            .check(ValueCheck::NonEmptyText { max_len: Some(100) }),
        FieldSpec::required("communication_address_line1", "Address is required")
            .check(ValueCheck::NonEmptyText { max_len: Some(200) }),
        FieldSpec::optional("communication_address_line2")
            .check(ValueCheck::NonEmptyText { max_len: Some(200) }),
        FieldSpec::optional("guardian_same_as_communication"),
    ];

    // Guardian address applies only when a local guardian exists.
    let guardian_required = |name: &str, message: &str, checks: Vec<ValueCheck>| {
        let mut spec = FieldSpec::optional(name);
        for check in checks {
            spec = spec.check(check);
        }
        spec.when(
            Predicate::equals("local_guardian", "Yes"),
            RuleOverride::required(message),
        )
        .when(
            Predicate::not_equals("local_guardian", "Yes"),
            RuleOverride::Cleared,
        )
    };

    fields.push(guardian_required(
        "guardian_country",
        "Select a country",
        vec![ValueCheck::KnownCountry],
    ));
    fields.push(guardian_required(
        "guardian_postal_code",
        "Postal code is required",
        vec![ValueCheck::Pattern {
            regex: options::postal_code_re(),
            message: "Enter a valid postal code",
        }],
    ));
    fields.push(guardian_required(
        "guardian_state",
        "State is required",
        vec![ValueCheck::NonEmptyText { max_len: Some(100) }],
    ));
    fields.push(guardian_required(
        "guardian_city",
        "City is required",
        vec![ValueCheck::NonEmptyText { max_len: Some(100) }],
    ));
    fields.push(guardian_required(
        "guardian_address_line1",
        "Address is required",
        vec![ValueCheck::NonEmptyText { max_len: Some(200) }],
    ));
    fields.push(
        FieldSpec::optional("guardian_address_line2")
            .check(ValueCheck::NonEmptyText { max_len: Some(200) })
            .when(
                Predicate::not_equals("local_guardian", "Yes"),
                RuleOverride::Cleared,
            ),
    );

    fields
}

fn declaration_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::required("transport_required", "Select Yes or No")
            .check(ValueCheck::OneOf { options: options::YES_NO }),
        FieldSpec::optional("pickup_point")
            .check(ValueCheck::OneOf { options: options::PICKUP_POINTS })
            .when(
                Predicate::equals("transport_required", "Yes"),
                RuleOverride::required("Select a pickup point"),
            )
            .when(
                Predicate::not_equals("transport_required", "Yes"),
                RuleOverride::Cleared,
            ),
        FieldSpec::optional("pickup_point_other")
            .check(ValueCheck::NonEmptyText { max_len: Some(100) })
            .when(
                Predicate::equals("pickup_point", "Other"),
                RuleOverride::required("Describe the pickup point"),
            )
            .when(
                Predicate::not_equals("pickup_point", "Other"),
                RuleOverride::Cleared,
            )
            .when(
                Predicate::is_unset("pickup_point"),
                RuleOverride::Cleared,
            ),
        FieldSpec::required("declaration_accepted", "Accept the declaration to submit")
            .check(ValueCheck::MustBeTrue),
    ]
}

fn groups() -> Vec<GroupSpec> {
    vec![
        GroupSpec::new("parents", 1, "Add at least one parent")
            .with_max(2)
            .with_unique_key("relation")
            .item(
                FieldSpec::required("relation", "Select the relation")
                    .check(ValueCheck::OneOf { options: options::PARENT_RELATIONS }),
            )
            .item(
                FieldSpec::required("full_name", "Parent name is required")
                    .check(ValueCheck::NonEmptyText { max_len: Some(150) }),
            )
            .item(FieldSpec::required("email", "Email is required").check(
                ValueCheck::Pattern {
                    regex: options::email_re(),
                    message: "Enter a valid email address",
                },
            ))
            .item(FieldSpec::required("phone", "Phone number is required").check(
                ValueCheck::Pattern {
                    regex: options::phone_re(),
                    message: "Enter a valid phone number",
                },
            ))
            .item(FieldSpec::optional("occupation").check(ValueCheck::NonEmptyText {
                max_len: Some(100),
            }))
            .item(FieldSpec::optional("annual_income").check(ValueCheck::IntegerRange {
                min: Some(0),
                max: None,
            })),
        GroupSpec::new("siblings", 1, "Add at least one sibling")
            .applicable_when(Predicate::equals("has_sibling_in_ihs", "Yes"))
            .item(
                FieldSpec::required("full_name", "Sibling name is required")
                    .check(ValueCheck::NonEmptyText { max_len: Some(150) }),
            )
            .item(
                FieldSpec::optional("class")
                    .check(ValueCheck::OneOf { options: options::CLASS_LADDER }),
            )
            .item(
                FieldSpec::optional("admission_number")
                    .check(ValueCheck::NonEmptyText { max_len: Some(20) }),
            ),
        GroupSpec::new("guardians", 1, "Add at least one guardian")
            .applicable_when(Predicate::equals("local_guardian", "Yes"))
            .with_max(2)
            .item(
                FieldSpec::required("full_name", "Guardian name is required")
                    .check(ValueCheck::NonEmptyText { max_len: Some(150) }),
            )
            .item(
                FieldSpec::required("relation_to_student", "Relation is required")
                    .check(ValueCheck::NonEmptyText { max_len: Some(100) }),
            )
            .item(FieldSpec::required("phone", "Phone number is required").check(
                ValueCheck::Pattern {
                    regex: options::phone_re(),
                    message: "Enter a valid phone number",
                },
            )),
        GroupSpec::new("languages", 1, "Add at least one language")
            .with_unique_key("language")
            .item(
                FieldSpec::required("language", "Language name is required")
                    .check(ValueCheck::NonEmptyText { max_len: Some(50) }),
            )
            .item(FieldSpec::optional("can_speak"))
            .item(FieldSpec::optional("can_read"))
            .item(FieldSpec::optional("can_write")),
        GroupSpec::new("previous_schools", 1, "Add at least one previous school")
            .item(
                FieldSpec::required("school_name", "School name is required")
                    .check(ValueCheck::NonEmptyText { max_len: Some(150) }),
            )
            .item(
                FieldSpec::required("city", "City is required")
                    .check(ValueCheck::NonEmptyText { max_len: Some(100) }),
            )
            .item(
                FieldSpec::optional("curriculum")
                    .check(ValueCheck::OneOf { options: options::CURRICULA }),
            )
            .item(
                FieldSpec::required("from_year", "From year is required").check(
                    ValueCheck::IntegerRange {
                        min: Some(options::YEAR_MIN),
                        max: Some(options::YEAR_MAX),
                    },
                ),
            )
            .item(
                FieldSpec::required("to_year", "To year is required")
                    .check(ValueCheck::IntegerRange {
                        min: Some(options::YEAR_MIN),
                        max: Some(options::YEAR_MAX),
                    })
                    .check(ValueCheck::YearNotBefore { other: "from_year" }),
            )
            .item(
                FieldSpec::required("from_class", "From class is required")
                    .check(ValueCheck::OneOf { options: options::CLASS_LADDER }),
            )
            .item(
                FieldSpec::required("to_class", "To class is required")
                    .check(ValueCheck::OneOf { options: options::CLASS_LADDER })
                    .check(ValueCheck::ClassRankNotBefore { other: "from_class" }),
            ),
    ]
}

fn tabs() -> Vec<TabSpec> {
    vec![
        TabSpec::new("student").fields([
            "first_name",
            "middle_name",
            "last_name",
            "gender",
            "date_of_birth",
            "age",
            "blood_group",
            "nationality",
            "religion",
            "photo",
            "aadhaar_number",
            "passport_number",
            "passport_issue_date",
            "passport_expiry_date",
        ]),
        TabSpec::new("family")
            .fields(["has_sibling_in_ihs", "local_guardian"])
            .group("parents")
            .group("siblings")
            .group("guardians")
            .group("languages"),
        TabSpec::new("academics")
            .field("applying_for_class")
            .group("previous_schools"),
        TabSpec::new("address").fields([
            "permanent_country",
            "permanent_postal_code",
            "permanent_state",
            "permanent_city",
            "permanent_address_line1",
            "permanent_address_line2",
            "communication_same_as_permanent",
            "communication_country",
            "communication_postal_code",
            "communication_state",
            "communication_city",
            "communication_address_line1",
            "communication_address_line2",
            "guardian_same_as_communication",
            "guardian_country",
            "guardian_postal_code",
            "guardian_state",
            "guardian_city",
            "guardian_address_line1",
            "guardian_address_line2",
        ]),
        TabSpec::new("declarations").fields([
            "transport_required",
            "pickup_point",
            "pickup_point_other",
            "declaration_accepted",
        ]),
    ]
}

fn address_slots() -> Vec<AddressSlotSpec> {
    vec![
        AddressSlotSpec::new("permanent", "permanent"),
        AddressSlotSpec::new("communication", "communication")
            .copies_from("permanent", "communication_same_as_permanent"),
        AddressSlotSpec::new("guardian", "guardian")
            .copies_from("communication", "guardian_same_as_communication"),
    ]
}
