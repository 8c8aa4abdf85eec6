use std::collections::BTreeSet;
use std::sync::LazyLock;

use handlebars::Template;
use regex::Regex;

use crate::answers::ValidationErrors;
use crate::spec::assessment::{AssessmentSpec, SpecError};
use crate::spec::contact::{ContactField, ContactInfo};

pub const NAME_REQUIRED: &str = "Name is required";
pub const EMAIL_INVALID: &str = "Valid email is required";
pub const PHONE_INVALID: &str = "Valid phone number is required (10 digits)";
pub const AGE_INVALID: &str = "Age must be 18 or older";
pub const GENDER_REQUIRED: &str = "Gender is required";

pub const MINIMUM_AGE: u32 = 18;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("phone pattern compiles"));

/// Checks every contact field and returns the full error map; an empty map
/// means the form may be submitted.
pub fn validate_contact(contact: &ContactInfo) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if contact.name.trim().is_empty() {
        errors.insert(ContactField::Name, NAME_REQUIRED);
    }
    if !EMAIL_PATTERN.is_match(&contact.email) {
        errors.insert(ContactField::Email, EMAIL_INVALID);
    }
    if !PHONE_PATTERN.is_match(&contact.phone) {
        errors.insert(ContactField::Phone, PHONE_INVALID);
    }
    if !contact
        .age_years()
        .is_some_and(|years| years >= MINIMUM_AGE)
    {
        errors.insert(ContactField::Age, AGE_INVALID);
    }
    if contact.gender.is_none() {
        errors.insert(ContactField::Gender, GENDER_REQUIRED);
    }

    errors
}

/// Structural checks applied to every loaded spec.
pub fn validate_spec(spec: &AssessmentSpec) -> Result<(), SpecError> {
    for (name, source) in spec.presentation.templates() {
        Template::compile(source).map_err(|err| SpecError::Template {
            name,
            source: Box::new(err),
        })?;
    }
    for (gender, questions) in spec.banks.lists() {
        let mut seen = BTreeSet::new();
        for (index, question) in questions.iter().enumerate() {
            if question.key.trim().is_empty() {
                return Err(SpecError::EmptyKey { gender, index });
            }
            if question.text.trim().is_empty() {
                return Err(SpecError::EmptyText {
                    gender,
                    key: question.key.clone(),
                });
            }
            if question.options.is_empty() {
                return Err(SpecError::NoOptions {
                    gender,
                    key: question.key.clone(),
                });
            }
            let mut options = BTreeSet::new();
            for option in &question.options {
                if !options.insert(option.as_str()) {
                    return Err(SpecError::DuplicateOption {
                        gender,
                        key: question.key.clone(),
                        option: option.clone(),
                    });
                }
            }
            if let Some(expr) = &question.display_if
                && let Some(reference) = expr
                    .referenced_keys()
                    .into_iter()
                    .find(|reference| !seen.contains(*reference))
            {
                return Err(SpecError::UnknownConditionKey {
                    gender,
                    key: question.key.clone(),
                    reference: reference.to_string(),
                });
            }
            if !seen.insert(question.key.as_str()) {
                return Err(SpecError::DuplicateKey {
                    gender,
                    key: question.key.clone(),
                });
            }
        }
    }
    Ok(())
}
