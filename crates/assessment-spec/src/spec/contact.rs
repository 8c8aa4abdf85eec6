use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Respondent gender, selecting which question list is asked.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }

    /// Parses the value a gender selector submits. Matching ignores case and
    /// surrounding whitespace; anything else leaves the gender unset.
    pub fn from_input(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Gender::ALL
            .into_iter()
            .find(|gender| gender.as_str().eq_ignore_ascii_case(trimmed))
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names of the editable contact form fields.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    Name,
    Email,
    Phone,
    Age,
    Gender,
}

impl ContactField {
    /// Form order, used for prompting and rendering.
    pub const ALL: [ContactField; 5] = [
        ContactField::Name,
        ContactField::Email,
        ContactField::Phone,
        ContactField::Age,
        ContactField::Gender,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContactField::Name => "name",
            ContactField::Email => "email",
            ContactField::Phone => "phone",
            ContactField::Age => "age",
            ContactField::Gender => "gender",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContactField::Name => "Name",
            ContactField::Email => "Email",
            ContactField::Phone => "Phone",
            ContactField::Age => "Age",
            ContactField::Gender => "Gender",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown contact field '{0}'")]
pub struct UnknownContactField(pub String);

impl FromStr for ContactField {
    type Err = UnknownContactField;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        ContactField::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| UnknownContactField(raw.to_string()))
    }
}

/// Personal details collected on the first step.
///
/// Text fields hold exactly what the respondent typed; `age` stays textual
/// until validation parses it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ContactInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub age: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

impl ContactInfo {
    /// Overwrites one field with raw input.
    pub fn set(&mut self, field: ContactField, value: &str) {
        match field {
            ContactField::Name => self.name = value.to_string(),
            ContactField::Email => self.email = value.to_string(),
            ContactField::Phone => self.phone = value.to_string(),
            ContactField::Age => self.age = value.to_string(),
            ContactField::Gender => self.gender = Gender::from_input(value),
        }
    }

    /// Current value of a field as form text.
    pub fn get(&self, field: ContactField) -> &str {
        match field {
            ContactField::Name => &self.name,
            ContactField::Email => &self.email,
            ContactField::Phone => &self.phone,
            ContactField::Age => &self.age,
            ContactField::Gender => self.gender.map(|gender| gender.as_str()).unwrap_or(""),
        }
    }

    /// Age in whole years when the field holds only ASCII digits. Values
    /// beyond `u32` saturate rather than failing.
    pub fn age_years(&self) -> Option<u32> {
        let trimmed = self.age.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
            return None;
        }
        Some(trimmed.parse().unwrap_or(u32::MAX))
    }

    pub fn is_blank(&self) -> bool {
        ContactField::ALL
            .iter()
            .all(|field| self.get(*field).trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_input_is_case_insensitive() {
        assert_eq!(Gender::from_input(" male "), Some(Gender::Male));
        assert_eq!(Gender::from_input("FEMALE"), Some(Gender::Female));
        assert_eq!(Gender::from_input(""), None);
        assert_eq!(Gender::from_input("other"), None);
    }

    #[test]
    fn age_years_accepts_only_digits() {
        let age = |text: &str| ContactInfo {
            age: text.into(),
            ..ContactInfo::default()
        };
        assert_eq!(age(" 30 ").age_years(), Some(30));
        assert_eq!(age("+20").age_years(), None);
        assert_eq!(age("2 0").age_years(), None);
        assert_eq!(age("99999999999").age_years(), Some(u32::MAX));
    }

    #[test]
    fn set_and_get_round_through_field_names() {
        let mut contact = ContactInfo::default();
        assert!(contact.is_blank());
        for field in ContactField::ALL {
            let parsed: ContactField = field.as_str().parse().expect("field name");
            assert_eq!(parsed, field);
        }
        contact.set(ContactField::Gender, "Female");
        contact.set(ContactField::Age, "42");
        assert_eq!(contact.get(ContactField::Gender), "Female");
        assert_eq!(contact.age_years(), Some(42));
        assert!(!contact.is_blank());
        assert!("address".parse::<ContactField>().is_err());
    }
}
