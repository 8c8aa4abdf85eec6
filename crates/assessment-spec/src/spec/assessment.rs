use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spec::contact::Gender;
use crate::spec::question::QuestionDefinition;

const BUNDLED_SPEC: &str = include_str!("../../data/self_assessment.json");

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("failed to parse assessment spec: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{gender} question #{index} has an empty key")]
    EmptyKey { gender: Gender, index: usize },
    #[error("{gender} question '{key}' has empty text")]
    EmptyText { gender: Gender, key: String },
    #[error("{gender} question key '{key}' is declared more than once")]
    DuplicateKey { gender: Gender, key: String },
    #[error("{gender} question '{key}' declares no options")]
    NoOptions { gender: Gender, key: String },
    #[error("{gender} question '{key}' lists option '{option}' more than once")]
    DuplicateOption {
        gender: Gender,
        key: String,
        option: String,
    },
    #[error("{gender} question '{key}' is conditioned on '{reference}', which is not asked before it")]
    UnknownConditionKey {
        gender: Gender,
        key: String,
        reference: String,
    },
    #[error("presentation template '{name}' does not compile: {source}")]
    Template {
        name: &'static str,
        #[source]
        source: Box<handlebars::TemplateError>,
    },
}

/// Static messages shown around the questionnaire. Each is a handlebars
/// template rendered against `{ title, contact, answers }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Presentation {
    #[serde(default = "default_greeting")]
    pub greeting: String,
    #[serde(default = "default_acknowledgement")]
    pub acknowledgement: String,
    #[serde(default = "default_completion")]
    pub completion: String,
}

fn default_greeting() -> String {
    "Please enter your personal details:".into()
}

fn default_acknowledgement() -> String {
    "Thank you for your details! Click Next to proceed with the questionnaire.".into()
}

fn default_completion() -> String {
    "Form Submitted!".into()
}

impl Presentation {
    /// Each message template with its field name.
    pub fn templates(&self) -> [(&'static str, &str); 3] {
        [
            ("greeting", &self.greeting),
            ("acknowledgement", &self.acknowledgement),
            ("completion", &self.completion),
        ]
    }
}

impl Default for Presentation {
    fn default() -> Self {
        Self {
            greeting: default_greeting(),
            acknowledgement: default_acknowledgement(),
            completion: default_completion(),
        }
    }
}

/// Gender-keyed ordered question lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct QuestionBank(BTreeMap<Gender, Vec<QuestionDefinition>>);

impl QuestionBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list(mut self, gender: Gender, questions: Vec<QuestionDefinition>) -> Self {
        self.0.insert(gender, questions);
        self
    }

    /// Question list for a gender; empty when the gender is unset or has no
    /// entry.
    pub fn questions_for(&self, gender: Option<Gender>) -> &[QuestionDefinition] {
        gender
            .and_then(|gender| self.0.get(&gender))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn lists(&self) -> impl Iterator<Item = (Gender, &[QuestionDefinition])> {
        self.0
            .iter()
            .map(|(gender, questions)| (*gender, questions.as_slice()))
    }
}

/// Top-level questionnaire definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AssessmentSpec {
    pub id: String,
    pub title: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub presentation: Presentation,
    pub banks: QuestionBank,
}

impl AssessmentSpec {
    /// The questionnaire compiled into the crate.
    pub fn bundled() -> Result<Self, SpecError> {
        Self::from_json(BUNDLED_SPEC)
    }

    /// Parses and checks a spec document.
    pub fn from_json(raw: &str) -> Result<Self, SpecError> {
        let spec: AssessmentSpec = serde_json::from_str(raw)?;
        crate::validate::validate_spec(&spec)?;
        Ok(spec)
    }

    pub fn questions_for(&self, gender: Option<Gender>) -> &[QuestionDefinition] {
        self.banks.questions_for(gender)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_spec_loads_both_lists() {
        let spec = AssessmentSpec::bundled().expect("bundled spec");
        assert_eq!(spec.title, "Self Assessment");
        assert_eq!(spec.questions_for(Some(Gender::Male)).len(), 5);
        assert_eq!(spec.questions_for(Some(Gender::Female)).len(), 4);
        assert!(spec.questions_for(None).is_empty());
    }

    #[test]
    fn missing_gender_entry_yields_empty_list() {
        let bank = QuestionBank::new().with_list(
            Gender::Male,
            vec![QuestionDefinition::new("q", "Question?", &["a"])],
        );
        assert!(bank.questions_for(Some(Gender::Female)).is_empty());
        assert_eq!(bank.questions_for(Some(Gender::Male)).len(), 1);
    }
}
