use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::answers::AnswerMap;
use crate::expr::Expr;

/// Single-choice question shown on the questionnaire step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionDefinition {
    pub text: String,
    pub key: String,
    pub options: Vec<String>,
    /// Question is shown only while this holds for the collected answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_if: Option<Expr>,
}

impl QuestionDefinition {
    pub fn new(key: impl Into<String>, text: impl Into<String>, options: &[&str]) -> Self {
        Self {
            text: text.into(),
            key: key.into(),
            options: options.iter().map(|option| option.to_string()).collect(),
            display_if: None,
        }
    }

    pub fn with_display_if(mut self, expr: Expr) -> Self {
        self.display_if = Some(expr);
        self
    }

    pub fn is_visible(&self, answers: &AnswerMap) -> bool {
        self.display_if
            .as_ref()
            .map(|expr| expr.evaluate(answers))
            .unwrap_or(true)
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|candidate| candidate == option)
    }
}
