use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::answers::AnswerMap;
use crate::spec::question::QuestionDefinition;

/// Top-level phase of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    ContactForm,
    Interstitial,
    Questionnaire,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::ContactForm => "contact_form",
            Step::Interstitial => "interstitial",
            Step::Questionnaire => "questionnaire",
        }
    }
}

/// Where the respondent currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NavigationState {
    pub step: Step,
    /// Only meaningful while `step` is [`Step::Questionnaire`].
    #[serde(default)]
    pub question_index: usize,
}

impl NavigationState {
    pub fn is_initial(&self) -> bool {
        self.step == Step::ContactForm
    }
}

/// First index at or after `from` whose question is visible, or
/// `questions.len()` when none is left.
pub fn next_visible(questions: &[QuestionDefinition], from: usize, answers: &AnswerMap) -> usize {
    questions
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, question)| question.is_visible(answers))
        .map(|(index, _)| index)
        .unwrap_or(questions.len())
}

/// Last visible index strictly before `before`.
pub fn previous_visible(
    questions: &[QuestionDefinition],
    before: usize,
    answers: &AnswerMap,
) -> Option<usize> {
    questions
        .iter()
        .enumerate()
        .take(before.min(questions.len()))
        .rev()
        .find(|(_, question)| question.is_visible(answers))
        .map(|(index, _)| index)
}

/// Position of the last question, or `None` for an empty list.
pub fn last_index(questions: &[QuestionDefinition]) -> Option<usize> {
    questions.len().checked_sub(1)
}

/// Number of questions currently visible for the given answers.
pub fn visible_count(questions: &[QuestionDefinition], answers: &AnswerMap) -> usize {
    questions
        .iter()
        .filter(|question| question.is_visible(answers))
        .count()
}
