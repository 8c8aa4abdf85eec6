use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::answers::{AnswerMap, Submission, ValidationErrors};
use crate::progress::{
    NavigationState, Step, last_index, next_visible, previous_visible, visible_count,
};
use crate::spec::assessment::AssessmentSpec;
use crate::spec::contact::{ContactField, ContactInfo};
use crate::spec::question::QuestionDefinition;
use crate::validate::validate_contact;

/// Discrete input delivered by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    SetField { field: ContactField, value: String },
    Answer { key: String, option: String },
    Next,
    Back,
}

/// Result of applying one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// State changed; carries the navigation position afterwards.
    Moved(NavigationState),
    /// Nothing changed (no-op or ignored input).
    Unchanged,
    /// Contact form validation blocked the step change.
    Rejected(ValidationErrors),
    /// The questionnaire finished; emitted exactly once.
    Completed(Submission),
}

impl Transition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Moved(_) => "moved",
            Transition::Unchanged => "unchanged",
            Transition::Rejected(_) => "rejected",
            Transition::Completed(_) => "completed",
        }
    }
}

/// The question on screen, with its position among visible questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveQuestion<'a> {
    pub index: usize,
    pub position: usize,
    pub total: usize,
    pub definition: &'a QuestionDefinition,
    pub selected: Option<&'a str>,
    /// Next submits instead of moving on.
    pub is_last: bool,
}

/// What the presentation layer should show right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View<'a> {
    ContactForm {
        contact: &'a ContactInfo,
        errors: &'a ValidationErrors,
    },
    Interstitial,
    Question(ActiveQuestion<'a>),
    /// Questionnaire step with nothing left to ask; Next submits.
    ReadyToSubmit,
    Complete,
}

/// Serializable copy of a controller's mutable state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SessionSnapshot {
    #[serde(default)]
    pub navigation: NavigationState,
    #[serde(default)]
    pub contact: ContactInfo,
    #[serde(default)]
    pub answers: AnswerMap,
    #[serde(default)]
    pub errors: ValidationErrors,
    #[serde(default)]
    pub completed: bool,
}

/// Step and question navigation for one respondent.
#[derive(Debug, Clone)]
pub struct QuestionnaireController {
    spec: AssessmentSpec,
    navigation: NavigationState,
    contact: ContactInfo,
    answers: AnswerMap,
    errors: ValidationErrors,
    completed: bool,
}

impl QuestionnaireController {
    pub fn new(spec: AssessmentSpec) -> Self {
        Self {
            spec,
            navigation: NavigationState::default(),
            contact: ContactInfo::default(),
            answers: AnswerMap::new(),
            errors: ValidationErrors::new(),
            completed: false,
        }
    }

    /// Rebuilds a controller from a snapshot, repairing any position the
    /// state machine could not have reached on its own.
    pub fn restore(spec: AssessmentSpec, snapshot: SessionSnapshot) -> Self {
        let mut controller = Self {
            spec,
            navigation: snapshot.navigation,
            contact: snapshot.contact,
            answers: snapshot.answers,
            errors: snapshot.errors,
            completed: snapshot.completed,
        };

        if controller.navigation.step != Step::ContactForm
            && !validate_contact(&controller.contact).is_empty()
        {
            warn!(
                step = controller.navigation.step.as_str(),
                "snapshot contact details are invalid; returning to contact form"
            );
            controller.navigation = NavigationState::default();
        }
        if controller.navigation.step != Step::Questionnaire {
            controller.navigation.question_index = 0;
            controller.completed = false;
        }
        controller.prune_foreign_answers();
        let len = controller.active_questions().len();
        if controller.navigation.question_index > len {
            controller.navigation.question_index = len;
        }
        controller.resolve_active_question();
        controller
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            navigation: self.navigation,
            contact: self.contact.clone(),
            answers: self.answers.clone(),
            errors: self.errors.clone(),
            completed: self.completed,
        }
    }

    pub fn spec(&self) -> &AssessmentSpec {
        &self.spec
    }

    pub fn navigation(&self) -> NavigationState {
        self.navigation
    }

    pub fn step(&self) -> Step {
        self.navigation.step
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// Back is offered everywhere except the first step and after completion.
    pub fn can_retreat(&self) -> bool {
        !self.completed && !self.navigation.is_initial()
    }

    /// Question list selected by the current gender.
    pub fn active_questions(&self) -> &[QuestionDefinition] {
        self.spec.questions_for(self.contact.gender)
    }

    pub fn dispatch(&mut self, action: Action) -> Transition {
        match action {
            Action::SetField { field, value } => {
                if self.update_contact_field(field, &value) {
                    Transition::Moved(self.navigation)
                } else {
                    Transition::Unchanged
                }
            }
            Action::Answer { key, option } => {
                if self.update_answer(&key, &option) {
                    Transition::Moved(self.navigation)
                } else {
                    Transition::Unchanged
                }
            }
            Action::Next => self.advance(),
            Action::Back => self.retreat(),
        }
    }

    /// Overwrites a contact field. Only accepted on the contact form step;
    /// previously computed errors are left untouched.
    pub fn update_contact_field(&mut self, field: ContactField, value: &str) -> bool {
        if self.completed || self.navigation.step != Step::ContactForm {
            warn!(
                field = field.as_str(),
                step = self.navigation.step.as_str(),
                "ignoring contact edit outside the contact form"
            );
            return false;
        }
        self.contact.set(field, value);
        true
    }

    /// Records the selected option for the question on screen. Keys other
    /// than the current question's, and undeclared options, are ignored.
    pub fn update_answer(&mut self, key: &str, option: &str) -> bool {
        if self.completed || self.navigation.step != Step::Questionnaire {
            warn!(
                key,
                step = self.navigation.step.as_str(),
                "ignoring answer outside the questionnaire"
            );
            return false;
        }
        let Some(question) = self.active_questions().get(self.navigation.question_index) else {
            warn!(key, "ignoring answer with no active question");
            return false;
        };
        if question.key != key {
            warn!(
                key,
                active = question.key.as_str(),
                "ignoring answer for a question that is not active"
            );
            return false;
        }
        if !question.has_option(option) {
            warn!(key, option, "ignoring undeclared option");
            return false;
        }
        if let Some(previous) = self.answers.set(key, option) {
            debug!(key, previous = previous.as_str(), option, "answer replaced");
        } else {
            debug!(key, option, "answer recorded");
        }
        self.resolve_active_question();
        true
    }

    /// Recomputes and stores the contact errors; true when there are none.
    pub fn validate_contact_form(&mut self) -> bool {
        self.errors = validate_contact(&self.contact);
        self.errors.is_empty()
    }

    /// Moves forward from the current step.
    pub fn advance(&mut self) -> Transition {
        if self.completed {
            return Transition::Unchanged;
        }
        match self.navigation.step {
            Step::ContactForm => {
                if !self.validate_contact_form() {
                    debug!(errors = self.errors.len(), "contact form rejected");
                    return Transition::Rejected(self.errors.clone());
                }
                self.prune_foreign_answers();
                self.navigation = NavigationState {
                    step: Step::Interstitial,
                    question_index: 0,
                };
            }
            Step::Interstitial => {
                self.navigation = NavigationState {
                    step: Step::Questionnaire,
                    question_index: 0,
                };
                self.resolve_active_question();
            }
            Step::Questionnaire => {
                let index = self.navigation.question_index;
                match last_index(self.active_questions()) {
                    Some(last) if index < last => {
                        self.navigation.question_index = index + 1;
                        self.resolve_active_question();
                        if self.navigation.question_index >= self.active_questions().len() {
                            return self.complete();
                        }
                    }
                    _ => return self.complete(),
                }
            }
        }
        debug!(
            step = self.navigation.step.as_str(),
            index = self.navigation.question_index,
            "advanced"
        );
        Transition::Moved(self.navigation)
    }

    /// Moves backward from the current step; a no-op on the contact form.
    pub fn retreat(&mut self) -> Transition {
        if !self.can_retreat() {
            return Transition::Unchanged;
        }
        match self.navigation.step {
            Step::ContactForm => return Transition::Unchanged,
            Step::Interstitial => {
                self.navigation = NavigationState::default();
            }
            Step::Questionnaire => {
                let previous = previous_visible(
                    self.active_questions(),
                    self.navigation.question_index,
                    &self.answers,
                );
                match previous {
                    Some(index) => self.navigation.question_index = index,
                    None => {
                        self.navigation = NavigationState {
                            step: Step::Interstitial,
                            question_index: 0,
                        };
                    }
                }
            }
        }
        debug!(
            step = self.navigation.step.as_str(),
            index = self.navigation.question_index,
            "retreated"
        );
        Transition::Moved(self.navigation)
    }

    /// Moves the question index forward past questions whose display
    /// condition does not hold. Never moves backward; repeated calls are
    /// no-ops. Run after every index or answer change so that reads stay
    /// side-effect free.
    pub fn resolve_active_question(&mut self) {
        if self.navigation.step != Step::Questionnaire {
            return;
        }
        let from = self.navigation.question_index;
        let resolved = next_visible(self.active_questions(), from, &self.answers);
        if resolved != from {
            debug!(from, to = resolved, "auto-skipped hidden questions");
            self.navigation.question_index = resolved;
        }
    }

    /// The question on screen, or `None` outside the questionnaire or once
    /// the list is exhausted.
    pub fn current_question(&self) -> Option<ActiveQuestion<'_>> {
        if self.completed || self.navigation.step != Step::Questionnaire {
            return None;
        }
        let questions = self.active_questions();
        let index = self.navigation.question_index;
        let definition = questions.get(index)?;
        Some(ActiveQuestion {
            index,
            position: visible_count(&questions[..index], &self.answers) + 1,
            total: visible_count(questions, &self.answers),
            definition,
            selected: self.answers.get(&definition.key),
            is_last: next_visible(questions, index + 1, &self.answers) >= questions.len(),
        })
    }

    pub fn view(&self) -> View<'_> {
        if self.completed {
            return View::Complete;
        }
        match self.navigation.step {
            Step::ContactForm => View::ContactForm {
                contact: &self.contact,
                errors: &self.errors,
            },
            Step::Interstitial => View::Interstitial,
            Step::Questionnaire => match self.current_question() {
                Some(question) => View::Question(question),
                None => View::ReadyToSubmit,
            },
        }
    }

    /// Collected data: the contact details plus answers to questions that
    /// are visible for the final answer set.
    pub fn submission(&self) -> Submission {
        let questions = self.active_questions();
        let mut answers = self.answers.clone();
        answers.retain_keys(|key| {
            questions
                .iter()
                .any(|question| question.key == key && question.is_visible(&self.answers))
        });
        Submission {
            assessment_id: self.spec.id.clone(),
            version: self.spec.version.clone(),
            contact: self.contact.clone(),
            answers,
        }
    }

    fn complete(&mut self) -> Transition {
        self.completed = true;
        let submission = self.submission();
        info!(
            assessment = self.spec.id.as_str(),
            answers = submission.answers.len(),
            "questionnaire complete"
        );
        Transition::Completed(submission)
    }

    fn prune_foreign_answers(&mut self) {
        let questions = self.spec.questions_for(self.contact.gender);
        let before = self.answers.len();
        self.answers
            .retain_keys(|key| questions.iter().any(|question| question.key == key));
        if self.answers.len() != before {
            debug!(
                dropped = before - self.answers.len(),
                "dropped answers from another question list"
            );
        }
    }
}
