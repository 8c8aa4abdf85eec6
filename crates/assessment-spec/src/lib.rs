pub mod answers;
pub mod controller;
pub mod expr;
pub mod progress;
pub mod render;
pub mod spec;
pub mod template;
pub mod validate;

pub use answers::{AnswerMap, Submission, SubmissionError, ValidationErrors, submission_schema};
pub use controller::{
    Action, ActiveQuestion, QuestionnaireController, SessionSnapshot, Transition, View,
};
pub use expr::Expr;
pub use progress::{NavigationState, Step};
pub use render::{
    RenderField, RenderPayload, RenderProgress, RenderQuestion, RenderStatus,
    build_render_payload, render_card, render_json_ui, render_text,
};
pub use spec::{
    AssessmentSpec, ContactField, ContactInfo, Gender, Presentation, QuestionBank,
    QuestionDefinition, SpecError,
};
pub use template::{TemplateContext, TemplateEngine, TemplateError};
pub use validate::{validate_contact, validate_spec};
