use serde_json::{Map, Value, json};

use crate::{
    controller::{QuestionnaireController, View},
    progress::Step,
    spec::contact::{ContactField, Gender},
    template::{TemplateContext, TemplateEngine, TemplateError},
};

/// Status labels returned by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// More input is required.
    NeedInput,
    /// The questionnaire has been submitted.
    Complete,
}

impl RenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStatus::NeedInput => "need_input",
            RenderStatus::Complete => "complete",
        }
    }
}

/// Progress counters over the visible questions.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderProgress {
    pub answered: usize,
    pub total: usize,
}

/// One contact form input.
#[derive(Debug, Clone)]
pub struct RenderField {
    pub field: ContactField,
    pub label: String,
    pub value: String,
    pub error: Option<String>,
}

/// The question on screen.
#[derive(Debug, Clone)]
pub struct RenderQuestion {
    pub key: String,
    pub text: String,
    pub options: Vec<String>,
    pub selected: Option<String>,
    pub position: usize,
    pub total: usize,
}

/// Collected payload used by every renderer.
#[derive(Debug, Clone)]
pub struct RenderPayload {
    pub assessment_id: String,
    pub title: String,
    pub version: String,
    pub status: RenderStatus,
    pub step: Step,
    pub message: Option<String>,
    pub fields: Vec<RenderField>,
    pub question: Option<RenderQuestion>,
    pub progress: RenderProgress,
    pub can_go_back: bool,
    /// Label of the forward button; `None` once submitted.
    pub next_label: Option<&'static str>,
}

/// Build the renderer payload from the controller's current view.
pub fn build_render_payload(
    controller: &QuestionnaireController,
    templates: &TemplateEngine,
) -> Result<RenderPayload, TemplateError> {
    let spec = controller.spec();
    let ctx = TemplateContext {
        title: &spec.title,
        contact: controller.contact(),
        answers: controller.answers(),
    };
    let presentation = &spec.presentation;

    let mut payload = RenderPayload {
        assessment_id: spec.id.clone(),
        title: spec.title.clone(),
        version: spec.version.clone(),
        status: RenderStatus::NeedInput,
        step: controller.step(),
        message: None,
        fields: Vec::new(),
        question: None,
        progress: RenderProgress::default(),
        can_go_back: controller.can_retreat(),
        next_label: Some("Next"),
    };

    if controller.step() == Step::Questionnaire {
        let answers = controller.answers();
        let visible = controller
            .active_questions()
            .iter()
            .filter(|question| question.is_visible(answers))
            .collect::<Vec<_>>();
        payload.progress = RenderProgress {
            answered: visible
                .iter()
                .filter(|question| answers.contains(&question.key))
                .count(),
            total: visible.len(),
        };
    }

    match controller.view() {
        View::ContactForm { contact, errors } => {
            payload.message = Some(templates.render(&presentation.greeting, &ctx)?);
            payload.fields = ContactField::ALL
                .into_iter()
                .map(|field| RenderField {
                    field,
                    label: field.label().to_string(),
                    value: contact.get(field).to_string(),
                    error: errors.get(field).map(str::to_string),
                })
                .collect();
        }
        View::Interstitial => {
            payload.message = Some(templates.render(&presentation.acknowledgement, &ctx)?);
        }
        View::Question(question) => {
            if question.is_last {
                payload.next_label = Some("Submit");
            }
            payload.question = Some(RenderQuestion {
                key: question.definition.key.clone(),
                text: question.definition.text.clone(),
                options: question.definition.options.clone(),
                selected: question.selected.map(str::to_string),
                position: question.position,
                total: question.total,
            });
        }
        View::ReadyToSubmit => {
            payload.next_label = Some("Submit");
        }
        View::Complete => {
            payload.status = RenderStatus::Complete;
            payload.next_label = None;
            payload.message = Some(templates.render(&presentation.completion, &ctx)?);
        }
    }

    Ok(payload)
}

/// Render the payload as a structured JSON-friendly value.
pub fn render_json_ui(payload: &RenderPayload) -> Value {
    let fields = payload
        .fields
        .iter()
        .map(|field| {
            let mut map = Map::new();
            map.insert("field".into(), Value::String(field.field.as_str().into()));
            map.insert("label".into(), Value::String(field.label.clone()));
            map.insert("value".into(), Value::String(field.value.clone()));
            if let Some(error) = &field.error {
                map.insert("error".into(), Value::String(error.clone()));
            }
            if field.field == ContactField::Gender {
                map.insert(
                    "choices".into(),
                    json!(Gender::ALL.map(|gender| gender.as_str())),
                );
            }
            Value::Object(map)
        })
        .collect::<Vec<_>>();

    let question = payload.question.as_ref().map(|question| {
        json!({
            "key": question.key,
            "text": question.text,
            "options": question.options,
            "selected": question.selected,
            "position": question.position,
            "total": question.total,
        })
    });

    json!({
        "assessment_id": payload.assessment_id,
        "title": payload.title,
        "version": payload.version,
        "status": payload.status.as_str(),
        "step": payload.step.as_str(),
        "message": payload.message,
        "fields": fields,
        "question": question,
        "progress": {
            "answered": payload.progress.answered,
            "total": payload.progress.total,
        },
        "can_go_back": payload.can_go_back,
        "next_label": payload.next_label,
    })
}

/// Render the payload as human-friendly text.
pub fn render_text(payload: &RenderPayload) -> String {
    let mut lines = Vec::new();
    lines.push(payload.title.clone());
    if let Some(message) = &payload.message {
        lines.push(message.clone());
    }

    for field in &payload.fields {
        let mut entry = format!(" - {}: {}", field.label, field.value);
        if let Some(error) = &field.error {
            entry.push_str(&format!(" ({})", error));
        }
        lines.push(entry);
    }

    if let Some(question) = &payload.question {
        lines.push(format!(
            "Question {}/{}: {}",
            question.position, question.total, question.text
        ));
        for (idx, option) in question.options.iter().enumerate() {
            let marker = if question.selected.as_deref() == Some(option.as_str()) {
                "(x)"
            } else {
                "( )"
            };
            lines.push(format!("  {} {}. {}", marker, idx + 1, option));
        }
    } else if payload.step == Step::Questionnaire && payload.status == RenderStatus::NeedInput {
        lines.push("No further questions. Choose Submit to finish.".to_string());
    }

    let mut controls = Vec::new();
    if payload.can_go_back {
        controls.push("Back");
    }
    if let Some(label) = payload.next_label {
        controls.push(label);
    }
    if !controls.is_empty() {
        lines.push(format!("[{}]", controls.join("] [")));
    }

    lines.join("\n")
}

/// Render the payload as an Adaptive Card v1.3 transport.
pub fn render_card(payload: &RenderPayload) -> Value {
    let mut body = Vec::new();

    body.push(json!({
        "type": "TextBlock",
        "text": payload.title,
        "weight": "Bolder",
        "size": "Large",
        "wrap": true,
    }));

    if let Some(message) = &payload.message {
        body.push(json!({
            "type": "TextBlock",
            "text": message,
            "wrap": true,
        }));
    }

    for field in &payload.fields {
        body.push(field_input(field));
        if let Some(error) = &field.error {
            body.push(json!({
                "type": "TextBlock",
                "text": error,
                "color": "Attention",
                "size": "Small",
                "wrap": true,
                "spacing": "None",
            }));
        }
    }

    if let Some(question) = &payload.question {
        let choices = question
            .options
            .iter()
            .map(|option| json!({ "title": option, "value": option }))
            .collect::<Vec<_>>();
        let mut input = Map::new();
        input.insert("type".into(), Value::String("Input.ChoiceSet".into()));
        input.insert("id".into(), Value::String(question.key.clone()));
        input.insert("style".into(), Value::String("expanded".into()));
        input.insert("isRequired".into(), Value::Bool(true));
        input.insert("choices".into(), Value::Array(choices));
        if let Some(selected) = &question.selected {
            input.insert("value".into(), Value::String(selected.clone()));
        }
        body.push(json!({
            "type": "Container",
            "items": [
                {
                    "type": "TextBlock",
                    "text": question.text,
                    "weight": "Bolder",
                    "wrap": true,
                },
                Value::Object(input),
            ],
        }));
    }

    let mut actions = Vec::new();
    if payload.can_go_back {
        actions.push(json!({
            "type": "Action.Submit",
            "title": "Back",
            "data": { "assessment": { "id": payload.assessment_id, "action": "back" } }
        }));
    }
    if let Some(label) = payload.next_label {
        actions.push(json!({
            "type": "Action.Submit",
            "title": label,
            "data": { "assessment": { "id": payload.assessment_id, "action": "next" } }
        }));
    }

    json!({
        "$schema": "http://adaptivecards.io/schemas/adaptive-card.json",
        "type": "AdaptiveCard",
        "version": "1.3",
        "body": body,
        "actions": actions,
    })
}

fn field_input(field: &RenderField) -> Value {
    let mut map = Map::new();
    map.insert("id".into(), Value::String(field.field.as_str().into()));
    map.insert("label".into(), Value::String(field.label.clone()));
    map.insert("isRequired".into(), Value::Bool(true));
    match field.field {
        ContactField::Gender => {
            map.insert("type".into(), Value::String("Input.ChoiceSet".into()));
            map.insert("style".into(), Value::String("compact".into()));
            map.insert(
                "choices".into(),
                Value::Array(
                    Gender::ALL
                        .iter()
                        .map(|gender| json!({ "title": gender.as_str(), "value": gender.as_str() }))
                        .collect(),
                ),
            );
        }
        ContactField::Age => {
            map.insert("type".into(), Value::String("Input.Number".into()));
            map.insert("min".into(), json!(crate::validate::MINIMUM_AGE));
        }
        ContactField::Email => {
            map.insert("type".into(), Value::String("Input.Text".into()));
            map.insert("style".into(), Value::String("Email".into()));
        }
        ContactField::Phone => {
            map.insert("type".into(), Value::String("Input.Text".into()));
            map.insert("style".into(), Value::String("Tel".into()));
        }
        ContactField::Name => {
            map.insert("type".into(), Value::String("Input.Text".into()));
        }
    }
    if !field.value.is_empty() {
        map.insert("value".into(), Value::String(field.value.clone()));
    }
    Value::Object(map)
}
