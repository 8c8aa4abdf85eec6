use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, warn};

use assessment_spec::{
    Action, AssessmentSpec, ContactInfo, QuestionnaireController, RenderPayload, RenderStatus,
    SessionSnapshot, SpecError, TemplateEngine, TemplateError, Transition, build_render_payload,
    render_card as spec_render_card, render_json_ui as spec_render_json_ui,
    render_text as spec_render_text, submission_schema as spec_submission_schema,
    validate_contact as spec_validate_contact,
};

#[derive(Debug, Error)]
enum ComponentError {
    #[error("failed to parse config: {0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("invalid assessment spec: {0}")]
    Spec(#[from] SpecError),
    #[error("failed to parse session: {0}")]
    SessionParse(#[source] serde_json::Error),
    #[error("failed to parse action: {0}")]
    ActionParse(#[source] serde_json::Error),
    #[error("failed to parse contact: {0}")]
    ContactParse(#[source] serde_json::Error),
    #[error("json encode error: {0}")]
    JsonEncode(#[source] serde_json::Error),
    #[error(transparent)]
    Template(#[from] TemplateError),
}

#[derive(Debug, Deserialize, Serialize, Default)]
struct ComponentConfig {
    #[serde(default)]
    assessment_spec_json: Option<String>,
}

fn load_spec(config_json: &str) -> Result<AssessmentSpec, ComponentError> {
    let config = if config_json.trim().is_empty() {
        ComponentConfig::default()
    } else {
        serde_json::from_str(config_json).map_err(ComponentError::ConfigParse)?
    };

    match config.assessment_spec_json.as_deref() {
        Some(raw) => Ok(AssessmentSpec::from_json(raw)?),
        None => Ok(AssessmentSpec::bundled()?),
    }
}

fn parse_session(session_json: &str) -> Result<SessionSnapshot, ComponentError> {
    if session_json.trim().is_empty() {
        return Ok(SessionSnapshot::default());
    }
    serde_json::from_str(session_json).map_err(ComponentError::SessionParse)
}

fn load_controller(
    config_json: &str,
    session_json: &str,
) -> Result<QuestionnaireController, ComponentError> {
    let spec = load_spec(config_json)?;
    let snapshot = parse_session(session_json)?;
    Ok(QuestionnaireController::restore(spec, snapshot))
}

fn respond(result: Result<Value, ComponentError>) -> String {
    match result {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|error| {
            json!({"error": format!("json encode: {}", error)}).to_string()
        }),
        Err(err) => {
            warn!(error = %err, "component call failed");
            json!({ "error": err.to_string() }).to_string()
        }
    }
}

fn respond_string(result: Result<String, ComponentError>) -> String {
    match result {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "component call failed");
            json!({ "error": err.to_string() }).to_string()
        }
    }
}

fn render_payload(controller: &QuestionnaireController) -> Result<RenderPayload, ComponentError> {
    Ok(build_render_payload(controller, &TemplateEngine::new())?)
}

fn session_response(
    controller: &QuestionnaireController,
    transition: Option<&Transition>,
) -> Result<Value, ComponentError> {
    let session =
        serde_json::to_value(controller.snapshot()).map_err(ComponentError::JsonEncode)?;
    let mut response = match render_payload(controller) {
        Ok(payload) => json!({
            "status": payload.status.as_str(),
            "session": session,
            "view": spec_render_json_ui(&payload),
        }),
        Err(err) => {
            // The session still advanced; only the message text is lost.
            warn!(error = %err, "view failed to render");
            let status = if controller.is_complete() {
                RenderStatus::Complete
            } else {
                RenderStatus::NeedInput
            };
            json!({
                "status": status.as_str(),
                "session": session,
                "view": Value::Null,
                "view_error": err.to_string(),
            })
        }
    };

    if let Some(transition) = transition {
        response["transition"] = Value::String(transition.as_str().into());
        match transition {
            Transition::Rejected(errors) => {
                response["errors"] =
                    serde_json::to_value(errors).map_err(ComponentError::JsonEncode)?;
            }
            Transition::Completed(submission) => {
                response["submission"] =
                    serde_json::to_value(submission).map_err(ComponentError::JsonEncode)?;
            }
            Transition::Moved(_) | Transition::Unchanged => {}
        }
    }

    Ok(response)
}

/// Returns the effective assessment spec.
pub fn describe(config_json: &str) -> String {
    respond(load_spec(config_json).and_then(|spec| {
        serde_json::to_value(spec).map_err(ComponentError::JsonEncode)
    }))
}

/// Validates a contact details document without a session.
pub fn validate_contact(contact_json: &str) -> String {
    respond(
        serde_json::from_str::<ContactInfo>(contact_json)
            .map_err(ComponentError::ContactParse)
            .and_then(|contact| {
                let errors = spec_validate_contact(&contact);
                Ok(json!({
                    "valid": errors.is_empty(),
                    "errors": serde_json::to_value(&errors).map_err(ComponentError::JsonEncode)?,
                }))
            }),
    )
}

/// Opens a fresh session.
pub fn start(config_json: &str) -> String {
    respond(
        load_controller(config_json, "")
            .and_then(|controller| session_response(&controller, None)),
    )
}

/// Applies one action to a session and returns the updated snapshot. The
/// `submission` member is only present on the call that completes the
/// questionnaire.
pub fn dispatch(config_json: &str, session_json: &str, action_json: &str) -> String {
    respond(load_controller(config_json, session_json).and_then(|mut controller| {
        let action: Action =
            serde_json::from_str(action_json).map_err(ComponentError::ActionParse)?;
        debug!(?action, "dispatching");
        let transition = controller.dispatch(action);
        session_response(&controller, Some(&transition))
    }))
}

pub fn render_text(config_json: &str, session_json: &str) -> String {
    respond_string(
        load_controller(config_json, session_json)
            .and_then(|controller| render_payload(&controller))
            .map(|payload| spec_render_text(&payload)),
    )
}

pub fn render_json_ui(config_json: &str, session_json: &str) -> String {
    respond(
        load_controller(config_json, session_json)
            .and_then(|controller| render_payload(&controller))
            .map(|payload| spec_render_json_ui(&payload)),
    )
}

pub fn render_card(config_json: &str, session_json: &str) -> String {
    respond(
        load_controller(config_json, session_json)
            .and_then(|controller| render_payload(&controller))
            .map(|payload| spec_render_card(&payload)),
    )
}

/// JSON Schema of the submission handed over on completion.
pub fn submission_schema() -> String {
    respond(Ok(spec_submission_schema()))
}
