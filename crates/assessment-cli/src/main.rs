mod wizard;

use assessment_component::{dispatch, submission_schema, validate_contact};
use assessment_spec::{
    AssessmentSpec, ContactField, QuestionnaireController, RenderPayload, RenderQuestion, Step,
    TemplateEngine, Transition, build_render_payload, render_card, render_json_ui,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{Value, json};
use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use wizard::{AnswerParseError, Verbosity, WizardPresenter};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

const SPEC_ENV: &str = "SELF_ASSESSMENT_SPEC";

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Self assessment questionnaire CLI",
    long_about = "Runs the self assessment wizard, steps serialized sessions and validates contact details"
)]
struct Cli {
    /// Show verbose output (step status, parse expectations, debug logs).
    #[arg(long, alias = "debug", global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RenderMode {
    Text,
    Card,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Run the questionnaire interactively.
    Run {
        /// Assessment spec JSON (defaults to SELF_ASSESSMENT_SPEC or the bundled questionnaire).
        #[arg(long, value_name = "SPEC")]
        spec: Option<PathBuf>,
        /// Also print the submission as JSON on completion.
        #[arg(long)]
        answers_json: bool,
        /// Extra render output printed for every screen.
        #[arg(long, value_enum, default_value_t = RenderMode::Text)]
        format: RenderMode,
        /// Write the submission JSON to this file on completion.
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Apply a single action to a session file.
    Step {
        /// Session snapshot JSON; created when missing and rewritten after the step.
        #[arg(long, value_name = "SESSION")]
        session: PathBuf,
        /// Action JSON, e.g. {"type": "next"}.
        #[arg(long, value_name = "ACTION")]
        action: String,
        /// Assessment spec JSON (defaults to SELF_ASSESSMENT_SPEC or the bundled questionnaire).
        #[arg(long, value_name = "SPEC")]
        spec: Option<PathBuf>,
    },
    /// Validate a contact details JSON file.
    Validate {
        #[arg(long, value_name = "CONTACT")]
        contact: PathBuf,
    },
    /// Print the JSON Schema of the submission.
    Schema,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Command::Run {
            spec,
            answers_json,
            format,
            output,
        } => {
            let spec = load_spec(spec.as_deref())?;
            let stdin = io::stdin();
            let mut input = stdin.lock();
            run_wizard(
                spec,
                &mut input,
                Verbosity::from_verbose(cli.verbose),
                answers_json,
                format,
                output.as_deref(),
            )
        }
        Command::Step {
            session,
            action,
            spec,
        } => run_step(&session, &action, spec.as_deref()),
        Command::Validate { contact } => run_validate(&contact),
        Command::Schema => run_schema(),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn resolve_spec_path(path: Option<&Path>) -> Option<PathBuf> {
    path.map(Path::to_path_buf)
        .or_else(|| env::var_os(SPEC_ENV).map(PathBuf::from))
        .filter(|path| !path.as_os_str().is_empty())
}

fn load_spec(path: Option<&Path>) -> CliResult<AssessmentSpec> {
    match resolve_spec_path(path) {
        Some(path) => {
            debug!(path = %path.display(), "loading assessment spec");
            let contents = fs::read_to_string(&path)?;
            Ok(AssessmentSpec::from_json(&contents)?)
        }
        None => Ok(AssessmentSpec::bundled()?),
    }
}

fn component_config(path: Option<&Path>) -> CliResult<String> {
    match resolve_spec_path(path) {
        Some(path) => {
            let contents = fs::read_to_string(path)?;
            Ok(json!({ "assessment_spec_json": contents }).to_string())
        }
        None => Ok(String::new()),
    }
}

fn parse_component_result(response: &str) -> CliResult<Value> {
    let value: Value = serde_json::from_str(response)?;
    if let Some(error) = value.get("error").and_then(Value::as_str) {
        Err(error.into())
    } else {
        Ok(value)
    }
}

/// One line of wizard input.
#[derive(Debug, PartialEq, Eq)]
enum WizardInput {
    Back,
    Exit,
    Value(String),
}

fn parse_input(raw: &str) -> WizardInput {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("exit") {
        WizardInput::Exit
    } else if trimmed.eq_ignore_ascii_case("back") {
        WizardInput::Back
    } else {
        WizardInput::Value(trimmed.to_string())
    }
}

fn read_input(
    input: &mut dyn BufRead,
    prompt: &str,
    default: Option<&str>,
) -> CliResult<WizardInput> {
    match default.filter(|value| !value.is_empty()) {
        Some(default_value) => print!("{} [{}]: ", prompt, default_value),
        None => print!("{}: ", prompt),
    }
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err("input ended before the questionnaire was complete".into());
    }
    let parsed = parse_input(&line);
    match (parsed, default) {
        (WizardInput::Value(value), Some(default_value)) if value.is_empty() => {
            Ok(WizardInput::Value(default_value.to_string()))
        }
        (parsed, _) => Ok(parsed),
    }
}

fn field_hint(field: ContactField) -> Option<&'static str> {
    match field {
        ContactField::Email => Some("(name@example.com)"),
        ContactField::Phone => Some("(10 digits)"),
        ContactField::Age => Some("(18 or older)"),
        ContactField::Gender => Some("(Male/Female)"),
        ContactField::Name => None,
    }
}

/// Maps an option number or option text onto the declared option.
fn parse_choice(question: &RenderQuestion, raw: &str) -> Result<String, AnswerParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return question
            .selected
            .clone()
            .ok_or_else(|| AnswerParseError::new("This question requires an answer.", None));
    }

    if let Ok(number) = trimmed.parse::<usize>() {
        return number
            .checked_sub(1)
            .and_then(|index| question.options.get(index))
            .cloned()
            .ok_or_else(|| {
                AnswerParseError::new(
                    format!("Choose a number between 1 and {}.", question.options.len()),
                    Some(format!("option numbers 1..={}", question.options.len())),
                )
            });
    }

    question
        .options
        .iter()
        .find(|option| option.eq_ignore_ascii_case(trimmed))
        .cloned()
        .ok_or_else(|| {
            AnswerParseError::new(
                format!("Choose one of: {}.", question.options.join(", ")),
                Some(format!("allowed values: {}", question.options.join(", "))),
            )
        })
}

fn run_wizard(
    spec: AssessmentSpec,
    input: &mut dyn BufRead,
    verbosity: Verbosity,
    answers_json: bool,
    format: RenderMode,
    output: Option<&Path>,
) -> CliResult<()> {
    let templates = TemplateEngine::new();
    let mut controller = QuestionnaireController::new(spec);
    let mut presenter = WizardPresenter::new(verbosity, answers_json);

    loop {
        let payload = build_render_payload(&controller, &templates)?;
        presenter.show_header(&payload);
        presenter.show_status(&payload);
        print_render_output(format, &payload);

        let transition = match payload.step {
            Step::ContactForm => {
                presenter.show_message(&payload);
                let errors_pending = !controller.errors().is_empty();
                let mut aborted = false;
                for field in &payload.fields {
                    if errors_pending && field.error.is_none() {
                        continue;
                    }
                    let prompt = presenter.field_prompt(field, field_hint(field.field));
                    match read_input(input, &prompt, Some(&field.value))? {
                        WizardInput::Exit => {
                            aborted = true;
                            break;
                        }
                        WizardInput::Back => {
                            presenter.show_note("Already at the first step.");
                        }
                        WizardInput::Value(value) => {
                            controller.update_contact_field(field.field, &value);
                        }
                    }
                }
                if aborted {
                    return Err("wizard aborted by user".into());
                }
                controller.advance()
            }
            Step::Interstitial => {
                presenter.show_message(&payload);
                match read_input(input, "Press Enter to continue", None)? {
                    WizardInput::Exit => return Err("wizard aborted by user".into()),
                    WizardInput::Back => controller.retreat(),
                    WizardInput::Value(_) => controller.advance(),
                }
            }
            Step::Questionnaire => match &payload.question {
                Some(question) => {
                    presenter.show_question(question);
                    match read_input(input, ">", None)? {
                        WizardInput::Exit => return Err("wizard aborted by user".into()),
                        WizardInput::Back => controller.retreat(),
                        WizardInput::Value(raw) => match parse_choice(question, &raw) {
                            Ok(option) => {
                                controller.update_answer(&question.key, &option);
                                controller.advance()
                            }
                            Err(err) => {
                                presenter.show_parse_error(&err);
                                Transition::Unchanged
                            }
                        },
                    }
                }
                None => {
                    presenter.show_ready_to_submit();
                    match read_input(input, ">", None)? {
                        WizardInput::Exit => return Err("wizard aborted by user".into()),
                        WizardInput::Back => controller.retreat(),
                        WizardInput::Value(_) => controller.advance(),
                    }
                }
            },
        };

        match transition {
            Transition::Rejected(errors) => presenter.show_validation_errors(&errors),
            Transition::Completed(submission) => {
                if let Some(path) = output {
                    fs::write(path, submission.to_json_pretty()?)?;
                    info!(path = %path.display(), "submission written");
                }
                let message = completion_message(&controller, &templates);
                presenter.show_completion(&submission, Some(&message));
                return Ok(());
            }
            Transition::Moved(_) | Transition::Unchanged => {}
        }
    }
}

/// Rendered completion text; the raw template when rendering fails, since the
/// submission has already been handed over.
fn completion_message(
    controller: &QuestionnaireController,
    templates: &TemplateEngine,
) -> String {
    match build_render_payload(controller, templates) {
        Ok(payload) => payload.message.unwrap_or_default(),
        Err(err) => {
            warn!(error = %err, "completion message failed to render");
            controller.spec().presentation.completion.clone()
        }
    }
}

fn print_render_output(mode: RenderMode, payload: &RenderPayload) {
    match mode {
        RenderMode::Text => {}
        RenderMode::Card => {
            println!("Adaptive card:\n{}", render_card(payload));
        }
        RenderMode::Json => {
            println!("JSON UI:\n{}", render_json_ui(payload));
        }
    }
}

fn run_step(session_path: &Path, action: &str, spec: Option<&Path>) -> CliResult<()> {
    let config_json = component_config(spec)?;
    let session_json = if session_path.exists() {
        fs::read_to_string(session_path)?
    } else {
        String::new()
    };

    let response =
        parse_component_result(&dispatch(&config_json, &session_json, action))?;
    fs::write(
        session_path,
        serde_json::to_string_pretty(&response["session"])?,
    )?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn run_validate(contact_path: &Path) -> CliResult<()> {
    let contact_json = fs::read_to_string(contact_path)?;
    let result = parse_component_result(&validate_contact(&contact_json))?;
    let valid = result["valid"].as_bool().unwrap_or(false);
    println!(
        "Contact details: {}",
        if valid { "valid" } else { "invalid" }
    );
    if let Some(errors) = result["errors"].as_object() {
        for (field, message) in errors {
            println!("  {}: {}", field, message.as_str().unwrap_or_default());
        }
    }

    if valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn run_schema() -> CliResult<()> {
    let schema = parse_component_result(&submission_schema())?;
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
