use std::fmt::Write;

use assessment_spec::{
    RenderField, RenderPayload, RenderQuestion, Step, Submission, ValidationErrors,
};

/// Controls which bits of state the wizard prints.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Verbosity {
    /// Clean output: prompts only.
    Clean,
    /// Verbose output: step, progress, parse expectations.
    Verbose,
}

impl Verbosity {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Clean
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

/// Prints prompts and results for the interactive wizard.
pub struct WizardPresenter {
    verbosity: Verbosity,
    header_printed: bool,
    show_answers_json: bool,
}

impl WizardPresenter {
    pub fn new(verbosity: Verbosity, show_answers_json: bool) -> Self {
        Self {
            verbosity,
            header_printed: false,
            show_answers_json,
        }
    }

    pub fn show_header(&mut self, payload: &RenderPayload) {
        if self.header_printed {
            return;
        }
        println!("{}", payload.title);
        self.header_printed = true;
    }

    pub fn show_status(&self, payload: &RenderPayload) {
        if !self.verbosity.is_verbose() {
            return;
        }
        if payload.step == Step::Questionnaire {
            println!(
                "Step: {} ({}/{} answered)",
                payload.step.as_str(),
                payload.progress.answered,
                payload.progress.total
            );
        } else {
            println!("Step: {}", payload.step.as_str());
        }
    }

    pub fn show_message(&self, payload: &RenderPayload) {
        if let Some(message) = &payload.message {
            println!("{}", message);
        }
    }

    pub fn field_prompt(&self, field: &RenderField, hint: Option<&str>) -> String {
        let mut line = format!("{} *", field.label);
        if let Some(hint) = hint {
            line.push(' ');
            line.push_str(hint);
        }
        line
    }

    pub fn show_validation_errors(&self, errors: &ValidationErrors) {
        eprintln!("Please fix the following:");
        for (field, message) in errors.iter() {
            eprintln!("  {}: {}", field.label(), message);
        }
    }

    pub fn show_question(&self, question: &RenderQuestion) {
        println!("{}/{} {}", question.position, question.total, question.text);
        for (idx, option) in question.options.iter().enumerate() {
            let marker = if question.selected.as_deref() == Some(option.as_str()) {
                " (selected)"
            } else {
                ""
            };
            println!("  {}. {}{}", idx + 1, option, marker);
        }
        if self.verbosity.is_verbose() {
            println!("Enter a number or option text; 'back' to go back, 'exit' to quit.");
        }
    }

    pub fn show_ready_to_submit(&self) {
        println!("No further questions. Press Enter to submit or type 'back'.");
    }

    pub fn show_note(&self, note: &str) {
        println!("{}", note);
    }

    pub fn show_parse_error(&self, error: &AnswerParseError) {
        eprintln!("Invalid answer: {}", error.user_message);
        if self.verbosity.is_verbose()
            && let Some(debug) = &error.debug_message
        {
            eprintln!("  Expected: {}", debug);
        }
    }

    pub fn show_completion(&self, submission: &Submission, message: Option<&str>) {
        if let Some(message) = message {
            println!("{}", message);
        }
        println!("Done ✅");
        match submission.to_cbor() {
            Ok(bytes) => {
                println!("Submission (CBOR hex): {}", encode_hex(&bytes));
            }
            Err(err) => {
                eprintln!("Failed to serialize submission to CBOR: {}", err);
            }
        }
        if self.show_answers_json {
            match submission.to_json_pretty() {
                Ok(pretty) => println!("{}", pretty),
                Err(err) => {
                    eprintln!("Failed to serialize submission to JSON: {}", err);
                }
            }
        }
    }
}

/// Error produced when parsing answers from the user.
#[derive(Debug)]
pub struct AnswerParseError {
    pub user_message: String,
    pub debug_message: Option<String>,
}

impl AnswerParseError {
    pub fn new(user_message: impl Into<String>, debug_message: Option<String>) -> Self {
        Self {
            user_message: user_message.into(),
            debug_message,
        }
    }
}

fn encode_hex(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(&mut encoded, "{:02x}", byte).expect("writing to string cannot fail");
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_encoding_is_lowercase_pairs() {
        assert_eq!(encode_hex(&[0x00, 0xab, 0x10]), "00ab10");
    }
}
