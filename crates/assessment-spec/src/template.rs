use handlebars::Handlebars;
use serde::Serialize;
use thiserror::Error;

use crate::answers::AnswerMap;
use crate::spec::contact::ContactInfo;

#[derive(Debug, Error)]
#[error("failed to render message template: {0}")]
pub struct TemplateError(#[from] handlebars::RenderError);

/// Values exposed to presentation templates.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateContext<'a> {
    pub title: &'a str,
    pub contact: &'a ContactInfo,
    pub answers: &'a AnswerMap,
}

/// Renders presentation messages. Strict mode turns unknown variables into
/// errors; output is plain text so nothing is HTML-escaped.
pub struct TemplateEngine {
    registry: Handlebars<'static>,
}

impl TemplateEngine {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        Self { registry }
    }

    pub fn render(
        &self,
        template: &str,
        ctx: &TemplateContext<'_>,
    ) -> Result<String, TemplateError> {
        Ok(self.registry.render_template(template, ctx)?)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}
