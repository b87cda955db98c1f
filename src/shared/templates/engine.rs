use minijinja::{Environment, Value};
use std::collections::HashMap;
use std::sync::OnceLock;
use thiserror::Error;

/// Global template environment
static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Invalid report definition: {0}")]
    Syntax(String),

    #[error("Failed to render report: {0}")]
    RenderError(String),
}

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();
    // Report definitions are plain text, never HTML
    env.set_auto_escape_callback(|_| minijinja::AutoEscape::None);
    env.set_keep_trailing_newline(false);
    env
}

fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render a queue report definition with the given context.
///
/// Values missing from the context render as empty strings.
///
/// # Example
/// ```ignore
/// let mut ctx = HashMap::new();
/// ctx.insert("appointment_date".to_string(), Value::from("5 Jan 2015"));
/// let report = render_report("Seen on {{ appointment_date }}", &ctx)?;
/// ```
pub fn render_report(
    definition: &str,
    ctx: &HashMap<String, Value>,
) -> Result<String, TemplateError> {
    let env = get_environment();

    let template = env
        .template_from_str(definition)
        .map_err(|e| TemplateError::Syntax(e.to_string()))?;

    template
        .render(ctx)
        .map(|rendered| rendered.trim().to_string())
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}
