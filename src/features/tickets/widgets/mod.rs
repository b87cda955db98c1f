//! Typed capture of the data a queue asks for when a ticket enters it.
//!
//! A queue's assignment fields are either plain text fields or name a widget.
//! Widgets extract a typed structure from the submitted form data, validate it
//! field by field, and describe it as a report string.

mod appointment;

use appointment::AppointmentWidget;
pub use appointment::APPOINTMENT_WIDGET;

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};
use validator::Validate;

use crate::core::error::{AppError, FieldErrors, Result};
use crate::features::queues::models::AssignmentField;
use crate::shared::validation::to_field_errors;

pub trait AssignmentWidget {
    type Data: Validate + Serialize;

    fn extract_form_data(&self, payload: &Map<String, Value>) -> Self::Data;

    fn report_string(&self, data: &Self::Data) -> String;

    /// Every invalid field with its message; empty when the data is valid
    fn validate(&self, payload: &Map<String, Value>) -> FieldErrors {
        match self.extract_form_data(payload).validate() {
            Ok(()) => FieldErrors::new(),
            Err(errors) => to_field_errors(&errors),
        }
    }
}

/// Widgets that can be named in a queue's assignment fields
pub enum Widget {
    Appointment(AppointmentWidget),
}

impl Widget {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            APPOINTMENT_WIDGET => Some(Widget::Appointment(AppointmentWidget)),
            _ => None,
        }
    }

    /// Extracted values and report string; `None` when the payload is
    /// invalid, with the problems added to `errors`
    fn capture(
        &self,
        payload: &Map<String, Value>,
        errors: &mut FieldErrors,
    ) -> Result<Option<(Value, String)>> {
        match self {
            Widget::Appointment(widget) => capture_with(widget, payload, errors),
        }
    }
}

fn capture_with<W: AssignmentWidget>(
    widget: &W,
    payload: &Map<String, Value>,
    errors: &mut FieldErrors,
) -> Result<Option<(Value, String)>> {
    let field_errors = widget.validate(payload);
    if !field_errors.is_empty() {
        errors.extend(field_errors);
        return Ok(None);
    }

    let data = widget.extract_form_data(payload);
    let report = widget.report_string(&data);
    let values = serde_json::to_value(&data).map_err(|e| {
        tracing::error!("Failed to serialize captured widget data: {}", e);
        AppError::Internal(format!("Failed to serialize captured widget data: {}", e))
    })?;
    Ok(Some((values, report)))
}

/// Trimmed text of a form value; numbers and booleans are stringified and
/// anything else reads as empty
pub fn form_text(payload: &Map<String, Value>, key: &str) -> String {
    match payload.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Values captured for a queue's assignment fields
#[derive(Debug, Default)]
pub struct CapturedFields {
    /// Stored as the assignment's details
    pub details: Map<String, Value>,
    /// Context for the queue's report definition
    pub context: HashMap<String, minijinja::Value>,
}

impl CapturedFields {
    pub fn details(&self) -> Option<Value> {
        if self.details.is_empty() {
            None
        } else {
            Some(Value::Object(self.details.clone()))
        }
    }
}

/// Run every assignment field against the payload.
///
/// Field errors are added to `errors` so they can be reported together with
/// other problems in the request. A field naming an unknown widget is a
/// configuration error.
pub fn capture_fields(
    fields: &[AssignmentField],
    payload: &Map<String, Value>,
    errors: &mut FieldErrors,
) -> Result<CapturedFields> {
    let mut captured = CapturedFields::default();

    for field in fields {
        match &field.widget {
            Some(name) => {
                let widget = Widget::from_name(name).ok_or_else(|| {
                    tracing::error!("Assignment field '{}' names unknown widget '{}'", field.id, name);
                    AppError::Internal(format!("Unknown assignment widget '{}'", name))
                })?;
                if let Some((values, report)) = widget.capture(payload, errors)? {
                    if let Value::Object(map) = &values {
                        for (key, value) in map {
                            captured
                                .context
                                .insert(key.clone(), minijinja::Value::from_serialize(value));
                        }
                    }
                    captured
                        .context
                        .insert(field.id.clone(), minijinja::Value::from(report));
                    captured.details.insert(field.id.clone(), values);
                }
            }
            None => {
                let text = form_text(payload, &field.id);
                if field.required && text.is_empty() {
                    errors.insert(field.id.clone(), format!("{} is required", field.label));
                    continue;
                }
                captured
                    .context
                    .insert(field.id.clone(), minijinja::Value::from(text.clone()));
                captured.details.insert(field.id.clone(), Value::String(text));
            }
        }
    }

    Ok(captured)
}
