use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::features::tickets::widgets::{form_text, AssignmentWidget};
use crate::shared::validation::CLOCK_TIME_REGEX;

/// Name used in queue assignment fields
pub const APPOINTMENT_WIDGET: &str = "TicketAssignAppointment";

/// NHS display format, e.g. "5 Jan 2015"
const NHS_DATE_FORMAT: &str = "%d %b %Y";

/// Layouts that are dates, just not in the expected format
const OTHER_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

/// Follow-up appointment captured when a ticket enters a queue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentData {
    pub appointment_date: String,
    pub appointment_time: String,
}

fn validate_appointment_date(date: &str) -> Result<(), ValidationError> {
    if date.is_empty() {
        return Err(ValidationError::new("required")
            .with_message("Please enter an appointment date".into()));
    }
    if NaiveDate::parse_from_str(date, NHS_DATE_FORMAT).is_ok() {
        return Ok(());
    }
    if OTHER_DATE_FORMATS
        .iter()
        .any(|format| NaiveDate::parse_from_str(date, format).is_ok())
    {
        return Err(ValidationError::new("format")
            .with_message("Appointment date is not in valid format".into()));
    }
    Err(ValidationError::new("invalid_date")
        .with_message("Appointment date is not a valid date".into()))
}

fn validate_appointment_time(time: &str) -> Result<(), ValidationError> {
    if time.is_empty() {
        return Err(ValidationError::new("required")
            .with_message("Please enter an appointment time".into()));
    }
    if !CLOCK_TIME_REGEX.is_match(time) {
        return Err(ValidationError::new("invalid_time")
            .with_message("Appointment time is not valid".into()));
    }
    Ok(())
}

// Both fields are always checked so every problem is reported at once
impl Validate for AppointmentData {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_appointment_date(&self.appointment_date) {
            errors.add("appointment_date", e);
        }
        if let Err(e) = validate_appointment_time(&self.appointment_time) {
            errors.add("appointment_time", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

pub struct AppointmentWidget;

impl AssignmentWidget for AppointmentWidget {
    type Data = AppointmentData;

    fn extract_form_data(&self, payload: &Map<String, Value>) -> AppointmentData {
        AppointmentData {
            appointment_date: form_text(payload, "appointment_date"),
            appointment_time: form_text(payload, "appointment_time"),
        }
    }

    fn report_string(&self, data: &AppointmentData) -> String {
        format!(
            "Follow-up appointment booked for {} at {}",
            data.appointment_date, data.appointment_time
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_valid_appointment() {
        let widget = AppointmentWidget;
        let form = payload(json!({
            "appointment_date": " 5 Jan 2015 ",
            "appointment_time": "9:30"
        }));

        assert!(widget.validate(&form).is_empty());
        let data = widget.extract_form_data(&form);
        assert_eq!(data.appointment_date, "5 Jan 2015");
        assert_eq!(
            widget.report_string(&data),
            "Follow-up appointment booked for 5 Jan 2015 at 9:30"
        );
    }

    #[test]
    fn test_empty_date_reports_only_the_date() {
        let widget = AppointmentWidget;
        let errors = widget.validate(&payload(json!({
            "appointment_date": "",
            "appointment_time": "14:00"
        })));

        assert_eq!(errors.len(), 1);
        assert_eq!(errors["appointment_date"], "Please enter an appointment date");
        assert!(!errors.contains_key("appointment_time"));
    }

    #[test]
    fn test_date_messages() {
        let widget = AppointmentWidget;
        let date_error = |date: &str| {
            widget
                .validate(&payload(json!({
                    "appointment_date": date,
                    "appointment_time": "10:00"
                })))
                .remove("appointment_date")
        };

        assert_eq!(
            date_error("2015-01-05").as_deref(),
            Some("Appointment date is not in valid format")
        );
        assert_eq!(
            date_error("05/01/2015").as_deref(),
            Some("Appointment date is not in valid format")
        );
        assert_eq!(
            date_error("31 Feb 2015").as_deref(),
            Some("Appointment date is not a valid date")
        );
        assert_eq!(
            date_error("next tuesday").as_deref(),
            Some("Appointment date is not a valid date")
        );
        assert_eq!(date_error("05 Jan 2015"), None);
    }

    #[test]
    fn test_missing_fields_collect_both_errors() {
        let widget = AppointmentWidget;
        let errors = widget.validate(&Map::new());

        assert_eq!(errors["appointment_date"], "Please enter an appointment date");
        assert_eq!(errors["appointment_time"], "Please enter an appointment time");

        let errors = widget.validate(&payload(json!({
            "appointment_date": "5 Jan 2015",
            "appointment_time": "25:00"
        })));
        assert_eq!(errors["appointment_time"], "Appointment time is not valid");
    }
}
