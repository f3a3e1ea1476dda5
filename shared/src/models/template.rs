//! WhatsApp Message Template Models

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Business event a template is written for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum TemplateEvent {
    JobCompleted,
    PaymentReceived,
    AppointmentReminder,
    Custom,
}

impl TemplateEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateEvent::JobCompleted => "job_completed",
            TemplateEvent::PaymentReceived => "payment_received",
            TemplateEvent::AppointmentReminder => "appointment_reminder",
            TemplateEvent::Custom => "custom",
        }
    }
}

/// Message template entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MessageTemplate {
    pub id: i64,
    pub name: String,
    pub event: TemplateEvent,
    /// Text with `{{placeholder}}` variables
    pub body: String,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateCreate {
    pub name: String,
    pub event: TemplateEvent,
    pub body: String,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateUpdate {
    pub name: Option<String>,
    pub event: Option<TemplateEvent>,
    pub body: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplatePreviewRequest {
    #[serde(default)]
    pub variables: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplatePreview {
    pub rendered: String,
}

/// Replace `{{key}}` placeholders; unknown keys are left as written.
pub fn render_template(body: &str, variables: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = after[..end].trim();
                match variables.get(key) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn renders_known_placeholders() {
        let out = render_template(
            "Hi {{customer_name}}, your {{ vehicle }} is ready.",
            &vars(&[("customer_name", "Asha"), ("vehicle", "Honda City")]),
        );
        assert_eq!(out, "Hi Asha, your Honda City is ready.");
    }

    #[test]
    fn unknown_placeholders_stay_verbatim() {
        let out = render_template("Total {{total}} due {{due_date}}", &vars(&[("total", "500.00")]));
        assert_eq!(out, "Total 500.00 due {{due_date}}");
    }

    #[test]
    fn unclosed_braces_are_copied() {
        let out = render_template("Hello {{name", &vars(&[("name", "x")]));
        assert_eq!(out, "Hello {{name");
    }

    #[test]
    fn handles_multibyte_text() {
        let out = render_template("₹{{amount}} प्राप्त", &vars(&[("amount", "1,000")]));
        assert_eq!(out, "₹1,000 प्राप्त");
    }
}
