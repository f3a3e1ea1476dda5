//! WhatsApp notification outbox
//!
//! Messages are rendered from the active template for the event (or a
//! built-in default) and queued in the `notification` table. Delivery is
//! handled outside this service. Queueing never fails the business
//! operation that triggered it.

use std::collections::HashMap;

use shared::models::{Invoice, Job, TemplateEvent, render_template};
use sqlx::SqliteConnection;

use crate::db::repository::{notification, template};

const DEFAULT_JOB_COMPLETED: &str = "Hi {{customer_name}}, your {{vehicle}} is ready for pickup. Job {{job_number}}, invoice {{invoice_number}}: total {{total}}, balance due {{balance}}. Thank you!";

const DEFAULT_PAYMENT_RECEIVED: &str = "Hi {{customer_name}}, we received {{amount}} for job {{job_number}}. Balance due: {{balance}}.";

fn default_body(event: TemplateEvent) -> &'static str {
    match event {
        TemplateEvent::PaymentReceived => DEFAULT_PAYMENT_RECEIVED,
        _ => DEFAULT_JOB_COMPLETED,
    }
}

fn money(value: f64) -> String {
    format!("{value:.2}")
}

/// Variables available to `job_completed` templates
pub fn job_completed_vars(job: &Job, invoice: Option<&Invoice>) -> HashMap<String, String> {
    HashMap::from([
        ("customer_name".to_string(), job.customer_name.clone()),
        ("vehicle".to_string(), job.vehicle_name.clone()),
        ("job_number".to_string(), job.job_number.clone()),
        (
            "invoice_number".to_string(),
            invoice.map(|i| i.invoice_number.clone()).unwrap_or_default(),
        ),
        ("total".to_string(), money(job.total)),
        ("balance".to_string(), money(job.balance)),
    ])
}

/// Variables available to `payment_received` templates
pub fn payment_received_vars(job: &Job, amount: f64) -> HashMap<String, String> {
    HashMap::from([
        ("customer_name".to_string(), job.customer_name.clone()),
        ("vehicle".to_string(), job.vehicle_name.clone()),
        ("job_number".to_string(), job.job_number.clone()),
        ("amount".to_string(), money(amount)),
        ("balance".to_string(), money(job.balance)),
    ])
}

/// Render and queue a message for the job's customer; failures are logged only.
pub async fn queue_for_job(
    conn: &mut SqliteConnection,
    event: TemplateEvent,
    job: &Job,
    vars: &HashMap<String, String>,
) {
    let recipient = job.customer_phone.trim();
    if recipient.is_empty() {
        tracing::warn!(job_id = job.id, event = event.as_str(), "Customer has no phone, notification skipped");
        return;
    }

    let body = match template::find_active_for_event(&mut *conn, event).await {
        Ok(Some(t)) => t.body,
        Ok(None) => default_body(event).to_string(),
        Err(e) => {
            tracing::warn!(job_id = job.id, error = %e, "Template lookup failed, using default");
            default_body(event).to_string()
        }
    };
    let message = render_template(&body, vars);

    match notification::enqueue(conn, event, recipient, &message, Some(job.id)).await {
        Ok(id) => tracing::info!(
            notification_id = id,
            job_id = job.id,
            event = event.as_str(),
            "WhatsApp notification queued"
        ),
        Err(e) => tracing::warn!(job_id = job.id, error = %e, "Failed to queue notification"),
    }
}
