use tracing::info;

use storynest_db::Database;
use storynest_types::api::ContactForm;

use crate::error::{ServiceError, ValidationError};

pub const REQUIRED_FIELDS: &str = "Please fill in all required fields.";

/// Stores a contact submission. Subject is optional; a blank one is stored as NULL.
pub fn submit(db: &Database, form: &ContactForm) -> Result<i64, ServiceError> {
    let name = form.name.trim();
    let email = form.email.trim();
    let subject = form.subject.trim();
    let message = form.message.trim();

    for (field, value) in [("name", name), ("email", email), ("message", message)] {
        if value.is_empty() {
            return Err(ValidationError::new(field, REQUIRED_FIELDS).into());
        }
    }

    let subject = (!subject.is_empty()).then_some(subject);
    let id = db.insert_message(name, email, subject, message)?;
    info!("Stored contact message {}", id);
    Ok(id)
}
