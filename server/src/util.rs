//! Shared utility functions

use validator::{ValidationError, ValidationErrors};

/// Reject strings that are empty or contain only whitespace.
///
/// For use with `#[validate(custom(function = "crate::util::not_blank"))]`.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Flatten validator output into one readable line.
///
/// Fields are listed alphabetically; each contributes its custom message when
/// one is set, otherwise `"<field> is invalid"`.
pub fn describe_validation_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let messages: Vec<String> = fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| match &err.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid", field_label(&field)),
            })
        })
        .collect();

    if messages.is_empty() {
        "Invalid input".to_string()
    } else {
        messages.join("; ")
    }
}

fn field_label(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
