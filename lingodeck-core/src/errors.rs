use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("not found: {0}")]
    NotFound(&'static str),
    #[error("invalid grade: {0} (expected 0..=5)")]
    InvalidGrade(i64),
    #[error("next due date is out of the representable range")]
    DueDateOutOfRange,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("storage error: {0}")]
    Storage(&'static str),
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(m) => format!("{field}: {m}"),
                    None => format!("{field}: {}", e.code),
                })
            })
            .collect();
        messages.sort();
        CoreError::Validation(messages.join(" && "))
    }
}
