use super::{Priority, ValidationError};

pub const MAX_SOURCE_FILE_LEN: usize = 255;
pub const MAX_TARGET_FORMAT_LEN: usize = 50;

/// Validated inputs of a processing request. Holding one means every field
/// already passed the submission rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSubmission {
    pub source_file: String,
    pub target_format: String,
    pub priority: Priority,
}

impl JobSubmission {
    pub fn new(
        source_file: &str,
        target_format: &str,
        priority: &str,
    ) -> Result<Self, ValidationError> {
        let source_file = required_text("source_file", source_file, MAX_SOURCE_FILE_LEN)?;
        let target_format = required_text("target_format", target_format, MAX_TARGET_FORMAT_LEN)?;

        // Choices are matched exactly; padding is not stripped.
        if priority.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "priority" });
        }

        Ok(Self {
            source_file,
            target_format,
            priority: priority.parse()?,
        })
    }
}

fn required_text(field: &'static str, value: &str, max: usize) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField { field });
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_string())
}
