#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field}: this field is required")]
    MissingField { field: &'static str },
    #[error("{field}: ensure this field has no more than {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("priority: \"{0}\" is not a valid choice, expected high or low")]
    InvalidPriority(String),
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField { field } => field,
            ValidationError::TooLong { field, .. } => field,
            ValidationError::InvalidPriority(_) => "priority",
        }
    }
}
