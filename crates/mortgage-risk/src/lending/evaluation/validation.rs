use super::super::domain::LoanApplication;

/// Failure of a single evaluation. No partial assessment accompanies it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
}

impl EvaluationError {
    pub fn field(&self) -> &'static str {
        match self {
            EvaluationError::InvalidInput { field, .. } => *field,
        }
    }
}

pub(crate) fn validate(application: &LoanApplication) -> Result<(), EvaluationError> {
    if application.existing_property_count < 0 {
        return Err(EvaluationError::InvalidInput {
            field: "existing_property_count",
            reason: format!(
                "must be zero or more, got {}",
                application.existing_property_count
            ),
        });
    }

    if application.total_price <= 0 {
        return Err(EvaluationError::InvalidInput {
            field: "total_price",
            reason: format!("must be positive, got {}", application.total_price),
        });
    }

    Ok(())
}
