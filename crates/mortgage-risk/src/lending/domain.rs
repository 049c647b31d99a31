use serde::{Deserialize, Serialize};

use super::evaluation::EvaluationError;

/// Borrower and property attributes submitted for one evaluation.
///
/// Counts and prices are signed so that out-of-range submissions reach validation and
/// come back as [`EvaluationError::InvalidInput`] rather than a deserialization failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoanApplication {
    pub existing_property_count: i64,
    pub region_id: String,
    pub total_price: i64,
    #[serde(default)]
    pub is_presale: bool,
}

impl LoanApplication {
    pub fn new(
        existing_property_count: i64,
        region_id: impl Into<String>,
        total_price: i64,
        is_presale: bool,
    ) -> Self {
        Self {
            existing_property_count,
            region_id: region_id.into(),
            total_price,
            is_presale,
        }
    }
}

/// Numeric form field that may arrive either as a JSON number or as text.
///
/// Anything else (fractions, `null`, an absent field) lands in `Other` and is reported as
/// invalid input for that field during conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormNumber {
    Integer(i64),
    Text(String),
    Other(serde_json::Value),
}

impl Default for FormNumber {
    fn default() -> Self {
        Self::Other(serde_json::Value::Null)
    }
}

impl FormNumber {
    fn parse(&self, field: &'static str) -> Result<i64, EvaluationError> {
        match self {
            FormNumber::Integer(value) => Ok(*value),
            FormNumber::Text(raw) => {
                let cleaned: String = raw
                    .trim()
                    .chars()
                    .filter(|ch| *ch != ',' && *ch != '_')
                    .collect();
                cleaned
                    .parse::<i64>()
                    .map_err(|_| EvaluationError::InvalidInput {
                        field,
                        reason: format!("'{raw}' is not a whole number"),
                    })
            }
            FormNumber::Other(serde_json::Value::Null) => Err(EvaluationError::InvalidInput {
                field,
                reason: "is required".to_string(),
            }),
            FormNumber::Other(value) => Err(EvaluationError::InvalidInput {
                field,
                reason: format!("{value} is not a whole number"),
            }),
        }
    }
}

impl From<i64> for FormNumber {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for FormNumber {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Loosely typed calculator input as collected from a browser form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplicationForm {
    #[serde(default)]
    pub existing_property_count: FormNumber,
    pub region_id: String,
    #[serde(default)]
    pub total_price: FormNumber,
    #[serde(default)]
    pub is_presale: bool,
}

impl TryFrom<LoanApplicationForm> for LoanApplication {
    type Error = EvaluationError;

    fn try_from(form: LoanApplicationForm) -> Result<Self, Self::Error> {
        let existing_property_count = form
            .existing_property_count
            .parse("existing_property_count")?;
        let total_price = form.total_price.parse("total_price")?;

        Ok(LoanApplication {
            existing_property_count,
            region_id: form.region_id.trim().to_string(),
            total_price,
            is_presale: form.is_presale,
        })
    }
}
