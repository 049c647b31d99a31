use serde::{Deserialize, Serialize};

const GRADE_A_MIN_LTV: f64 = 0.70;
const GRADE_B_MIN_LTV: f64 = 0.55;
const GRADE_C_MIN_LTV: f64 = 0.40;
const APPROVAL_MIN_LTV: f64 = 0.50;

/// Letter grade discretizing the final LTV cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
}

impl Grade {
    /// Bands include their lower bound and are checked from the top down.
    pub fn from_ltv(max_ltv: f64) -> Self {
        if max_ltv >= GRADE_A_MIN_LTV {
            Grade::A
        } else if max_ltv >= GRADE_B_MIN_LTV {
            Grade::B
        } else if max_ltv >= GRADE_C_MIN_LTV {
            Grade::C
        } else {
            Grade::D
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        }
    }
}

/// Lending outcome. Current policy has no outright decline tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Approve,
    Conditional,
}

impl Decision {
    pub fn from_ltv(max_ltv: f64) -> Self {
        if max_ltv >= APPROVAL_MIN_LTV {
            Decision::Approve
        } else {
            Decision::Conditional
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Decision::Approve => "APPROVE",
            Decision::Conditional => "CONDITIONAL",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            Decision::Approve => "recommended for approval",
            Decision::Conditional => "conditional approval",
        }
    }
}
