use thiserror::Error;

#[derive(Error, Debug)]
pub enum BudgetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Record {record} is missing required field `{field}`")]
    MissingField { record: usize, field: &'static str },

    #[error("Invalid financial year '{0}': expected YYYY-YY")]
    InvalidFinancialYear(String),

    #[error("Degenerate input: {0}")]
    DegenerateInput(String),
}

pub type Result<T> = std::result::Result<T, BudgetError>;

/// Why a single record was left out of a grouped result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RejectReason {
    #[error("missing province")]
    MissingProvince,

    #[error("unrecognized province '{0}'")]
    UnrecognizedProvince(String),

    #[error("more than one sphere: {0:?}")]
    MultipleSpheres(Vec<String>),

    #[error("unrecognized sphere '{sphere}' for province '{province}'")]
    UnrecognizedSphere { sphere: String, province: String },

    #[error("unrecognized phase '{0}'")]
    UnrecognizedPhase(String),
}

/// A record excluded from a grouping, identified by its input position.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("record {index}: {reason}")]
pub struct Rejection {
    pub index: usize,
    pub reason: RejectReason,
}

impl Rejection {
    pub fn new(index: usize, reason: RejectReason) -> Self {
        Self { index, reason }
    }
}
