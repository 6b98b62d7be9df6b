use thiserror::Error;

/// Errors that can occur when parsing or validating range filters
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("Unknown comparator: '{0}'. Valid codes are: EQ, BF, AF, BN, GT, LT")]
    UnknownComparator(String),

    #[error("Unknown range kind: '{0}'. Valid kinds are: date, value")]
    UnknownKind(String),

    #[error("Invalid {operand} value for filter '{field}': value is empty")]
    EmptyOperand { field: String, operand: Operand },

    #[error("Invalid {operand} value for filter '{field}': '{value}' is not a number")]
    NotANumber {
        field: String,
        operand: Operand,
        value: String,
    },

    #[error("Invalid {operand} value for filter '{field}': '{value}' is not a YYYY-MM-DD date")]
    NotADate {
        field: String,
        operand: Operand,
        value: String,
    },
}

/// Which side of a range filter an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    First,
    Second,
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::First => write!(f, "first"),
            Operand::Second => write!(f, "second"),
        }
    }
}
