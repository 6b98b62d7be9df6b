use super::codec::RangeFilter;
use super::error::{Operand, RangeError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What a range filter compares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeKind {
    /// Calendar dates in `YYYY-MM-DD` form
    #[default]
    Date,
    /// Numeric amounts
    Value,
}

impl FromStr for RangeKind {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "date" | "d" => Ok(RangeKind::Date),
            "value" | "val" | "v" => Ok(RangeKind::Value),
            _ => Err(RangeError::UnknownKind(s.to_string())),
        }
    }
}

impl RangeFilter {
    /// Check the operands of this filter for a field of the given kind
    ///
    /// The second operand is checked first for BETWEEN filters, then the first
    /// operand for every comparator.
    pub fn validate(&self, field: &str, kind: RangeKind) -> Result<(), RangeError> {
        if let Some(second) = self.operand2() {
            check_operand(field, kind, Operand::Second, second)?;
        }
        check_operand(field, kind, Operand::First, self.operand1())
    }
}

fn check_operand(
    field: &str,
    kind: RangeKind,
    operand: Operand,
    value: &str,
) -> Result<(), RangeError> {
    if value.is_empty() {
        return Err(RangeError::EmptyOperand {
            field: field.to_string(),
            operand,
        });
    }

    match kind {
        RangeKind::Value => {
            if value.trim().parse::<f64>().is_err() {
                return Err(RangeError::NotANumber {
                    field: field.to_string(),
                    operand,
                    value: value.to_string(),
                });
            }
        }
        RangeKind::Date => {
            if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
                return Err(RangeError::NotADate {
                    field: field.to_string(),
                    operand,
                    value: value.to_string(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::Comparator;

    #[test]
    fn test_valid_value_filters() {
        assert!(
            RangeFilter::single(Comparator::GreaterThan, "1500")
                .validate("oppVal", RangeKind::Value)
                .is_ok()
        );
        assert!(
            RangeFilter::between("10.5", "20")
                .validate("oppVal", RangeKind::Value)
                .is_ok()
        );
    }

    #[test]
    fn test_between_requires_second_operand() {
        let err = RangeFilter::between("10", "")
            .validate("oppVal", RangeKind::Value)
            .unwrap_err();
        assert_eq!(
            err,
            RangeError::EmptyOperand {
                field: "oppVal".to_string(),
                operand: Operand::Second,
            }
        );
    }

    #[test]
    fn test_value_operand_must_be_numeric() {
        let err = RangeFilter::single(Comparator::Equal, "abc")
            .validate("oppVal", RangeKind::Value)
            .unwrap_err();
        assert!(matches!(err, RangeError::NotANumber { .. }));
    }

    #[test]
    fn test_date_operand_must_parse() {
        assert!(
            RangeFilter::single(Comparator::After, "2024-12-31")
                .validate("closedDate", RangeKind::Date)
                .is_ok()
        );
        let err = RangeFilter::single(Comparator::After, "31/12/2024")
            .validate("closedDate", RangeKind::Date)
            .unwrap_err();
        assert!(matches!(err, RangeError::NotADate { .. }));
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("date".parse::<RangeKind>().unwrap(), RangeKind::Date);
        assert_eq!("VALUE".parse::<RangeKind>().unwrap(), RangeKind::Value);
        assert!("money".parse::<RangeKind>().is_err());
    }
}
