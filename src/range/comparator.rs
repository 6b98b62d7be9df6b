use super::error::RangeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Comparators a range filter can use
///
/// The two-letter code is what ends up in encoded tokens; the label is what
/// the comparator control shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Comparator {
    #[default]
    #[serde(rename = "EQ")]
    Equal,
    #[serde(rename = "BF")]
    Before,
    #[serde(rename = "AF")]
    After,
    #[serde(rename = "BN")]
    Between,
    #[serde(rename = "GT")]
    GreaterThan,
    #[serde(rename = "LT")]
    LessThan,
}

impl Comparator {
    pub const ALL: [Comparator; 6] = [
        Comparator::Equal,
        Comparator::Before,
        Comparator::After,
        Comparator::Between,
        Comparator::GreaterThan,
        Comparator::LessThan,
    ];

    /// The two-letter code used in encoded tokens
    pub fn code(&self) -> &'static str {
        match self {
            Comparator::Equal => "EQ",
            Comparator::Before => "BF",
            Comparator::After => "AF",
            Comparator::Between => "BN",
            Comparator::GreaterThan => "GT",
            Comparator::LessThan => "LT",
        }
    }

    /// The label shown by the comparator control
    pub fn label(&self) -> &'static str {
        match self {
            Comparator::Equal => "EQUAL",
            Comparator::Before => "BEFORE",
            Comparator::After => "AFTER",
            Comparator::Between => "BETWEEN",
            Comparator::GreaterThan => "GREATER THAN",
            Comparator::LessThan => "LESS THAN",
        }
    }

    /// Look a comparator up by its two-letter code, ignoring ASCII case
    pub fn from_code(code: &str) -> Option<Comparator> {
        Comparator::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(code))
    }

    pub fn is_between(&self) -> bool {
        matches!(self, Comparator::Between)
    }
}

impl FromStr for Comparator {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        Comparator::ALL
            .into_iter()
            .find(|c| c.code() == code || c.label() == code)
            .ok_or_else(|| RangeError::UnknownComparator(s.to_string()))
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_codes_and_labels() {
        assert_eq!("AF".parse::<Comparator>().unwrap(), Comparator::After);
        assert_eq!("af".parse::<Comparator>().unwrap(), Comparator::After);
        assert_eq!("between".parse::<Comparator>().unwrap(), Comparator::Between);
        assert_eq!(
            "greater than".parse::<Comparator>().unwrap(),
            Comparator::GreaterThan
        );
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(
            "ZZ".parse::<Comparator>(),
            Err(RangeError::UnknownComparator("ZZ".to_string()))
        );
    }

    #[test]
    fn test_serde_uses_codes() {
        let json = serde_json::to_string(&Comparator::Before).unwrap();
        assert_eq!(json, "\"BF\"");
        let parsed: Comparator = serde_json::from_str("\"BN\"").unwrap();
        assert_eq!(parsed, Comparator::Between);
    }
}
