use super::comparator::Comparator;
use serde::Serialize;
use std::fmt;

const BETWEEN_MARKER: &str = "BN";

/// A comparator with one operand, or two for BETWEEN
///
/// `operand2` is present exactly when the comparator is BETWEEN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeFilter {
    comparator: Comparator,
    operand1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    operand2: Option<String>,
}

impl RangeFilter {
    /// Build a filter, dropping `operand2` unless the comparator is BETWEEN
    pub fn new(
        comparator: Comparator,
        operand1: impl Into<String>,
        operand2: Option<impl Into<String>>,
    ) -> Self {
        let operand2 = if comparator.is_between() {
            Some(operand2.map(Into::into).unwrap_or_default())
        } else {
            None
        };
        Self {
            comparator,
            operand1: operand1.into(),
            operand2,
        }
    }

    pub fn single(comparator: Comparator, operand1: impl Into<String>) -> Self {
        Self::new(comparator, operand1, None::<String>)
    }

    pub fn between(operand1: impl Into<String>, operand2: impl Into<String>) -> Self {
        Self::new(Comparator::Between, operand1, Some(operand2))
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    pub fn operand1(&self) -> &str {
        &self.operand1
    }

    pub fn operand2(&self) -> Option<&str> {
        self.operand2.as_deref()
    }
}

/// The persisted single-string form of a [`RangeFilter`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EncodedRangeToken(String);

impl EncodedRangeToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn decode(&self) -> Option<RangeFilter> {
        decode(&self.0)
    }
}

impl From<&str> for EncodedRangeToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EncodedRangeToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<EncodedRangeToken> for String {
    fn from(token: EncodedRangeToken) -> Self {
        token.0
    }
}

impl fmt::Display for EncodedRangeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encode a filter as `operand1 + code`, or `operand1 + "BN" + operand2`
///
/// Empty operands are encoded as-is; suppressing unset filters is up to the
/// caller.
pub fn encode(filter: &RangeFilter) -> EncodedRangeToken {
    let mut token = String::with_capacity(
        filter.operand1.len() + 2 + filter.operand2.as_ref().map_or(0, String::len),
    );
    token.push_str(&filter.operand1);
    token.push_str(filter.comparator.code());
    if let Some(second) = &filter.operand2 {
        token.push_str(second);
    }
    EncodedRangeToken(token)
}

/// Decode a token back into a filter
///
/// Returns `None` for an empty token, a token too short to carry a code, or
/// an unknown trailing code. A token containing `BN` (any case) is split at
/// the first `B` and after the first `N` following it.
pub fn decode(token: &str) -> Option<RangeFilter> {
    if token.is_empty() {
        return None;
    }

    // ASCII uppercasing keeps byte offsets aligned with `token`
    let upper = token.to_ascii_uppercase();
    if upper.contains(BETWEEN_MARKER) {
        let b = upper.find('B')?;
        let n = b + 1 + upper[b + 1..].find('N')?;
        return Some(RangeFilter::between(&token[..b], &token[n + 1..]));
    }

    let (split, _) = token.char_indices().rev().nth(1)?;
    let (operand, code) = token.split_at(split);
    match Comparator::from_code(code) {
        Some(comparator) => Some(RangeFilter::single(comparator, operand)),
        None => {
            tracing::debug!(token, code, "range token has an unknown comparator code");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_after_date() {
        let filter = RangeFilter::single(Comparator::After, "2024-12-31");
        assert_eq!(encode(&filter).as_str(), "2024-12-31AF");
    }

    #[test]
    fn test_decode_after_date() {
        let filter = decode("2024-12-31AF").unwrap();
        assert_eq!(filter.comparator(), Comparator::After);
        assert_eq!(filter.operand1(), "2024-12-31");
        assert_eq!(filter.operand2(), None);
    }

    #[test]
    fn test_encode_decode_between() {
        let filter = RangeFilter::between("100", "500");
        let token = encode(&filter);
        assert_eq!(token.as_str(), "100BN500");
        assert_eq!(decode(token.as_str()), Some(filter));
    }

    #[test]
    fn test_decode_empty_and_short_tokens() {
        assert_eq!(decode(""), None);
        assert_eq!(decode("A"), None);
    }

    #[test]
    fn test_decode_unknown_code() {
        assert_eq!(decode("2024-12-31ZZ"), None);
    }

    #[test]
    fn test_decode_lowercase_code() {
        let filter = decode("250gt").unwrap();
        assert_eq!(filter.comparator(), Comparator::GreaterThan);
        assert_eq!(filter.operand1(), "250");
    }

    #[test]
    fn test_decode_lowercase_between_marker() {
        assert_eq!(decode("100bn500"), Some(RangeFilter::between("100", "500")));
    }

    #[test]
    fn test_operand2_dropped_unless_between() {
        let filter = RangeFilter::new(Comparator::Equal, "5", Some("9"));
        assert_eq!(filter.operand2(), None);
        assert_eq!(encode(&filter).as_str(), "5EQ");
    }

    #[test]
    fn test_operands_with_marker_letters_are_ambiguous() {
        let filter = RangeFilter::between("Bob", "Ned");
        let token = encode(&filter);
        assert_eq!(token.as_str(), "BobBNNed");
        // Split happens at the first 'B', not at the marker
        let decoded = decode(token.as_str()).unwrap();
        assert_eq!(decoded.operand1(), "");
        assert_ne!(decoded, filter);
    }

    #[test]
    fn test_non_ascii_operand() {
        let filter = RangeFilter::single(Comparator::Equal, "€100");
        assert_eq!(decode(encode(&filter).as_str()), Some(filter));
    }
}
