use crate::domain::value_objects::{ExpectedValue, HeaderParam};
use crate::errors::HeaderError;

use super::HeaderSource;

/// Header values that passed a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedHeader {
    pub name: String,
    pub values: Vec<String>,
}

impl ExtractedHeader {
    /// First value sent, which is the common single-valued case
    pub fn value(&self) -> &str {
        self.values.first().map(String::as_str).unwrap_or_default()
    }
}

/// Stateless header rule evaluation
pub struct HeaderMatcher;

impl HeaderMatcher {
    /// Whether any of `values` satisfies `expected`.
    ///
    /// Patterns are tested as-is; literal comparisons fold ASCII case unless
    /// `case_sensitive` is set.
    pub fn matches<S: AsRef<str>>(values: &[S], expected: &ExpectedValue, case_sensitive: bool) -> bool {
        let literal_eq = |actual: &str, candidate: &str| {
            if case_sensitive {
                actual == candidate
            } else {
                actual.eq_ignore_ascii_case(candidate)
            }
        };

        match expected {
            ExpectedValue::Pattern(regex) => values.iter().any(|v| regex.is_match(v.as_ref())),
            ExpectedValue::Exact(candidate) => values.iter().any(|v| literal_eq(v.as_ref(), candidate)),
            ExpectedValue::OneOf(candidates) | ExpectedValue::EnumSet(candidates) => values
                .iter()
                .any(|v| candidates.iter().any(|c| literal_eq(v.as_ref(), c))),
        }
    }

    /// Look up the header named by `param` and validate it.
    ///
    /// # Errors
    ///
    /// * `MissingHeader` - absent, or every value empty while the rule forbids empties
    /// * `InvalidHeaderValue` - present but no value satisfies the expected value
    pub fn extract<H: HeaderSource + ?Sized>(
        source: &H,
        param: &HeaderParam,
    ) -> Result<ExtractedHeader, HeaderError> {
        let rule = param.to_rule();
        let values = source.header_values(&rule.header_name);

        let all_empty = values.iter().all(|v| v.is_empty());
        if values.is_empty() || (!rule.allow_empty && all_empty) {
            return Err(HeaderError::MissingHeader {
                message: rule.missing_text(),
            });
        }

        if let Some(expected) = &rule.expected_value {
            if !Self::matches(&values, expected, rule.case_sensitive) {
                return Err(HeaderError::InvalidHeaderValue {
                    message: rule.invalid_text(),
                });
            }
        }

        Ok(ExtractedHeader {
            name: rule.header_name,
            values,
        })
    }
}
