//! Declarative header validation rules, supplied per route.

use regex::Regex;
use std::fmt;

/// The value a header is expected to carry
#[derive(Debug, Clone)]
pub enum ExpectedValue {
    /// A single literal
    Exact(String),
    /// Any of the listed literals
    OneOf(Vec<String>),
    /// Any header value matching the expression
    Pattern(Regex),
    /// The stringified members of an enumeration
    EnumSet(Vec<String>),
}

impl ExpectedValue {
    pub fn exact(value: impl Into<String>) -> Self {
        Self::Exact(value.into())
    }

    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::OneOf(values.into_iter().map(Into::into).collect())
    }

    /// Build a pattern rule; fails on an invalid expression
    pub fn pattern(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Self::Pattern)
    }

    /// Build a set from anything displayable, typically enum variants
    pub fn enum_set<I, T>(members: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        Self::EnumSet(members.into_iter().map(|m| m.to_string()).collect())
    }
}

/// Human-readable form used in default rejection messages:
/// `/source/` for patterns, ` | `-joined literals otherwise.
impl fmt::Display for ExpectedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedValue::Exact(value) => f.write_str(value),
            ExpectedValue::OneOf(values) | ExpectedValue::EnumSet(values) => {
                f.write_str(&values.join(" | "))
            }
            ExpectedValue::Pattern(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

/// Structured header rule
#[derive(Debug, Clone)]
pub struct HeaderRule {
    pub header_name: String,
    pub expected_value: Option<ExpectedValue>,
    pub case_sensitive: bool,
    pub allow_empty: bool,
    pub missing_message: Option<String>,
    pub invalid_message: Option<String>,
}

impl HeaderRule {
    /// A rule that only requires the header to be present and non-empty
    pub fn new(header_name: impl Into<String>) -> Self {
        Self {
            header_name: header_name.into(),
            expected_value: None,
            case_sensitive: false,
            allow_empty: false,
            missing_message: None,
            invalid_message: None,
        }
    }

    pub fn expect(mut self, expected: ExpectedValue) -> Self {
        self.expected_value = Some(expected);
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn allow_empty(mut self, allow_empty: bool) -> Self {
        self.allow_empty = allow_empty;
        self
    }

    pub fn missing_message(mut self, message: impl Into<String>) -> Self {
        self.missing_message = Some(message.into());
        self
    }

    pub fn invalid_message(mut self, message: impl Into<String>) -> Self {
        self.invalid_message = Some(message.into());
        self
    }

    pub fn missing_text(&self) -> String {
        self.missing_message
            .clone()
            .unwrap_or_else(|| format!("Missing required header: {}", self.header_name))
    }

    pub fn invalid_text(&self) -> String {
        if let Some(message) = &self.invalid_message {
            return message.clone();
        }
        match &self.expected_value {
            Some(expected) => format!(
                "Invalid value for header '{}'. Expected: {}",
                self.header_name, expected
            ),
            None => format!("Invalid value for header '{}'", self.header_name),
        }
    }
}

/// A route's header requirement: either a bare name (presence only) or a full rule
#[derive(Debug, Clone)]
pub enum HeaderParam {
    Name(String),
    Rule(HeaderRule),
}

impl HeaderParam {
    pub fn header_name(&self) -> &str {
        match self {
            HeaderParam::Name(name) => name,
            HeaderParam::Rule(rule) => &rule.header_name,
        }
    }

    /// Normalize into a rule; a bare name becomes a presence-only rule
    pub fn to_rule(&self) -> HeaderRule {
        match self {
            HeaderParam::Name(name) => HeaderRule::new(name.clone()),
            HeaderParam::Rule(rule) => rule.clone(),
        }
    }
}

impl From<&str> for HeaderParam {
    fn from(name: &str) -> Self {
        HeaderParam::Name(name.to_string())
    }
}

impl From<String> for HeaderParam {
    fn from(name: String) -> Self {
        HeaderParam::Name(name)
    }
}

impl From<HeaderRule> for HeaderParam {
    fn from(rule: HeaderRule) -> Self {
        HeaderParam::Rule(rule)
    }
}
