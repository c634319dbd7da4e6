//! `OperatorConfig`: how a rule names and configures an operator.
//!
//! Two surfaces produce the same value:
//!
//! - Rule-language text, `"@ipMatch 10.0.0.0/8"` or `"!@ipMatchFromFile lists/bad.txt"`,
//!   via [`OperatorConfig::parse`].
//! - JSON/YAML (feature = `"serde"`):
//!
//! ```yaml
//! operator: ipMatchFromFile
//! argument: lists/bad.txt
//! negate: true
//! ```

use crate::OperatorError;

/// Name and argument of one rule operator.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct OperatorConfig {
    /// Registered operator name, without the `@`.
    pub operator: String,

    /// Operator argument: an inline address list, a resource identifier, ...
    #[cfg_attr(feature = "serde", serde(default))]
    pub argument: String,

    /// Invert the operator result (`!@` in rule syntax).
    #[cfg_attr(feature = "serde", serde(default))]
    pub negate: bool,
}

impl OperatorConfig {
    /// Create a non-negated config.
    pub fn new(operator: impl Into<String>, argument: impl Into<String>) -> Self {
        Self {
            operator: operator.into(),
            argument: argument.into(),
            negate: false,
        }
    }

    /// Invert the operator result.
    #[must_use]
    pub fn negated(mut self) -> Self {
        self.negate = !self.negate;
        self
    }

    /// Parse the rule-language form: `[!]@name [argument]`.
    ///
    /// The whole expression may be wrapped in double quotes, as it appears in
    /// a rule file. The argument is the rest of the text after the first run
    /// of whitespace, trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`OperatorError::InvalidConfig`] if the expression does not
    /// start with `@` or `!@`, or names no operator.
    ///
    /// # Example
    ///
    /// ```
    /// use ipmatch::OperatorConfig;
    ///
    /// let config = OperatorConfig::parse("!@ipMatch 10.0.0.0/8, 192.168.1.1").unwrap();
    /// assert_eq!(config.operator, "ipMatch");
    /// assert_eq!(config.argument, "10.0.0.0/8, 192.168.1.1");
    /// assert!(config.negate);
    /// ```
    pub fn parse(expression: &str) -> Result<Self, OperatorError> {
        let text = expression.trim();
        let text = text
            .strip_prefix('"')
            .and_then(|t| t.strip_suffix('"'))
            .unwrap_or(text)
            .trim();

        let (negate, text) = match text.strip_prefix('!') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, text),
        };

        let Some(text) = text.strip_prefix('@') else {
            return Err(OperatorError::InvalidConfig {
                reason: format!("operator expression \"{expression}\" must start with '@' or '!@'"),
            });
        };

        let (name, argument) = match text.split_once(char::is_whitespace) {
            Some((name, argument)) => (name, argument.trim()),
            None => (text, ""),
        };

        if name.is_empty() {
            return Err(OperatorError::InvalidConfig {
                reason: format!("operator expression \"{expression}\" names no operator"),
            });
        }

        Ok(Self {
            operator: name.to_owned(),
            argument: argument.to_owned(),
            negate,
        })
    }
}
