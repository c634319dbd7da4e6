//! ipmatch-test: Test transaction context for conformance testing
//!
//! Provides a minimal transaction type and helpers for driving operators the
//! way a rule engine does: pull a variable out of the transaction, hand it to
//! the operator, treat a missing variable as a non-match.
//!
//! # Example
//!
//! ```
//! use ipmatch_test::prelude::*;
//!
//! let tx = TestTransaction::new()
//!     .with("REMOTE_ADDR", "10.1.2.3")
//!     .with("REQUEST_METHOD", "GET");
//!
//! let op = IpMatcher::parse("10.0.0.0/8").unwrap();
//! assert!(evaluate_variable(&op, &tx, "REMOTE_ADDR"));
//! assert!(!evaluate_variable(&op, &tx, "REQUEST_METHOD"));
//! assert!(!evaluate_variable(&op, &tx, "MISSING"));
//! ```

use ipmatch::prelude::*;
use std::collections::HashMap;


/// Test transaction: a simple variable-name-to-value map.
///
/// Used for conformance testing where we need predictable,
/// controllable request data.
#[derive(Debug, Clone, Default)]
pub struct TestTransaction {
    variables: HashMap<String, String>,
}

impl TestTransaction {
    /// Create an empty transaction.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable (builder pattern).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Get a variable by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }
}

/// Evaluate `operator` against the transaction variable `name`.
///
/// A variable that is not set never matches, even for a negated operator.
pub fn evaluate_variable<O>(operator: &O, tx: &TestTransaction, name: &str) -> bool
where
    O: Operator<TestTransaction> + ?Sized,
{
    tx.get(name)
        .is_some_and(|value| operator.evaluate(tx, value))
}

/// Render an error and every `source()` below it, joined with `": "`.
///
/// ```
/// use ipmatch_test::{error_chain, prelude::*};
///
/// let err = IpMatcher::parse("10.0.0.0/33").unwrap_err();
/// assert_eq!(
///     error_chain(&err),
///     "invalid entry 1 \"10.0.0.0/33\": prefix length 33 exceeds 32 for IPv4"
/// );
/// ```
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    std::iter::successors(Some(err), |e| e.source())
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}

/// Register the operators used by the conformance fixtures.
#[must_use]
pub fn register(builder: RegistryBuilder<TestTransaction>) -> RegistryBuilder<TestTransaction> {
    ipmatch::register_ip_operators(builder)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{error_chain, evaluate_variable, register, TestTransaction};
    pub use ipmatch::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_get() {
        let tx = TestTransaction::new().with("REMOTE_ADDR", "::1");
        assert_eq!(tx.get("REMOTE_ADDR"), Some("::1"));
        assert_eq!(tx.get("remote_addr"), None);
    }

    #[test]
    fn test_missing_variable_never_matches() {
        let tx = TestTransaction::new();
        let op = Negated::new(IpMatcher::parse("10.0.0.0/8").unwrap());
        assert!(!evaluate_variable(&op, &tx, "REMOTE_ADDR"));
    }

    #[test]
    fn test_error_chain_of_file_list() {
        let registry = register(RegistryBuilder::new())
            .loader(MemoryLoader::new().with("deny.txt", "::1\n2001:db8::/200\n"))
            .build();
        let err = registry.load_rule("@ipMatchF deny.txt").unwrap_err();
        assert_eq!(
            error_chain(&err),
            "invalid address list in \"deny.txt\": invalid entry 2 \"2001:db8::/200\": \
             prefix length 200 exceeds 128 for IPv6"
        );
    }

    #[test]
    fn test_registered_operators_over_dyn() {
        let registry = register(RegistryBuilder::new())
            .loader(MemoryLoader::new().with("allow.txt", "127.0.0.1\n::1\n"))
            .build();
        let op = registry.load_rule("@ipMatchFromFile allow.txt").unwrap();

        let tx = TestTransaction::new().with("REMOTE_ADDR", "::1");
        assert!(evaluate_variable(op.as_ref(), &tx, "REMOTE_ADDR"));
    }
}
