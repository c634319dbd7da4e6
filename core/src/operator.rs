//! `Operator`: the uniform seam between the rule engine and its operators.
//!
//! The rule engine holds a collection of `Box<dyn Operator<Tx>>` and calls
//! [`evaluate`](Operator::evaluate) without knowing which operator it is.
//! Initialization is construction: an operator value only exists once its
//! configuration was accepted (see [`IntoOperator`](crate::IntoOperator)).

use std::fmt::Debug;
use std::sync::Arc;

/// A rule operator evaluated against one candidate value.
///
/// `Tx` is the engine's per-request transaction state. Operators that do not
/// need it (like [`IpMatcher`](crate::IpMatcher)) accept any `Tx`.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`: the engine evaluates one
/// operator from many in-flight requests at once.
///
/// # Example
///
/// ```
/// use ipmatch::{IpMatcher, Operator};
///
/// let ops: Vec<Box<dyn Operator<()>>> = vec![
///     Box::new(IpMatcher::parse("10.0.0.0/8").unwrap()),
///     Box::new(IpMatcher::parse("::1").unwrap()),
/// ];
/// assert!(ops.iter().any(|op| op.evaluate(&(), "::1")));
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Operator<{Tx}>`",
    label = "this type cannot be evaluated as a rule operator",
    note = "implement `evaluate(&self, &Tx, &str) -> bool` and `name(&self) -> &'static str`"
)]
pub trait Operator<Tx: ?Sized>: Send + Sync + Debug {
    /// Evaluate the operator against `value`.
    ///
    /// Never fails. Input the operator cannot interpret is a non-match.
    fn evaluate(&self, tx: &Tx, value: &str) -> bool;

    /// The rule-language name of this operator, without the `@`.
    fn name(&self) -> &'static str;
}

// Blanket implementation for boxed operators
#[diagnostic::do_not_recommend]
impl<Tx: ?Sized> Operator<Tx> for Box<dyn Operator<Tx>> {
    fn evaluate(&self, tx: &Tx, value: &str) -> bool {
        (**self).evaluate(tx, value)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<Tx: ?Sized, T: Operator<Tx> + ?Sized> Operator<Tx> for Arc<T> {
    fn evaluate(&self, tx: &Tx, value: &str) -> bool {
        (**self).evaluate(tx, value)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Inverts another operator (`!@op` in rule syntax).
///
/// # Example
///
/// ```
/// use ipmatch::{IpMatcher, Negated, Operator};
///
/// let not_internal = Negated::new(IpMatcher::parse("10.0.0.0/8").unwrap());
/// assert!(not_internal.evaluate(&(), "8.8.8.8"));
/// assert!(!not_internal.evaluate(&(), "10.0.0.1"));
/// ```
#[derive(Debug, Clone)]
pub struct Negated<O> {
    inner: O,
}

impl<O> Negated<O> {
    /// Wrap an operator.
    pub fn new(inner: O) -> Self {
        Self { inner }
    }

    /// The wrapped operator.
    pub fn inner(&self) -> &O {
        &self.inner
    }
}

impl<Tx: ?Sized, O: Operator<Tx>> Operator<Tx> for Negated<O> {
    fn evaluate(&self, tx: &Tx, value: &str) -> bool {
        !self.inner.evaluate(tx, value)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
