//! `OperatorSlot`: atomic replacement of a built operator.
//!
//! Configuration reload builds a new operator on the side and swaps the
//! shared reference. Evaluation reads the current pointer without taking a
//! lock, so an in-flight evaluation finishes against the operator it started
//! with while new calls see the replacement.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::Operator;

/// A swappable, shareable operator.
///
/// # Example
///
/// ```
/// use ipmatch::{IpMatcher, Operator, OperatorSlot};
///
/// let slot = OperatorSlot::new(IpMatcher::parse("10.0.0.0/8").unwrap());
/// let before = slot.load();
///
/// slot.store(IpMatcher::parse("192.168.0.0/16").unwrap());
///
/// assert!(before.contains_str("10.1.1.1"));        // old snapshot still valid
/// assert!(!slot.evaluate(&(), "10.1.1.1"));         // new calls see the new list
/// assert!(slot.evaluate(&(), "192.168.1.1"));
/// ```
#[derive(Debug)]
pub struct OperatorSlot<T> {
    current: ArcSwap<T>,
}

impl<T> OperatorSlot<T> {
    /// Create a slot holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            current: ArcSwap::from_pointee(value),
        }
    }

    /// Owned snapshot of the current value.
    #[must_use]
    pub fn load(&self) -> Arc<T> {
        self.current.load_full()
    }

    /// Replace the current value, returning the previous one.
    pub fn store(&self, value: T) -> Arc<T> {
        self.current.swap(Arc::new(value))
    }

    /// Build a replacement from the current value and swap it in on success.
    ///
    /// On failure the current value stays in place and the error is returned.
    ///
    /// # Errors
    ///
    /// Whatever `build` returns.
    pub fn try_reload<E, F>(&self, build: F) -> Result<Arc<T>, E>
    where
        E: std::fmt::Display,
        F: FnOnce(&T) -> Result<T, E>,
    {
        let current = self.load();
        match build(&current) {
            Ok(next) => {
                log::info!("operator reloaded");
                Ok(self.store(next))
            }
            Err(e) => {
                log::warn!("operator reload rejected, keeping current: {e}");
                Err(e)
            }
        }
    }
}

impl<Tx: ?Sized, T: Operator<Tx>> Operator<Tx> for OperatorSlot<T> {
    fn evaluate(&self, tx: &Tx, value: &str) -> bool {
        let current = self.current.load();
        Operator::<Tx>::evaluate(&**current, tx, value)
    }

    fn name(&self) -> &'static str {
        let current = self.current.load();
        Operator::<Tx>::name(&**current)
    }
}
