//! `IpMatchFromFile`: the `@ipMatchFromFile` operator.
//!
//! Fetches a one-entry-per-line list through a [`ContentLoader`], flattens it
//! and owns the resulting [`IpMatcher`]. Evaluation is a pass-through.

use crate::{normalize_list, ContentLoader, IpMatcher, Operator, OperatorError};

/// Address list loaded from an external resource.
///
/// # Example
///
/// ```
/// use ipmatch::{IpMatchFromFile, MemoryLoader, Operator};
///
/// let loader = MemoryLoader::new().with("blocked.txt", "10.0.0.0/8\n192.168.1.1\n");
/// let op = IpMatchFromFile::load("blocked.txt", &loader).unwrap();
///
/// assert_eq!(op.identifier(), "blocked.txt");
/// assert!(op.evaluate(&(), "10.9.8.7"));
/// assert!(!op.evaluate(&(), "192.168.1.2"));
/// ```
#[derive(Debug, Clone)]
pub struct IpMatchFromFile {
    identifier: String,
    matcher: IpMatcher,
}

impl IpMatchFromFile {
    /// Load, flatten and parse the list named by `identifier`.
    ///
    /// # Errors
    ///
    /// - [`OperatorError::Load`] if the loader cannot produce the resource.
    /// - [`OperatorError::InvalidList`] if any line is not an address or CIDR
    ///   range; the error names the identifier and the offending line.
    pub fn load<L>(identifier: impl Into<String>, loader: &L) -> Result<Self, OperatorError>
    where
        L: ContentLoader + ?Sized,
    {
        let identifier = identifier.into();
        let raw = loader.load(&identifier)?;
        let list = normalize_list(&raw);

        let matcher = IpMatcher::parse(&list).map_err(|source| OperatorError::InvalidList {
            identifier: identifier.clone(),
            source,
        })?;

        log::info!(
            "loaded {} address entries from \"{identifier}\"",
            matcher.len()
        );
        Ok(Self {
            identifier,
            matcher,
        })
    }

    /// Build a fresh operator from the same identifier.
    ///
    /// `self` is left untouched, so a failed reload never disturbs evaluations
    /// running against the current list.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub fn reload<L>(&self, loader: &L) -> Result<Self, OperatorError>
    where
        L: ContentLoader + ?Sized,
    {
        Self::load(self.identifier.clone(), loader)
    }

    /// The identifier the list was loaded from.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The owned matcher.
    #[must_use]
    pub fn matcher(&self) -> &IpMatcher {
        &self.matcher
    }
}

impl<Tx: ?Sized> Operator<Tx> for IpMatchFromFile {
    fn evaluate(&self, _tx: &Tx, value: &str) -> bool {
        self.matcher.contains_str(value)
    }

    fn name(&self) -> &'static str {
        "ipMatchFromFile"
    }
}
