//! `IpMatcher`: the `@ipMatch` operator.
//!
//! Built once from a comma-separated list, immutable afterwards. Evaluation
//! parses the candidate on the stack and scans only the entries of the
//! candidate's family, returning on the first hit.

use std::net::IpAddr;
use std::str::FromStr;

use ipnet::{IpNet, Ipv4Net, Ipv6Net};

use crate::{IpEntry, Operator, ParseError};

/// Immutable set of IPv4/IPv6 addresses and CIDR ranges.
///
/// `IpMatcher` holds no interior mutability, so a shared reference can be
/// evaluated from any number of threads without synchronization.
///
/// # Example
///
/// ```
/// use ipmatch::IpMatcher;
///
/// let matcher = IpMatcher::parse("10.0.0.0/8, 192.168.1.1,").unwrap();
/// assert_eq!(matcher.len(), 2);
/// assert!(matcher.contains_str("10.20.30.40"));
/// assert!(matcher.contains_str("192.168.1.1"));
/// assert!(!matcher.contains_str("192.168.1.2"));
///
/// // One bad token rejects the whole list
/// assert!(IpMatcher::parse("10.0.0.0/8, 300.1.1.1").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct IpMatcher {
    /// All entries in insertion order.
    entries: Vec<IpEntry>,
    /// IPv4 entries in insertion order.
    v4: Vec<Ipv4Net>,
    /// IPv6 entries in insertion order.
    v6: Vec<Ipv6Net>,
}

impl IpMatcher {
    /// Parse a comma-separated list of addresses and CIDR ranges.
    ///
    /// Each token is trimmed; empty tokens are skipped so trailing commas and
    /// blank lines are harmless. The number of entries is not limited here;
    /// bound the input instead (see [`FsLoader::with_max_size`](crate::FsLoader::with_max_size)).
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidEntry`] for the first token that is not an
    /// address or CIDR range. No matcher is produced.
    pub fn parse(list: &str) -> Result<Self, ParseError> {
        let mut entries = Vec::new();

        for (index, raw) in list.split(',').enumerate() {
            let token = raw.trim();
            if token.is_empty() {
                continue;
            }
            let entry = IpEntry::parse(token).map_err(|source| ParseError::InvalidEntry {
                position: index + 1,
                token: token.to_owned(),
                source,
            })?;
            entries.push(entry);
        }

        let matcher = Self::from_entries(entries);
        if matcher.is_empty() {
            log::warn!("address list has no entries, the matcher will never match");
        }
        log::debug!(
            "built ip matcher with {} IPv4 and {} IPv6 entries",
            matcher.v4_len(),
            matcher.v6_len()
        );
        Ok(matcher)
    }

    /// Build a matcher from already-parsed entries, keeping their order.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = IpEntry>) -> Self {
        let entries: Vec<IpEntry> = entries.into_iter().collect();
        let mut v4 = Vec::new();
        let mut v6 = Vec::new();
        for entry in &entries {
            match *entry.as_net() {
                IpNet::V4(net) => v4.push(net),
                IpNet::V6(net) => v6.push(net),
            }
        }
        Self { entries, v4, v6 }
    }

    /// Returns `true` if `value` parses as an address inside any entry.
    ///
    /// A value that is not an address never matches. No trimming is applied.
    #[must_use]
    pub fn contains_str(&self, value: &str) -> bool {
        value
            .parse::<IpAddr>()
            .is_ok_and(|addr| self.contains(&addr))
    }

    /// Returns `true` if `addr` is inside any entry of the same family.
    #[must_use]
    pub fn contains(&self, addr: &IpAddr) -> bool {
        match addr {
            IpAddr::V4(addr) => self.v4.iter().any(|net| net.contains(addr)),
            IpAddr::V6(addr) => self.v6.iter().any(|net| net.contains(addr)),
        }
    }

    /// All entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[IpEntry] {
        &self.entries
    }

    /// Total number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the matcher has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of IPv4 entries.
    #[must_use]
    pub fn v4_len(&self) -> usize {
        self.v4.len()
    }

    /// Number of IPv6 entries.
    #[must_use]
    pub fn v6_len(&self) -> usize {
        self.v6.len()
    }
}

impl FromStr for IpMatcher {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<Tx: ?Sized> Operator<Tx> for IpMatcher {
    fn evaluate(&self, _tx: &Tx, value: &str) -> bool {
        self.contains_str(value)
    }

    fn name(&self) -> &'static str {
        "ipMatch"
    }
}
