//! `IpEntry`: one parsed address or CIDR range.
//!
//! Address parsing is delegated to `std::net`; range arithmetic to `ipnet`.
//! The stored network is always truncated to its prefix, so membership is a
//! plain prefix comparison.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use ipnet::IpNet;

use crate::EntryError;

/// Address family of an entry or candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpFamily {
    /// IPv4, 32-bit addresses.
    V4,
    /// IPv6, 128-bit addresses.
    V6,
}

impl IpFamily {
    /// Width of an address of this family in bits.
    ///
    /// This is also the prefix length of an exact-match entry.
    #[must_use]
    pub const fn width(self) -> u8 {
        match self {
            Self::V4 => 32,
            Self::V6 => 128,
        }
    }

    /// Family of the given address.
    #[must_use]
    pub const fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => Self::V4,
            IpAddr::V6(_) => Self::V6,
        }
    }
}

impl fmt::Display for IpFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4 => f.write_str("IPv4"),
            Self::V6 => f.write_str("IPv6"),
        }
    }
}

/// One address specification inside an [`IpMatcher`](crate::IpMatcher).
///
/// A bare address is stored with a full-width prefix (exact match). A CIDR
/// expression is stored with its network masked to the prefix, so
/// `10.1.2.3/8` and `10.0.0.0/8` are the same entry.
///
/// # Example
///
/// ```
/// use ipmatch::{IpEntry, IpFamily};
///
/// let entry: IpEntry = "10.1.2.3/8".parse().unwrap();
/// assert_eq!(entry.network().to_string(), "10.0.0.0");
/// assert_eq!(entry.prefix_len(), 8);
/// assert_eq!(entry.family(), IpFamily::V4);
/// assert!(entry.contains(&"10.200.0.1".parse().unwrap()));
///
/// let host: IpEntry = "2001:db8::1".parse().unwrap();
/// assert!(host.is_exact());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpEntry {
    net: IpNet,
}

impl IpEntry {
    /// Build an entry from an address and prefix length.
    ///
    /// The network is masked to `prefix_len`.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::PrefixOutOfRange`] if `prefix_len` exceeds the
    /// width of the address family.
    pub fn new(addr: IpAddr, prefix_len: u8) -> Result<Self, EntryError> {
        IpNet::new(addr, prefix_len)
            .map(|net| Self { net: net.trunc() })
            .map_err(|_| {
                let family = IpFamily::of(&addr);
                EntryError::PrefixOutOfRange {
                    prefix: prefix_len.to_string(),
                    max: family.width(),
                    family,
                }
            })
    }

    /// Parse a single trimmed token: `<address>` or `<address>/<prefix>`.
    ///
    /// The prefix must be plain decimal digits. Signs, whitespace, and hex
    /// are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError`] describing which part of the token is invalid.
    pub fn parse(token: &str) -> Result<Self, EntryError> {
        let (address, prefix) = match token.split_once('/') {
            Some((address, prefix)) => (address, Some(prefix)),
            None => (token, None),
        };

        let addr: IpAddr = address.parse().map_err(|_| EntryError::InvalidAddress)?;
        let family = IpFamily::of(&addr);

        let prefix_len = match prefix {
            None => family.width(),
            Some(text) => parse_prefix(text, family)?,
        };

        Self::new(addr, prefix_len)
    }

    /// The masked base address.
    #[must_use]
    pub fn network(&self) -> IpAddr {
        self.net.network()
    }

    /// Number of leading bits a candidate must share with [`network`](Self::network).
    #[must_use]
    pub fn prefix_len(&self) -> u8 {
        self.net.prefix_len()
    }

    /// Address family of this entry.
    #[must_use]
    pub fn family(&self) -> IpFamily {
        match self.net {
            IpNet::V4(_) => IpFamily::V4,
            IpNet::V6(_) => IpFamily::V6,
        }
    }

    /// Returns `true` if this entry matches exactly one address.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.prefix_len() == self.family().width()
    }

    /// Returns `true` if `addr` falls inside this entry.
    ///
    /// Always `false` when the families differ.
    #[must_use]
    pub fn contains(&self, addr: &IpAddr) -> bool {
        self.net.contains(addr)
    }

    /// The underlying network.
    #[must_use]
    pub fn as_net(&self) -> &IpNet {
        &self.net
    }
}

impl FromStr for IpEntry {
    type Err = EntryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for IpEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.net, f)
    }
}

fn parse_prefix(text: &str, family: IpFamily) -> Result<u8, EntryError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EntryError::MalformedPrefix {
            prefix: text.to_owned(),
        });
    }

    let max = family.width();
    text.parse::<u8>()
        .ok()
        .filter(|len| *len <= max)
        .ok_or_else(|| EntryError::PrefixOutOfRange {
            prefix: text.to_owned(),
            max,
            family,
        })
}
