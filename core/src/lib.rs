//! ipmatch - IP address and CIDR membership operators for WAF rule engines
//!
//! Answers "is this address in the configured set?" for both IPv4 and IPv6,
//! on the hot path of every inspected transaction.
//!
//! # Architecture
//!
//! - [`IpEntry`]: One parsed address or CIDR range (masked network + prefix length)
//! - [`IpMatcher`]: Immutable set of entries with a pure membership test (`@ipMatch`)
//! - [`IpMatchFromFile`]: Loader adapter: fetches a list through a [`ContentLoader`],
//!   flattens it, and owns the resulting `IpMatcher` (`@ipMatchFromFile`)
//! - [`Operator<Tx>`]: The uniform seam every rule operator implements
//! - [`OperatorSlot<T>`]: Atomically swappable operator for configuration reload
//! - [`Registry<Tx>`]: Builds operators by name from [`OperatorConfig`]
//!
//! # Key Design Insights
//!
//! 1. **Construction is initialization**: an operator value only exists once its
//!    configuration parsed. There is no half-built state to evaluate against.
//!
//! 2. **Evaluation never fails**: request data is untrusted. A candidate that is not
//!    an address is a negative match, never an error.
//!
//! 3. **Reload swaps, never mutates**: a new operator is built on the side and swapped
//!    in; evaluations already running keep the old snapshot alive.
//!
//! # Example
//!
//! ```
//! use ipmatch::prelude::*;
//!
//! let matcher = IpMatcher::parse("192.168.0.0/16, 2001:db8::/32").unwrap();
//!
//! assert!(matcher.evaluate(&(), "192.168.5.5"));
//! assert!(matcher.evaluate(&(), "2001:db8::1"));
//! assert!(!matcher.evaluate(&(), "10.1.1.1"));
//! assert!(!matcher.evaluate(&(), "not-an-ip"));
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod config;
mod entry;
mod from_file;
mod ip_matcher;
mod loader;
mod operator;
mod registry;
mod slot;

#[cfg(test)]
mod properties;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

pub use config::OperatorConfig;
pub use entry::{IpEntry, IpFamily};
pub use from_file::IpMatchFromFile;
pub use ip_matcher::IpMatcher;
pub use loader::{normalize_list, ContentLoader, FsLoader, MemoryLoader};
pub use operator::{Negated, Operator};
pub use registry::{register_ip_operators, InitEnv, IntoOperator, Registry, RegistryBuilder};
pub use slot::OperatorSlot;

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use ipmatch::prelude::*;
///
/// let registry: Registry<()> = ipmatch::register_ip_operators(RegistryBuilder::new())
///     .loader(MemoryLoader::new().with("deny.txt", "203.0.113.0/24\n"))
///     .build();
/// let op = registry.load(&OperatorConfig::new("ipMatchFromFile", "deny.txt")).unwrap();
/// let slot = OperatorSlot::new(op);
/// assert!(slot.evaluate(&(), "203.0.113.7"));
///
/// let err: OperatorError = registry.load_rule("@ipMatch nope").unwrap_err();
/// assert!(matches!(err, OperatorError::Parse(ParseError::InvalidEntry { position: 1, .. })));
/// ```
pub mod prelude {
    pub use crate::{
        // Core types
        IpEntry,
        IpFamily,
        IpMatchFromFile,
        IpMatcher,
        Negated,
        OperatorSlot,
        // Traits
        ContentLoader,
        Operator,
        // Loaders
        FsLoader,
        MemoryLoader,
        // Errors
        LoadError,
        OperatorError,
        ParseError,
        // Registry
        OperatorConfig,
        Registry,
        RegistryBuilder,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Why a single address token was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntryError {
    /// The address part is neither an IPv4 nor an IPv6 address.
    #[error("not a valid IPv4 or IPv6 address")]
    InvalidAddress,
    /// The text after `/` is not a decimal prefix length.
    #[error("prefix length \"{prefix}\" is not a decimal number")]
    MalformedPrefix {
        /// The raw prefix text.
        prefix: String,
    },
    /// The prefix length is larger than the address family allows.
    #[error("prefix length {prefix} exceeds {max} for {family}")]
    PrefixOutOfRange {
        /// The raw prefix text.
        prefix: String,
        /// Maximum prefix length for the detected family.
        max: u8,
        /// The family detected from the address part.
        family: IpFamily,
    },
}

/// Errors from parsing an address list into an [`IpMatcher`].
///
/// A single bad token fails the whole list. There is no partial matcher.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A token could not be parsed as an address or CIDR range.
    #[error("invalid entry {position} \"{token}\"")]
    InvalidEntry {
        /// 1-based position of the token in the comma-separated list.
        /// For a list file this is the line number.
        position: usize,
        /// The trimmed token.
        token: String,
        /// What was wrong with it.
        #[source]
        source: EntryError,
    },
}

/// Errors from the content-loading collaborator.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Nothing exists under the identifier.
    #[error("error opening \"{identifier}\": not found")]
    NotFound {
        /// The requested identifier.
        identifier: String,
    },
    /// The resource exists but may not be read.
    #[error("error opening \"{identifier}\": permission denied")]
    PermissionDenied {
        /// The requested identifier.
        identifier: String,
    },
    /// The resource is larger than the loader accepts.
    #[error("error opening \"{identifier}\": {size} bytes, but maximum allowed is {max}")]
    TooLarge {
        /// The requested identifier.
        identifier: String,
        /// Actual size in bytes.
        size: u64,
        /// Maximum allowed size in bytes.
        max: u64,
    },
    /// Any other I/O failure.
    #[error("error opening \"{identifier}\"")]
    Io {
        /// The requested identifier.
        identifier: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    /// The identifier that failed to load.
    #[must_use]
    pub fn identifier(&self) -> &str {
        match self {
            Self::NotFound { identifier }
            | Self::PermissionDenied { identifier }
            | Self::TooLarge { identifier, .. }
            | Self::Io { identifier, .. } => identifier,
        }
    }
}

/// Errors from operator construction.
///
/// These are raised at rule-load time and abort setup of the rule. Fix the
/// configuration and build the operator again.
#[derive(Debug, thiserror::Error)]
pub enum OperatorError {
    /// An inline address list is invalid.
    #[error("invalid address list")]
    Parse(#[from] ParseError),
    /// An address list loaded from a resource is invalid.
    #[error("invalid address list in \"{identifier}\"")]
    InvalidList {
        /// The resource the list came from.
        identifier: String,
        /// The parse failure.
        #[source]
        source: ParseError,
    },
    /// The resource could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// No operator is registered under the name.
    #[error("unknown operator \"@{name}\"{}", registered_suffix(.available))]
    UnknownOperator {
        /// The requested operator name.
        name: String,
        /// Operator names that ARE registered.
        available: Vec<String>,
    },
    /// The operator configuration itself is malformed.
    #[error("invalid operator config: {reason}")]
    InvalidConfig {
        /// What was wrong.
        reason: String,
    },
}

fn registered_suffix(available: &[String]) -> String {
    if available.is_empty() {
        "; no operators are registered".to_owned()
    } else {
        format!("; registered: {}", available.join(", "))
    }
}
