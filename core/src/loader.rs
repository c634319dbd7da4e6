//! Content loading: how list resources become raw bytes.
//!
//! The loader adapter never touches the filesystem itself. It asks a
//! [`ContentLoader`] for the bytes behind an identifier and flattens them with
//! [`normalize_list`].

use std::collections::HashMap;
use std::fmt::Debug;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::LoadError;

/// Turns a resource identifier into raw bytes.
///
/// Called once per operator construction, never on the evaluation path.
/// Implementations may block; timeouts and size limits are theirs to enforce.
pub trait ContentLoader: Send + Sync + Debug {
    /// Load the resource named by `identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the resource is missing, unreadable, or rejected.
    fn load(&self, identifier: &str) -> Result<Vec<u8>, LoadError>;
}

impl<L: ContentLoader + ?Sized> ContentLoader for Arc<L> {
    fn load(&self, identifier: &str) -> Result<Vec<u8>, LoadError> {
        (**self).load(identifier)
    }
}

impl<L: ContentLoader + ?Sized> ContentLoader for &L {
    fn load(&self, identifier: &str) -> Result<Vec<u8>, LoadError> {
        (**self).load(identifier)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Filesystem
// ═══════════════════════════════════════════════════════════════════════════════

/// Loads resources from the local filesystem.
///
/// Relative identifiers resolve against the optional root directory (usually
/// the directory of the ruleset that references the list).
///
/// # Example
///
/// ```no_run
/// use ipmatch::{ContentLoader, FsLoader};
///
/// let loader = FsLoader::new()
///     .with_root("/etc/waf/rules")
///     .with_max_size(16 * 1024 * 1024);
/// let bytes = loader.load("lists/blocked-ips.txt")?;
/// # Ok::<(), ipmatch::LoadError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct FsLoader {
    root: Option<PathBuf>,
    max_size: Option<u64>,
}

impl FsLoader {
    /// Loader that resolves relative identifiers against the working directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative identifiers against `root`.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Reject resources larger than `bytes`.
    #[must_use]
    pub fn with_max_size(mut self, bytes: u64) -> Self {
        self.max_size = Some(bytes);
        self
    }

    /// The path an identifier resolves to.
    #[must_use]
    pub fn resolve(&self, identifier: &str) -> PathBuf {
        let path = Path::new(identifier);
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl ContentLoader for FsLoader {
    fn load(&self, identifier: &str) -> Result<Vec<u8>, LoadError> {
        let path = self.resolve(identifier);

        if let Some(max) = self.max_size {
            let size = std::fs::metadata(&path)
                .map_err(|e| io_error(identifier, e))?
                .len();
            if size > max {
                return Err(LoadError::TooLarge {
                    identifier: identifier.to_owned(),
                    size,
                    max,
                });
            }
        }

        std::fs::read(&path).map_err(|e| io_error(identifier, e))
    }
}

fn io_error(identifier: &str, source: io::Error) -> LoadError {
    let identifier = identifier.to_owned();
    match source.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound { identifier },
        io::ErrorKind::PermissionDenied => LoadError::PermissionDenied { identifier },
        _ => LoadError::Io { identifier, source },
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// In-memory
// ═══════════════════════════════════════════════════════════════════════════════

/// Serves resources from an in-memory map.
///
/// Useful for embedded rule bundles and tests.
///
/// ```
/// use ipmatch::{ContentLoader, MemoryLoader};
///
/// let loader = MemoryLoader::new().with("blocked.txt", "10.0.0.0/8\n");
/// assert_eq!(loader.load("blocked.txt").unwrap(), b"10.0.0.0/8\n");
/// assert!(loader.load("missing.txt").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    resources: HashMap<String, Vec<u8>>,
}

impl MemoryLoader {
    /// Create an empty loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource (builder pattern).
    #[must_use]
    pub fn with(mut self, identifier: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(identifier, content);
        self
    }

    /// Add or replace a resource.
    pub fn insert(&mut self, identifier: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.resources.insert(identifier.into(), content.into());
    }
}

impl ContentLoader for MemoryLoader {
    fn load(&self, identifier: &str) -> Result<Vec<u8>, LoadError> {
        self.resources
            .get(identifier)
            .cloned()
            .ok_or_else(|| LoadError::NotFound {
                identifier: identifier.to_owned(),
            })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Normalization
// ═══════════════════════════════════════════════════════════════════════════════

/// Flatten a one-entry-per-line list into the comma-separated form
/// [`IpMatcher::parse`](crate::IpMatcher::parse) expects.
///
/// `\r\n`, `\r` and `\n` each become a single `,`, so the token position
/// reported by a parse error is the line number. Invalid UTF-8 is replaced
/// (and then fails to parse as an address). A leading byte-order mark is dropped.
///
/// ```
/// use ipmatch::normalize_list;
///
/// assert_eq!(normalize_list(b"10.0.0.0/8\r\n192.168.1.1\n\n"), "10.0.0.0/8,192.168.1.1,,");
/// ```
#[must_use]
pub fn normalize_list(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    let text = text.strip_prefix('\u{feff}').unwrap_or(&*text);

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                chars.next_if_eq(&'\n');
                out.push(',');
            }
            '\n' => out.push(','),
            c => out.push(c),
        }
    }
    out
}
