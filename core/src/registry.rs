//! Operator registry for config-driven construction.
//!
//! The rule engine knows operators only by name. Each operator type registers
//! itself via [`IntoOperator`]; at registration time the concrete type is
//! monomorphized into a factory and erased behind `Box<dyn Fn>`. At rule-load
//! time the registry looks up the name, runs the factory with the rule's
//! argument, and hands back a `Box<dyn Operator<Tx>>`.
//!
//! # Example
//!
//! ```
//! use ipmatch::{register_ip_operators, MemoryLoader, Operator, OperatorConfig, RegistryBuilder};
//!
//! let registry = register_ip_operators(RegistryBuilder::<()>::new())
//!     .loader(MemoryLoader::new().with("bad.txt", "203.0.113.0/24\n"))
//!     .build();
//!
//! let inline = registry.load_rule("@ipMatch 10.0.0.0/8").unwrap();
//! let from_file = registry.load(&OperatorConfig::new("ipMatchFromFile", "bad.txt")).unwrap();
//!
//! assert!(inline.evaluate(&(), "10.1.2.3"));
//! assert!(from_file.evaluate(&(), "203.0.113.9"));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    ContentLoader, FsLoader, IpMatchFromFile, IpMatcher, Negated, Operator, OperatorConfig,
    OperatorError,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Traits
// ═══════════════════════════════════════════════════════════════════════════════

/// What an operator factory may use while building.
///
/// Holds the [`ContentLoader`] that file-backed operators fetch their lists
/// through.
#[derive(Debug, Clone)]
pub struct InitEnv {
    loader: Arc<dyn ContentLoader>,
}

impl InitEnv {
    /// Environment backed by the given loader.
    pub fn new(loader: impl ContentLoader + 'static) -> Self {
        Self {
            loader: Arc::new(loader),
        }
    }

    /// Environment sharing an existing loader.
    #[must_use]
    pub fn from_shared(loader: Arc<dyn ContentLoader>) -> Self {
        Self { loader }
    }

    /// The content loader.
    #[must_use]
    pub fn loader(&self) -> &dyn ContentLoader {
        self.loader.as_ref()
    }
}

impl Default for InitEnv {
    fn default() -> Self {
        Self::new(FsLoader::new())
    }
}

/// Trait for operator types that can be constructed from a rule argument.
///
/// This is the `Init(config) -> Result` half of the operator contract: an
/// operator value only exists if `from_config` accepted the argument.
///
/// # Example
///
/// ```
/// use ipmatch::{InitEnv, IntoOperator, Operator, OperatorError};
///
/// #[derive(Debug)]
/// struct Equals(String);
///
/// impl<Tx: ?Sized> Operator<Tx> for Equals {
///     fn evaluate(&self, _tx: &Tx, value: &str) -> bool { value == self.0 }
///     fn name(&self) -> &'static str { "eq" }
/// }
///
/// impl<Tx: ?Sized + 'static> IntoOperator<Tx> for Equals {
///     fn from_config(argument: &str, _env: &InitEnv) -> Result<Box<dyn Operator<Tx>>, OperatorError> {
///         Ok(Box::new(Equals(argument.to_owned())))
///     }
/// }
/// ```
pub trait IntoOperator<Tx: ?Sized + 'static>: Send + Sync + 'static {
    /// Construct the operator from its rule argument.
    ///
    /// # Errors
    ///
    /// Returns [`OperatorError`] if the argument is invalid or a resource it
    /// names cannot be loaded.
    fn from_config(argument: &str, env: &InitEnv) -> Result<Box<dyn Operator<Tx>>, OperatorError>;
}

impl<Tx: ?Sized + 'static> IntoOperator<Tx> for IpMatcher {
    fn from_config(argument: &str, _env: &InitEnv) -> Result<Box<dyn Operator<Tx>>, OperatorError> {
        Ok(Box::new(IpMatcher::parse(argument)?))
    }
}

impl<Tx: ?Sized + 'static> IntoOperator<Tx> for IpMatchFromFile {
    fn from_config(argument: &str, env: &InitEnv) -> Result<Box<dyn Operator<Tx>>, OperatorError> {
        let identifier = argument.trim();
        if identifier.is_empty() {
            return Err(OperatorError::InvalidConfig {
                reason: "@ipMatchFromFile requires a resource identifier".to_owned(),
            });
        }
        Ok(Box::new(IpMatchFromFile::load(identifier, env.loader())?))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════════════════════════

/// Type-erased operator factory.
type BoxedOperatorFactory<Tx> =
    Box<dyn Fn(&str, &InitEnv) -> Result<Box<dyn Operator<Tx>>, OperatorError> + Send + Sync>;

/// Builder for constructing a [`Registry`].
///
/// Register operator types by name, then call [`build()`](Self::build) to
/// produce an immutable `Registry`. No registration is possible afterwards.
pub struct RegistryBuilder<Tx: ?Sized + 'static> {
    factories: HashMap<String, BoxedOperatorFactory<Tx>>,
    env: InitEnv,
}

impl<Tx: ?Sized + 'static> RegistryBuilder<Tx> {
    /// Create an empty builder using the filesystem loader.
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            env: InitEnv::default(),
        }
    }

    /// Register operator type `T` under `name` (without the `@`).
    ///
    /// Registering the same name twice keeps the last registration.
    #[must_use]
    pub fn operator<T: IntoOperator<Tx>>(mut self, name: &str) -> Self {
        self.factories.insert(
            name.to_owned(),
            Box::new(|argument: &str, env: &InitEnv| T::from_config(argument, env)),
        );
        self
    }

    /// Use `loader` for operators that fetch external resources.
    #[must_use]
    pub fn loader(mut self, loader: impl ContentLoader + 'static) -> Self {
        self.env = InitEnv::new(loader);
        self
    }

    /// Use a complete init environment.
    #[must_use]
    pub fn env(mut self, env: InitEnv) -> Self {
        self.env = env;
        self
    }

    /// Freeze the registry.
    #[must_use]
    pub fn build(self) -> Registry<Tx> {
        Registry {
            factories: self.factories,
            env: self.env,
        }
    }
}

impl<Tx: ?Sized + 'static> Default for RegistryBuilder<Tx> {
    fn default() -> Self {
        Self::new()
    }
}

/// Register the IP membership operators.
///
/// | Name | Operator |
/// |------|----------|
/// | `ipMatch` | [`IpMatcher`], inline comma-separated list |
/// | `ipMatchFromFile` | [`IpMatchFromFile`], list resource, one entry per line |
/// | `ipMatchF` | short alias of `ipMatchFromFile` |
#[must_use]
pub fn register_ip_operators<Tx: ?Sized + 'static>(
    builder: RegistryBuilder<Tx>,
) -> RegistryBuilder<Tx> {
    builder
        .operator::<IpMatcher>("ipMatch")
        .operator::<IpMatchFromFile>("ipMatchFromFile")
        .operator::<IpMatchFromFile>("ipMatchF")
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════════════

/// Immutable registry of operator factories.
///
/// Constructed via [`RegistryBuilder`]. Safe to share between threads that
/// load rules concurrently.
pub struct Registry<Tx: ?Sized + 'static> {
    factories: HashMap<String, BoxedOperatorFactory<Tx>>,
    env: InitEnv,
}

impl<Tx: ?Sized + 'static> Registry<Tx> {
    /// Build the operator described by `config`.
    ///
    /// # Errors
    ///
    /// - [`OperatorError::UnknownOperator`] if the name is not registered
    /// - Whatever the operator's factory returns for an invalid argument
    pub fn load(&self, config: &OperatorConfig) -> Result<Box<dyn Operator<Tx>>, OperatorError> {
        let factory = self
            .factories
            .get(&config.operator)
            .ok_or_else(|| OperatorError::UnknownOperator {
                name: config.operator.clone(),
                available: self.names().into_iter().map(str::to_owned).collect(),
            })?;

        let operator = factory(&config.argument, &self.env)?;
        log::debug!(
            "loaded operator {}@{}",
            if config.negate { "!" } else { "" },
            config.operator
        );

        if config.negate {
            Ok(Box::new(Negated::new(operator)))
        } else {
            Ok(operator)
        }
    }

    /// Parse a rule-language operator expression and build it.
    ///
    /// # Errors
    ///
    /// Same as [`OperatorConfig::parse`] and [`load`](Self::load).
    pub fn load_rule(&self, expression: &str) -> Result<Box<dyn Operator<Tx>>, OperatorError> {
        self.load(&OperatorConfig::parse(expression)?)
    }

    /// Returns `true` if an operator is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered operator names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered operators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` if no operators are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// The environment factories are run with.
    #[must_use]
    pub fn env(&self) -> &InitEnv {
        &self.env
    }
}
