//! Named parser instances.
//!
//! A [`ParserDirectory`] maps identifiers to independent [`ShortcodeParser`]s
//! so unrelated subsystems can register shortcodes without clashing. One
//! identifier is marked active; [`ParserDirectory::get_active`] resolves it.
//!
//! Instances are created on first lookup and live as long as the directory.
//! [`ParserDirectory::global`] provides a process-wide directory; tests and
//! embedders usually construct their own.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{Attributes, ParserOptions, RegistryError, ShortcodeHandler, ShortcodeParser};

/// Identifier of the instance that is active when a directory is created.
pub const DEFAULT_IDENTIFIER: &str = "default";

static GLOBAL: LazyLock<ParserDirectory> = LazyLock::new(ParserDirectory::new);

/// Cloneable handle to a parser stored in a [`ParserDirectory`].
///
/// Clones refer to the same parser, so registrations through one handle are
/// visible through all others.
///
/// # Thread Safety
///
/// The parser sits behind an `RwLock`. [`parse`](Self::parse) holds the read
/// lock while handlers run, so a handler must not register shortcodes through
/// a handle to the same instance. Handlers re-parse content through the
/// `&ShortcodeParser` they receive instead.
#[derive(Debug, Clone)]
pub struct SharedParser {
    inner: Arc<RwLock<ShortcodeParser>>,
}

impl SharedParser {
    /// Wrap a parser in a shared handle.
    #[must_use]
    pub fn new(parser: ShortcodeParser) -> Self {
        Self {
            inner: Arc::new(RwLock::new(parser)),
        }
    }

    /// Register a handler. See [`ShortcodeParser::register`].
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub fn register<H: ShortcodeHandler + 'static>(&self, name: impl Into<String>, handler: H) {
        self.write().register(name, handler);
    }

    /// Register a closure handler. See [`ShortcodeParser::register_fn`].
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub fn register_fn<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&Attributes, Option<&str>, &ShortcodeParser, &str) -> String
            + Send
            + Sync
            + 'static,
    {
        self.write().register_fn(name, handler);
    }

    /// Register a handler, reporting rejected names.
    ///
    /// # Errors
    ///
    /// See [`ShortcodeParser::try_register`].
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub fn try_register<H: ShortcodeHandler + 'static>(
        &self,
        name: impl Into<String>,
        handler: H,
    ) -> Result<(), RegistryError> {
        self.write().try_register(name, handler)
    }

    /// Check whether a shortcode is registered.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn registered(&self, name: &str) -> bool {
        self.read().registered(name)
    }

    /// Remove a shortcode.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub fn unregister(&self, name: &str) {
        self.write().unregister(name);
    }

    /// Remove all shortcodes.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Replace every registered shortcode in `content`.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn parse(&self, content: &str) -> String {
        self.read().parse(content)
    }

    /// Lock the parser for reading.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub fn read(&self) -> RwLockReadGuard<'_, ShortcodeParser> {
        self.inner.read().unwrap()
    }

    /// Lock the parser for writing, e.g. to register several shortcodes at once.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub fn write(&self) -> RwLockWriteGuard<'_, ShortcodeParser> {
        self.inner.write().unwrap()
    }

    /// Whether both handles refer to the same parser.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Set of named [`ShortcodeParser`] instances with one active identifier.
///
/// # Thread Safety
///
/// The directory is `Send + Sync`. Lookups take a read lock and only fall
/// back to a write lock when an instance has to be created.
///
/// # Example
///
/// ```
/// use shortcode::ParserDirectory;
///
/// let directory = ParserDirectory::new();
/// directory.get("blog").register_fn("year", |_, _, _, _| "2024".to_owned());
///
/// assert_eq!(directory.get("blog").parse("[year /]"), "2024");
/// assert_eq!(directory.get_active().parse("[year /]"), "[year /]");
///
/// directory.set_active("blog");
/// assert_eq!(directory.get_active().parse("[year /]"), "2024");
/// ```
#[derive(Debug)]
pub struct ParserDirectory {
    instances: RwLock<HashMap<String, SharedParser>>,
    active: RwLock<String>,
    options: ParserOptions,
}

impl Default for ParserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserDirectory {
    /// Create an empty directory whose active identifier is [`DEFAULT_IDENTIFIER`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(ParserOptions::default())
    }

    /// Create an empty directory whose instances are created with `options`.
    #[must_use]
    pub fn with_options(options: ParserOptions) -> Self {
        Self {
            instances: RwLock::new(HashMap::new()),
            active: RwLock::new(DEFAULT_IDENTIFIER.to_owned()),
            options,
        }
    }

    /// Process-wide directory, created on first use.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Options applied to newly created instances.
    #[must_use]
    pub fn options(&self) -> ParserOptions {
        self.options
    }

    /// Get the parser for `identifier`, creating it on first request.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn get(&self, identifier: &str) -> SharedParser {
        if let Some(parser) = self.instances.read().unwrap().get(identifier) {
            return parser.clone();
        }

        let mut instances = self.instances.write().unwrap();
        instances
            .entry(identifier.to_owned())
            .or_insert_with(|| {
                tracing::debug!(identifier = %identifier, "Parser instance created");
                SharedParser::new(ShortcodeParser::with_options(self.options))
            })
            .clone()
    }

    /// Get the parser for the active identifier.
    ///
    /// # Panics
    ///
    /// Panics if an internal `RwLock` is poisoned.
    #[must_use]
    pub fn get_active(&self) -> SharedParser {
        let identifier = self.active_identifier();
        self.get(&identifier)
    }

    /// Make `identifier` the active one.
    ///
    /// The instance itself is created lazily by the next lookup.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub fn set_active(&self, identifier: impl Into<String>) {
        let identifier = identifier.into();
        let mut active = self.active.write().unwrap();
        if *active != identifier {
            tracing::debug!(from = %*active, to = %identifier, "Active parser changed");
            *active = identifier;
        }
    }

    /// Currently active identifier.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn active_identifier(&self) -> String {
        self.active.read().unwrap().clone()
    }

    /// Identifiers of created instances, sorted.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn identifiers(&self) -> Vec<String> {
        let mut identifiers: Vec<_> = self.instances.read().unwrap().keys().cloned().collect();
        identifiers.sort_unstable();
        identifiers
    }

    /// Whether an instance has been created for `identifier`.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.instances.read().unwrap().contains_key(identifier)
    }
}
