//! Name-keyed table of shortcode handlers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::ShortcodeHandler;

/// Error returned when a shortcode cannot be registered.
///
/// [`ShortcodeRegistry::register`] swallows this error and only logs it;
/// [`ShortcodeRegistry::try_register`] returns it to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The shortcode name is empty.
    #[error("shortcode name cannot be empty")]
    EmptyName,
    /// The shortcode name contains a character that ends a tag name.
    #[error("shortcode name {name:?} contains {found:?}, which cannot appear in a tag name")]
    InvalidCharacter {
        /// Rejected name.
        name: String,
        /// First offending character.
        found: char,
    },
}

/// Whether `c` terminates a tag name inside brackets.
pub(crate) fn is_name_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '[' | ']' | '/')
}

/// Check that `name` can be matched as a tag name.
///
/// # Errors
///
/// Returns [`RegistryError`] if the name is empty or contains whitespace,
/// `[`, `]` or `/`.
pub fn validate_name(name: &str) -> Result<(), RegistryError> {
    if name.is_empty() {
        return Err(RegistryError::EmptyName);
    }
    if let Some(found) = name.chars().find(|&c| is_name_delimiter(c)) {
        return Err(RegistryError::InvalidCharacter {
            name: name.to_owned(),
            found,
        });
    }
    Ok(())
}

/// Mapping from shortcode name to handler.
///
/// Names are unique; registering an existing name replaces its handler.
/// Cloning is cheap and shares the handlers.
#[derive(Clone, Default)]
pub struct ShortcodeRegistry {
    handlers: HashMap<String, Arc<dyn ShortcodeHandler>>,
}

impl ShortcodeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `name`, replacing any previous handler.
    ///
    /// A registration that cannot be stored is dropped without signalling the
    /// caller; the reason is logged at `warn` level. Use
    /// [`try_register`](Self::try_register) to observe it.
    pub fn register<H: ShortcodeHandler + 'static>(&mut self, name: impl Into<String>, handler: H) {
        let _ = self.try_register(name, handler);
    }

    /// Register a handler under `name`, reporting rejected names.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if `name` fails [`validate_name`]. The
    /// registry is left unchanged in that case.
    pub fn try_register<H: ShortcodeHandler + 'static>(
        &mut self,
        name: impl Into<String>,
        handler: H,
    ) -> Result<(), RegistryError> {
        self.insert(name.into(), Arc::new(handler))
    }

    pub(crate) fn insert(
        &mut self,
        name: String,
        handler: Arc<dyn ShortcodeHandler>,
    ) -> Result<(), RegistryError> {
        if let Err(e) = validate_name(&name) {
            tracing::warn!(name = %name, error = %e, "Shortcode registration rejected");
            return Err(e);
        }

        let replaced = self.handlers.insert(name.clone(), handler).is_some();
        tracing::debug!(name = %name, replaced, "Shortcode registered");
        Ok(())
    }

    /// Check whether a shortcode is registered.
    #[must_use]
    pub fn registered(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Remove a shortcode. Does nothing if it is not registered.
    pub fn unregister(&mut self, name: &str) {
        if self.handlers.remove(name).is_some() {
            tracing::debug!(name = %name, "Shortcode unregistered");
        }
    }

    /// Remove all shortcodes.
    pub fn clear(&mut self) {
        tracing::debug!(count = self.handlers.len(), "Shortcode registry cleared");
        self.handlers.clear();
    }

    /// Look up the handler for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn ShortcodeHandler> {
        let handler = self.handlers.get(name)?;
        Some(handler.as_ref())
    }

    /// Number of registered shortcodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no shortcodes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered names in arbitrary order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

impl fmt::Debug for ShortcodeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("ShortcodeRegistry")
            .field("names", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Attributes, ShortcodeParser};

    fn fixed(text: &'static str) -> impl ShortcodeHandler {
        move |_: &Attributes, _: Option<&str>, _: &ShortcodeParser, _: &str| text.to_owned()
    }

    fn call(registry: &ShortcodeRegistry, name: &str) -> Option<String> {
        let parser = ShortcodeParser::new();
        registry
            .get(name)
            .map(|h| h.expand(&Attributes::new(), None, &parser, name))
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ShortcodeRegistry::new();
        registry.register("greet", fixed("Hi"));

        assert!(registry.registered("greet"));
        assert_eq!(registry.len(), 1);
        assert_eq!(call(&registry, "greet"), Some("Hi".to_owned()));
    }

    #[test]
    fn test_reregister_overwrites() {
        let mut registry = ShortcodeRegistry::new();
        registry.register("greet", fixed("Hi"));
        registry.register("greet", fixed("Hello"));

        assert_eq!(registry.len(), 1);
        assert_eq!(call(&registry, "greet"), Some("Hello".to_owned()));
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut registry = ShortcodeRegistry::new();
        registry.register("Greet", fixed("Hi"));

        assert!(registry.registered("Greet"));
        assert!(!registry.registered("greet"));
    }

    #[test]
    fn test_unregister() {
        let mut registry = ShortcodeRegistry::new();
        registry.register("a", fixed("1"));
        registry.register("b", fixed("2"));

        registry.unregister("a");

        assert!(!registry.registered("a"));
        assert!(registry.registered("b"));
    }

    #[test]
    fn test_unregister_missing_is_noop() {
        let mut registry = ShortcodeRegistry::new();
        registry.register("a", fixed("1"));

        registry.unregister("missing");

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut registry = ShortcodeRegistry::new();
        registry.register("a", fixed("1"));
        registry.register("b", fixed("2"));

        registry.clear();

        assert!(registry.is_empty());
        assert!(registry.get("a").is_none());
    }

    #[test]
    fn test_register_empty_name_is_silently_ignored() {
        let mut registry = ShortcodeRegistry::new();
        registry.register("", fixed("x"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_try_register_reports_empty_name() {
        let mut registry = ShortcodeRegistry::new();
        let result = registry.try_register("", fixed("x"));
        assert_eq!(result, Err(RegistryError::EmptyName));
    }

    #[test]
    fn test_try_register_reports_invalid_character() {
        let mut registry = ShortcodeRegistry::new();

        for (name, found) in [("two words", ' '), ("a/b", '/'), ("x]", ']'), ("[x", '[')] {
            let err = registry.try_register(name, fixed("x")).unwrap_err();
            assert_eq!(
                err,
                RegistryError::InvalidCharacter {
                    name: name.to_owned(),
                    found
                }
            );
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_rejected_registration_keeps_previous_entries() {
        let mut registry = ShortcodeRegistry::new();
        registry.register("ok", fixed("1"));
        registry.register("not ok", fixed("2"));

        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["ok"]);
    }

    #[test]
    fn test_validate_name_accepts_punctuation() {
        assert!(validate_name("my-tag").is_ok());
        assert!(validate_name("ns:tag").is_ok());
        assert!(validate_name("tag.v2").is_ok());
    }

    #[test]
    fn test_clone_shares_handlers() {
        let mut registry = ShortcodeRegistry::new();
        registry.register("a", fixed("1"));

        let mut copy = registry.clone();
        copy.unregister("a");

        assert!(registry.registered("a"));
        assert!(!copy.registered("a"));
    }

    #[test]
    fn test_debug_lists_sorted_names() {
        let mut registry = ShortcodeRegistry::new();
        registry.register("b", fixed("2"));
        registry.register("a", fixed("1"));

        assert_eq!(
            format!("{registry:?}"),
            r#"ShortcodeRegistry { names: ["a", "b"] }"#
        );
    }
}
