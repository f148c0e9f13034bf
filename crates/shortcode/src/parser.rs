//! Shortcode parser: matching, dispatch and output assembly.

use crate::matcher::{TagMatch, TagMatcher, UnclosedTags};
use crate::registry::{RegistryError, ShortcodeRegistry};
use crate::{Attributes, ShortcodeHandler};

/// Options controlling how a [`ShortcodeParser`] treats edge cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParserOptions {
    /// Handling of enclosing tags that have no closing marker.
    ///
    /// Default: [`UnclosedTags::Literal`]
    pub unclosed_tags: UnclosedTags,
    /// Whether `[[name]]` renders as the literal text `[name]`.
    ///
    /// Default: `true`
    pub escapes: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserOptions {
    /// Create options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            unclosed_tags: UnclosedTags::Literal,
            escapes: true,
        }
    }

    /// Set the unclosed tag policy.
    #[must_use]
    pub fn with_unclosed_tags(mut self, policy: UnclosedTags) -> Self {
        self.unclosed_tags = policy;
        self
    }

    /// Enable or disable `[[name]]` escaping.
    #[must_use]
    pub fn with_escapes(mut self, enabled: bool) -> Self {
        self.escapes = enabled;
        self
    }
}

/// Replaces registered shortcodes in text with their handlers' output.
///
/// Each parser owns its own [`ShortcodeRegistry`]. Parsing is a single
/// left-to-right pass: handler output is never rescanned, and enclosed
/// content reaches handlers unparsed.
///
/// # Example
///
/// ```
/// use shortcode::ShortcodeParser;
///
/// let mut parser = ShortcodeParser::new();
/// parser.register_fn("wrap", |attrs, content, _parser, _tag| {
///     format!("{}:{}", attrs.get("tag").unwrap_or("span"), content.unwrap_or_default())
/// });
///
/// assert_eq!(parser.parse(r#"[wrap tag="b"]x[/wrap]"#), "b:x");
/// assert_eq!(parser.parse("[[wrap]]"), "[wrap]");
/// assert_eq!(parser.parse("[other]x[/other]"), "[other]x[/other]");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ShortcodeParser {
    registry: ShortcodeRegistry,
    options: ParserOptions,
}

impl ShortcodeParser {
    /// Create a parser with no shortcodes and default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with no shortcodes and custom options.
    #[must_use]
    pub fn with_options(options: ParserOptions) -> Self {
        Self {
            registry: ShortcodeRegistry::new(),
            options,
        }
    }

    /// Parser options.
    #[must_use]
    pub fn options(&self) -> ParserOptions {
        self.options
    }

    /// The shortcode registry.
    #[must_use]
    pub fn registry(&self) -> &ShortcodeRegistry {
        &self.registry
    }

    /// Register a handler. See [`ShortcodeRegistry::register`].
    pub fn register<H: ShortcodeHandler + 'static>(&mut self, name: impl Into<String>, handler: H) {
        self.registry.register(name, handler);
    }

    /// Register a closure handler.
    ///
    /// Same as [`register`](Self::register), but lets the compiler infer the
    /// closure's argument types.
    pub fn register_fn<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&Attributes, Option<&str>, &ShortcodeParser, &str) -> String
            + Send
            + Sync
            + 'static,
    {
        self.registry.register(name, handler);
    }

    /// Register a handler, reporting rejected names.
    ///
    /// # Errors
    ///
    /// See [`ShortcodeRegistry::try_register`].
    pub fn try_register<H: ShortcodeHandler + 'static>(
        &mut self,
        name: impl Into<String>,
        handler: H,
    ) -> Result<(), RegistryError> {
        self.registry.try_register(name, handler)
    }

    /// Check whether a shortcode is registered.
    #[must_use]
    pub fn registered(&self, name: &str) -> bool {
        self.registry.registered(name)
    }

    /// Remove a shortcode.
    pub fn unregister(&mut self, name: &str) {
        self.registry.unregister(name);
    }

    /// Remove all shortcodes.
    pub fn clear(&mut self) {
        self.registry.clear();
    }

    /// Replace every registered shortcode in `content`.
    ///
    /// The character following a tag belongs to its match, so a tag placed
    /// directly after another tag is not expanded: `[a /][a /]` yields the
    /// first tag's output followed by `[a /]`.
    ///
    /// Returns `content` unchanged when nothing is registered. Never fails:
    /// unknown tags, unterminated enclosing tags and malformed attributes are
    /// left as they are.
    #[must_use]
    pub fn parse(&self, content: &str) -> String {
        if self.registry.is_empty() {
            return content.to_owned();
        }

        let matcher = TagMatcher::new(self.registry.names())
            .with_unclosed_tags(self.options.unclosed_tags)
            .with_escapes(self.options.escapes);

        let mut output = String::with_capacity(content.len());
        let mut cursor = 0;

        for found in matcher.find_iter(content) {
            if self.options.escapes && found.is_escaped() && found.span.start > cursor {
                // Drop the wrapping brackets and keep the inner tag as text.
                output.push_str(&content[cursor..found.span.start - 1]);
                output.push_str(&content[found.span.clone()]);
                cursor = found.resume_at();
                tracing::trace!(tag = found.name, "Escaped shortcode rendered literally");
                continue;
            }

            // The prefix and suffix stay in the text around the handler output.
            output.push_str(&content[cursor..found.span.start]);
            output.push_str(&self.dispatch(&found));
            cursor = found.span.end;
        }

        output.push_str(&content[cursor..]);
        output
    }

    /// Run the handler for a single match.
    fn dispatch(&self, found: &TagMatch<'_>) -> String {
        let Some(handler) = self.registry.get(found.name) else {
            return String::new();
        };

        let attrs = Attributes::parse(found.raw_attributes);
        tracing::trace!(
            tag = found.name,
            attributes = attrs.len(),
            enclosing = found.content.is_some(),
            "Dispatching shortcode"
        );
        handler.expand(&attrs, found.content, self, found.name)
    }
}
