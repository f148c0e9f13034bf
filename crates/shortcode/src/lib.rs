//! Registry-driven shortcode substitution.
//!
//! Finds bracketed tags such as `[name attr="value"]`, `[name /]` and
//! `[name]content[/name]` in text and replaces each occurrence of a
//! registered name with the output of its handler. Unregistered tags and
//! malformed markup pass through untouched.
//!
//! # Architecture
//!
//! - [`ShortcodeRegistry`]: name to [`ShortcodeHandler`] table
//! - [`TagMatcher`]: linear scanner producing [`TagMatch`] occurrences
//! - [`Attributes`]: lexed `key="value"` pairs of one occurrence
//! - [`ShortcodeParser`]: owns a registry, dispatches matches and handles
//!   `[[name]]` escapes
//! - [`ParserDirectory`]: named parser instances with an active identifier
//!
//! # Example
//!
//! ```
//! use shortcode::ShortcodeParser;
//!
//! let mut parser = ShortcodeParser::new();
//! parser.register_fn("greet", |attrs, _, _, _| {
//!     format!("Hello, {}!", attrs.get("name").unwrap_or("world"))
//! });
//!
//! assert_eq!(parser.parse(r#"<p>[greet name="Ada" /]</p>"#), "<p>Hello, Ada!</p>");
//! assert_eq!(parser.parse("Write [[greet /]] to greet."), "Write [greet /] to greet.");
//! ```

mod attributes;
mod directory;
mod handler;
mod matcher;
mod parser;
mod registry;

pub use attributes::{AttributeIter, Attributes};
pub use directory::{DEFAULT_IDENTIFIER, ParserDirectory, SharedParser};
pub use handler::ShortcodeHandler;
pub use matcher::{Matches, TagMatch, TagMatcher, UnclosedTags};
pub use parser::{ParserOptions, ShortcodeParser};
pub use registry::{RegistryError, ShortcodeRegistry, validate_name};
