//! Shortcode handler trait.
//!
//! A handler turns one matched shortcode into replacement text.

use crate::{Attributes, ShortcodeParser};

/// Handler for a registered shortcode: `[name attrs]content[/name]` or `[name attrs /]`.
///
/// Receives the lexed attributes, the enclosed content (`None` for
/// self-closing tags), the parser that matched the tag and the tag name as it
/// was registered. The returned string replaces the whole tag.
///
/// Enclosed content is passed through unparsed. A handler that wants nested
/// shortcodes expanded calls [`ShortcodeParser::parse`] on it.
///
/// Closures with the matching signature implement this trait, so most
/// handlers never need a dedicated type.
///
/// # Thread Safety
///
/// Handlers are `Send + Sync` because a parser may be shared through a
/// [`ParserDirectory`](crate::ParserDirectory). Handlers that keep state use
/// interior mutability.
///
/// # Example
///
/// ```
/// use shortcode::{Attributes, ShortcodeHandler, ShortcodeParser};
///
/// struct Link;
///
/// impl ShortcodeHandler for Link {
///     fn expand(
///         &self,
///         attrs: &Attributes,
///         content: Option<&str>,
///         _parser: &ShortcodeParser,
///         _tag: &str,
///     ) -> String {
///         let href = attrs.get("href").unwrap_or("#");
///         format!(r#"<a href="{href}">{}</a>"#, content.unwrap_or(href))
///     }
/// }
///
/// let mut parser = ShortcodeParser::new();
/// parser.register("link", Link);
/// assert_eq!(
///     parser.parse(r#"[link href="/docs"]Docs[/link]"#),
///     r#"<a href="/docs">Docs</a>"#
/// );
/// ```
pub trait ShortcodeHandler: Send + Sync {
    /// Produce the replacement text for one shortcode occurrence.
    fn expand(
        &self,
        attrs: &Attributes,
        content: Option<&str>,
        parser: &ShortcodeParser,
        tag: &str,
    ) -> String;
}

impl<F> ShortcodeHandler for F
where
    F: Fn(&Attributes, Option<&str>, &ShortcodeParser, &str) -> String + Send + Sync,
{
    fn expand(
        &self,
        attrs: &Attributes,
        content: Option<&str>,
        parser: &ShortcodeParser,
        tag: &str,
    ) -> String {
        self(attrs, content, parser, tag)
    }
}
