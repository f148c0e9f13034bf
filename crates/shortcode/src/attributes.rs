//! Shortcode attribute lexing.
//!
//! Parses the raw text between a tag name and its closing bracket:
//! `[name key="value" other='x' bare=1 /]`

use std::collections::HashMap;
use std::collections::hash_map;

/// Attributes attached to a single shortcode occurrence.
///
/// Keys are stored lower-cased. When a key appears more than once the last
/// occurrence wins.
///
/// # Example
///
/// ```
/// use shortcode::Attributes;
///
/// let attrs = Attributes::parse(r#" Title="Hello World" width=560 align='left'"#);
/// assert_eq!(attrs.get("title"), Some("Hello World"));
/// assert_eq!(attrs.get("width"), Some("560"));
/// assert_eq!(attrs.get("align"), Some("left"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    values: HashMap<String, String>,
}

impl Attributes {
    /// Create an empty attribute map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lex a raw attribute string into a map.
    ///
    /// Each attribute is a word-character key, optional whitespace, `=`,
    /// optional whitespace, then a `"double"` or `'single'` quoted value or an
    /// unquoted run of characters other than space, quotes and `>`. Tabs and
    /// newlines do not end an unquoted value.
    /// Fragments that do not fit this shape are skipped, as are attributes
    /// whose value is empty.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut attrs = Self::new();
        let mut remaining = raw;

        while let Some(start) = remaining.find(is_word_char) {
            remaining = &remaining[start..];

            let key_end = remaining
                .find(|c: char| !is_word_char(c))
                .unwrap_or(remaining.len());
            let key = &remaining[..key_end];

            match parse_value(&remaining[key_end..]) {
                Some((value, rest)) => {
                    if !value.is_empty() {
                        attrs.insert(key, value);
                    }
                    remaining = rest;
                }
                None => remaining = &remaining[key_end..],
            }
        }

        attrs
    }

    /// Get an attribute value by its lower-case key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Check whether an attribute is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Insert a value, lower-casing the key.
    ///
    /// Returns the previous value stored under that key, if any.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) -> Option<String> {
        self.values.insert(key.to_lowercase(), value.into())
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no attributes were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(key, value)` pairs in arbitrary order.
    pub fn iter(&self) -> AttributeIter<'_> {
        AttributeIter {
            inner: self.values.iter(),
        }
    }

    /// Render the attributes back into shortcode syntax.
    ///
    /// Keys are sorted so the output is deterministic. Values containing a
    /// double quote are wrapped in single quotes.
    ///
    /// ```
    /// use shortcode::Attributes;
    ///
    /// let attrs = Attributes::parse(r#"b=2 a="one""#);
    /// assert_eq!(attrs.to_syntax(), r#"a="one" b="2""#);
    /// ```
    #[must_use]
    pub fn to_syntax(&self) -> String {
        let mut keys: Vec<_> = self.values.keys().collect();
        keys.sort();

        keys.into_iter()
            .map(|key| {
                let value = &self.values[key];
                if value.contains('"') {
                    format!("{key}='{value}'")
                } else {
                    format!(r#"{key}="{value}""#)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (key, value) in iter {
            attrs.insert(key.as_ref(), value);
        }
        attrs
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = (&'a str, &'a str);
    type IntoIter = AttributeIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the entries of an [`Attributes`] map.
#[derive(Debug, Clone)]
pub struct AttributeIter<'a> {
    inner: hash_map::Iter<'a, String, String>,
}

impl<'a> Iterator for AttributeIter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_unquoted_value_char(c: char) -> bool {
    !matches!(c, ' ' | '"' | '\'' | '>')
}

/// Parse `= value` following a key.
///
/// Returns (value, rest) or `None` when the text does not form a value.
fn parse_value(s: &str) -> Option<(&str, &str)> {
    let after_eq = s.trim_start().strip_prefix('=')?.trim_start();

    let quote = after_eq.chars().next()?;
    if quote == '"' || quote == '\'' {
        let quoted = &after_eq[1..];
        let end_quote = quoted.find(quote)?;
        return Some((&quoted[..end_quote], &quoted[end_quote + 1..]));
    }

    let end = after_eq
        .find(|c: char| !is_unquoted_value_char(c))
        .unwrap_or(after_eq.len());
    if end == 0 {
        return None;
    }
    Some((&after_eq[..end], &after_eq[end..]))
}
