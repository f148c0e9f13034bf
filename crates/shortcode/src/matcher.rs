//! Shortcode occurrence scanning.
//!
//! Finds `[name ...]`, `[name ... /]` and `[name ...]content[/name]` for a
//! fixed set of registered names, left to right and without overlap.
//!
//! Scanning is two-phase:
//!
//! 1. Closing markers (`[/name]`, whitespace allowed around the name) for
//!    registered names are indexed in one pass over the input.
//! 2. Opening brackets are visited in order. An enclosing tag takes the
//!    nearest indexed closing marker after its opening tag, found by binary
//!    search.
//!
//! Each match also takes the character right after the tag (its suffix), so
//! scanning resumes one character past the tag and a tag that directly
//! follows another one is left as text: `[a /][a /]` expands only the first.
//! The character before a tag (its prefix) is only reported when it lies past
//! the end of the previous match.
//!
//! The matcher is not nesting-aware: `[t][t]a[/t]b[/t]` closes the outer `t`
//! at the first `[/t]`, so its content is `[t]a`.

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use crate::registry::is_name_delimiter;

/// What to do with an enclosing-form tag that has no closing marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum UnclosedTags {
    /// Leave the opening tag as literal text.
    #[default]
    Literal,
    /// Treat the opening tag as a bodiless shortcode (content is `None`).
    Standalone,
}

/// One shortcode occurrence found in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMatch<'a> {
    /// Registered tag name.
    pub name: &'a str,
    /// Whether the tag ended with `/]`.
    pub self_closing: bool,
    /// Raw text between the name and `]` (or `/]`).
    pub raw_attributes: &'a str,
    /// Text between the opening tag and its closing marker.
    ///
    /// `None` for self-closing and standalone tags.
    pub content: Option<&'a str>,
    /// Character immediately before the tag.
    ///
    /// `None` at the start of input or when that character belongs to the
    /// previous match.
    pub prefix: Option<char>,
    /// Character immediately after the tag, `None` at the end of input.
    ///
    /// The suffix is part of the match: scanning resumes after it.
    pub suffix: Option<char>,
    /// Byte range of the tag in the input, from `[` to the final `]`.
    ///
    /// Excludes the prefix and suffix characters.
    pub span: Range<usize>,
}

impl TagMatch<'_> {
    /// Whether the tag is wrapped in an extra pair of brackets: `[[name]]`.
    #[must_use]
    pub fn is_escaped(&self) -> bool {
        self.prefix == Some('[') && self.suffix == Some(']')
    }

    /// Byte offset where scanning resumes, just past the suffix.
    #[must_use]
    pub fn resume_at(&self) -> usize {
        self.span.end + self.suffix.map_or(0, char::len_utf8)
    }
}

/// Scanner for shortcode occurrences restricted to a set of names.
///
/// # Example
///
/// ```
/// use shortcode::TagMatcher;
///
/// let matcher = TagMatcher::new(["b"]);
/// let found: Vec<_> = matcher.find_iter("x [b]y[/b] [i]z[/i]").collect();
///
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].name, "b");
/// assert_eq!(found[0].content, Some("y"));
/// assert_eq!(found[0].span, 2..10);
/// ```
#[derive(Debug, Clone)]
pub struct TagMatcher<'n> {
    names: HashSet<&'n str>,
    unclosed: UnclosedTags,
    escapes: bool,
}

impl<'n> TagMatcher<'n> {
    /// Create a matcher for the given tag names.
    ///
    /// Names are compared literally and case-sensitively.
    pub fn new(names: impl IntoIterator<Item = &'n str>) -> Self {
        Self {
            names: names.into_iter().collect(),
            unclosed: UnclosedTags::default(),
            escapes: true,
        }
    }

    /// Set the policy for enclosing tags without a closing marker.
    #[must_use]
    pub fn with_unclosed_tags(mut self, policy: UnclosedTags) -> Self {
        self.unclosed = policy;
        self
    }

    /// Set whether `[[name]]` is recognized as an escaped tag.
    ///
    /// An escaped tag is reported even when it is in enclosing form with no
    /// closing marker, so that `[[name]]` always reaches escape handling.
    #[must_use]
    pub fn with_escapes(mut self, enabled: bool) -> Self {
        self.escapes = enabled;
        self
    }

    /// Whether the matcher has no names and can never match.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over shortcode occurrences in `input`.
    pub fn find_iter<'m, 'a>(&'m self, input: &'a str) -> Matches<'m, 'a> {
        Matches {
            matcher: self,
            input,
            closing: self.index_closing_markers(input),
            pos: 0,
            consumed: 0,
            right_bracket: 0,
        }
    }

    /// Index the byte ranges of every `[/name]` marker for registered names.
    fn index_closing_markers<'a>(&self, input: &'a str) -> ClosingIndex<'a> {
        let mut index = ClosingIndex::default();

        for (start, _) in input.match_indices("[/") {
            let rest = input[start + 2..].trim_start();
            let name_len = rest.find(is_name_delimiter).unwrap_or(rest.len());
            if name_len == 0 {
                continue;
            }

            let name = &rest[..name_len];
            if !self.names.contains(name) {
                continue;
            }

            let after_name = rest[name_len..].trim_start();
            if after_name.starts_with(']') {
                let end = input.len() - after_name.len() + 1;
                index.markers.entry(name).or_default().push(start..end);
            }
        }

        index
    }
}

/// Closing marker positions per tag name, each list in ascending order.
#[derive(Debug, Default)]
struct ClosingIndex<'a> {
    markers: HashMap<&'a str, Vec<Range<usize>>>,
}

impl ClosingIndex<'_> {
    /// Nearest closing marker for `name` starting at or after `from`.
    fn nearest(&self, name: &str, from: usize) -> Option<Range<usize>> {
        let markers = self.markers.get(name)?;
        let idx = markers.partition_point(|m| m.start < from);
        markers.get(idx).cloned()
    }
}

/// Iterator over [`TagMatch`]es, created by [`TagMatcher::find_iter`].
#[derive(Debug)]
pub struct Matches<'m, 'a> {
    matcher: &'m TagMatcher<'m>,
    input: &'a str,
    closing: ClosingIndex<'a>,
    pos: usize,
    /// End of the previous match, suffix included.
    consumed: usize,
    /// First `]` at or after the last lookup, `input.len()` if there is none.
    right_bracket: usize,
}

impl<'a> Matches<'_, 'a> {
    /// Position of the first `]` at or after `from`.
    fn right_bracket(&mut self, from: usize) -> Option<usize> {
        if self.right_bracket < from {
            self.right_bracket = self.input[from..]
                .find(']')
                .map_or(self.input.len(), |i| from + i);
        }
        (self.right_bracket < self.input.len()).then_some(self.right_bracket)
    }

    /// Try to match a shortcode whose `[` is at byte offset `open`.
    fn match_at(&mut self, open: usize) -> Option<TagMatch<'a>> {
        let input = self.input;

        let after_bracket = &input[open + 1..];
        let name_len = after_bracket
            .find(is_name_delimiter)
            .unwrap_or(after_bracket.len());
        if name_len == 0 {
            return None;
        }
        let name = &after_bracket[..name_len];
        if !self.matcher.names.contains(name) {
            return None;
        }

        let attrs_start = open + 1 + name_len;
        let bracket = self.right_bracket(attrs_start)?;
        let inner = &input[attrs_start..bracket];
        let (raw_attributes, self_closing) = match inner.strip_suffix('/') {
            Some(attrs) => (attrs, true),
            None => (inner, false),
        };
        let tag_end = bracket + 1;
        let prefix = input[self.consumed..open].chars().next_back();

        let (content, end) = if self_closing {
            (None, tag_end)
        } else if let Some(marker) = self.closing.nearest(name, tag_end) {
            (Some(&input[tag_end..marker.start]), marker.end)
        } else {
            let escaped = self.matcher.escapes
                && prefix == Some('[')
                && input[tag_end..].starts_with(']');
            if !escaped && self.matcher.unclosed == UnclosedTags::Literal {
                tracing::trace!(tag = name, offset = open, "Unterminated shortcode left as text");
                return None;
            }
            (None, tag_end)
        };

        Some(TagMatch {
            name,
            self_closing,
            raw_attributes,
            content,
            prefix,
            suffix: input[end..].chars().next(),
            span: open..end,
        })
    }
}

impl<'a> Iterator for Matches<'_, 'a> {
    type Item = TagMatch<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.input.len() {
            let open = self.pos + self.input[self.pos..].find('[')?;
            self.pos = open + 1;

            if let Some(found) = self.match_at(open) {
                self.pos = found.resume_at();
                self.consumed = self.pos;
                return Some(found);
            }
        }
        None
    }
}
