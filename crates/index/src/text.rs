//! Plain-text helpers shared by indexing and raw scoring.

use memchr::memchr;
use std::borrow::Cow;

/// Replaces every shortest `<...>` span with a single space.
///
/// This is deliberately naive: it does not understand nesting, comments,
/// attributes containing `>`, or entities. A `<` without a matching `>` is
/// left in place as text. Malformed markup degrades into a few noise tokens
/// rather than an error.
///
/// The markers are ASCII, so slicing at their positions never splits a
/// UTF-8 sequence.
///
/// # Examples
///
/// ```rust
/// use trawl_index::strip_markup;
/// assert_eq!(strip_markup("<p>Hello <b>World</b></p>"), " Hello  World  ");
/// assert_eq!(strip_markup("1 < 2"), "1 < 2");
/// ```
pub fn strip_markup(text: &str) -> Cow<'_, str> {
    let bytes = text.as_bytes();
    let Some(mut open) = memchr(b'<', bytes) else {
        return Cow::Borrowed(text);
    };
    let mut stripped = String::with_capacity(text.len());
    let mut cursor = 0;
    loop {
        let Some(offset) = memchr(b'>', &bytes[open + 1..]) else {
            // Unterminated tag: everything from here on is text.
            break;
        };
        stripped.push_str(&text[cursor..open]);
        stripped.push(' ');
        cursor = open + 1 + offset + 1;
        match memchr(b'<', &bytes[cursor..]) {
            Some(next) => open = cursor + next,
            None => break,
        }
    }
    stripped.push_str(&text[cursor..]);
    Cow::Owned(stripped)
}

/// Splits on whitespace and lower-cases each token.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace().map(str::to_lowercase)
}

/// Number of non-overlapping occurrences of `needle` in `haystack`.
///
/// An empty needle never matches (rather than matching between every
/// character).
pub(crate) fn occurrences(haystack: &str, needle: &str) -> u64 {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count() as u64
}

/// Length as counted for the weighted size of a node.
pub(crate) fn length(text: &str) -> u64 {
    text.chars().count() as u64
}
