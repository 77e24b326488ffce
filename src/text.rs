// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Helpful utilities for working with text.

use htmlentity::entity::{self, ICodedDataTrait};

/// Converts HTML entities into their single-character equivalents.
///
/// For example, Reddit returns "&" as "&amp;", ">" as "&gt;",
/// and "<" as "&lt;"; this function will convert those HTML
/// entities into single, human-readable characters.
///
/// Leading and trailing whitespace will also be trimmed from the string.
///
/// # Examples
///
/// ```
/// use automodder::text::convert_html_entities;
/// let raw = "&lt;This &amp; That&gt;";
/// let converted = convert_html_entities(raw);
/// assert_eq!(converted, "<This & That>");
/// ```
///
/// ```
/// use automodder::text::convert_html_entities;
/// let raw = "  &lt;This &amp; That&gt;  ";
/// let converted = convert_html_entities(raw);
/// assert_eq!(converted, "<This & That>");
/// ```
///
/// ```
/// use automodder::text::convert_html_entities;
/// let raw = "";
/// let converted = convert_html_entities(raw);
/// assert_eq!(converted, raw);
/// ```
pub fn convert_html_entities(text: &str) -> String {
    let text = text.trim();
    entity::decode(text.as_bytes())
        .to_string()
        .unwrap_or(text.to_string())
}

/// Formats a count along with the singular or plural form of a noun.
///
/// The plural is formed by appending "s"; use [`plural_with()`] for
/// irregular nouns.
///
/// # Examples
///
/// ```
/// use automodder::text::plural;
/// assert_eq!(plural(1, "item"), "1 item");
/// assert_eq!(plural(0, "item"), "0 items");
/// assert_eq!(plural(12, "conversation"), "12 conversations");
/// ```
pub fn plural(count: usize, singular: &str) -> String {
    plural_with(count, singular, &format!("{singular}s"))
}

/// Formats a count with an explicit singular and plural form.
///
/// # Examples
///
/// ```
/// use automodder::text::plural_with;
/// assert_eq!(plural_with(1, "reply", "replies"), "1 reply");
/// assert_eq!(plural_with(3, "reply", "replies"), "3 replies");
/// ```
pub fn plural_with(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// Formats a number with commas separating groups of thousands.
///
/// # Examples
///
/// ```
/// use automodder::text::separate_thousands;
/// assert_eq!(separate_thousands(0), "0");
/// assert_eq!(separate_thousands(999), "999");
/// assert_eq!(separate_thousands(1000), "1,000");
/// assert_eq!(separate_thousands(12345678), "12,345,678");
/// ```
pub fn separate_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
