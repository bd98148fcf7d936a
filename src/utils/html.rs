//! HTML utility functions.
//!
//! - `escape()`, `escape_attr()` - HTML entity escaping
//! - `escape_script_json()` - make JSON safe inside a `<script>` element
//! - `unescape()` - decode character references
//! - `strip_tags()` - plain text from stored rich-text bodies

use std::borrow::Cow;

// =============================================================================
// HTML Escaping
// =============================================================================

/// Characters that require HTML escaping.
const ESCAPE_CHARS: [char; 5] = ['<', '>', '&', '"', '\''];

/// Get the HTML entity for a special character.
#[inline]
fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escape HTML special characters in text content.
///
/// Uses `Cow` to avoid allocation when no escaping is needed.
///
/// # Example
/// ```ignore
/// assert_eq!(escape("<script>"), "&lt;script&gt;");
/// assert_eq!(escape("hello"), "hello"); // No allocation
/// ```
#[inline]
pub fn escape(s: &str) -> Cow<'_, str> {
    escape_with(s, &ESCAPE_CHARS)
}

/// Escape HTML attribute values.
///
/// Identical to `escape()` but semantically indicates attribute context.
#[inline]
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    escape_with(s, &ESCAPE_CHARS)
}

#[inline]
fn escape_with<'a>(s: &'a str, chars: &[char]) -> Cow<'a, str> {
    if !s.contains(chars) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match escape_char(c) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Escape serialized JSON for embedding in `<script type="application/ld+json">`.
///
/// Only `</` needs breaking up: the HTML tokenizer ends a script element at
/// the first `</script`, regardless of JSON string quoting.
#[inline]
pub fn escape_script_json(json: &str) -> Cow<'_, str> {
    if json.contains("</") {
        Cow::Owned(json.replace("</", "<\\/"))
    } else {
        Cow::Borrowed(json)
    }
}

/// Decode character references.
///
/// Handles numeric references and the named entities that rich-text editors
/// emit; unknown or unterminated references are kept as written.
pub fn unescape(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        result.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest[1..]
            .find(';')
            .filter(|end| *end > 0 && *end <= 10)
            .and_then(|end| decode_entity(&rest[1..=end]).map(|c| (c, end + 2)));
        match decoded {
            Some((c, len)) => {
                result.push(c);
                rest = &rest[len..];
            }
            None => {
                result.push('&');
                rest = &rest[1..];
            }
        }
    }
    result.push_str(rest);
    Cow::Owned(result)
}

fn decode_entity(entity: &str) -> Option<char> {
    if let Some(num) = entity.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return char::from_u32(code);
    }
    let c = match entity {
        "lt" => '<',
        "gt" => '>',
        "amp" => '&',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{00A0}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "hellip" => '\u{2026}',
        "copy" => '\u{00A9}',
        "reg" => '\u{00AE}',
        "trade" => '\u{2122}',
        "eacute" => '\u{00E9}',
        _ => return None,
    };
    Some(c)
}

/// Elements whose content is not document text.
#[inline]
fn is_raw_text_element(tag: &str) -> bool {
    matches!(tag, "script" | "style" | "template" | "noscript")
}

// =============================================================================
// Tag stripping
// =============================================================================

/// Plain text of a stored HTML fragment.
///
/// Script and style bodies and comments are dropped, character references
/// decoded, and whitespace collapsed to single spaces (element boundaries
/// count as whitespace, so `<p>a</p><p>b</p>` gives `a b`).
pub fn strip_tags(s: &str) -> String {
    if !s.contains(['<', '&']) {
        return collapse_whitespace(s);
    }

    let mut text = String::with_capacity(s.len());
    match tl::parse(s, tl::ParserOptions::default()) {
        Ok(dom) => {
            let parser = dom.parser();
            for handle in dom.children() {
                collect_text(*handle, parser, &mut text);
            }
        }
        Err(_) => text.push_str(&unescape(s)),
    }
    collapse_whitespace(&text)
}

fn collect_text(handle: tl::NodeHandle, parser: &tl::Parser, out: &mut String) {
    let Some(node) = handle.get(parser) else {
        return;
    };
    match node {
        tl::Node::Tag(tag) => {
            let name = tag.name().as_utf8_str().to_ascii_lowercase();
            if is_raw_text_element(&name) {
                return;
            }
            out.push(' ');
            for child in tag.children().top().iter() {
                collect_text(*child, parser, out);
            }
            out.push(' ');
        }
        tl::Node::Raw(bytes) => out.push_str(&unescape(&bytes.as_utf8_str())),
        tl::Node::Comment(_) => {}
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
