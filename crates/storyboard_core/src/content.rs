//! Passage body <-> card description codec.
//!
//! # Responsibility
//! - Encode raw passage text into the canvas rich-text paragraph format.
//! - Decode card descriptions back into passage text, dropping in-canvas
//!   `//` annotations.
//! - Read plain values out of rich-text labels.
//!
//! # Invariants
//! - `decode_description(encode_description(t)) == t` for text without `//`.
//! - Text after a `//` marker never survives decoding.

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker that starts an editor-only annotation.
pub const COMMENT_MARKER: &str = "//";

const PARAGRAPH_OPEN: &str = "<p>";
const PARAGRAPH_CLOSE: &str = "</p>";

static PARAGRAPH_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<p>").expect("valid paragraph regex"));
static PARAGRAPH_CLOSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</p>").expect("valid paragraph close regex"));
static LINE_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid line break regex"));
static ANY_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?[^>]+(>|$)").expect("valid markup regex"));
static LT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)&lt;").expect("valid entity regex"));
static GT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)&gt;").expect("valid entity regex"));
static APOS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"&#39;").expect("valid entity regex"));

/// Encodes passage text as one paragraph per line.
pub fn encode_description(text: &str) -> String {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .map(|line| format!("{PARAGRAPH_OPEN}{}{PARAGRAPH_CLOSE}", escape_angles(line)))
        .collect()
}

/// Decodes a card description into passage text.
///
/// Lines starting with `//` are dropped; other lines are cut at the first
/// `//`.
pub fn decode_description(description: &str) -> String {
    let without_open = PARAGRAPH_OPEN_RE.replace_all(description, "");
    let without_breaks = LINE_BREAK_RE.replace_all(&without_open, "");
    let normalized = PARAGRAPH_CLOSE_RE.replace_all(&without_breaks, PARAGRAPH_CLOSE);
    let body = normalized
        .strip_suffix(PARAGRAPH_CLOSE)
        .unwrap_or(normalized.as_ref());

    // Entities are unescaped per line, after splitting.
    body.split(PARAGRAPH_CLOSE)
        .map(unescape_entities)
        .filter(|line| !line.starts_with(COMMENT_MARKER))
        .map(|line| match line.find(COMMENT_MARKER) {
            Some(index) => line[..index].to_string(),
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Removes every markup tag from `input`.
pub fn strip_tags(input: &str) -> String {
    ANY_TAG_RE.replace_all(input, "").into_owned()
}

/// Reads the plain value of a rich-text label: markup stripped, entities
/// unescaped, surrounding whitespace trimmed.
///
/// Labels do not keep leading or trailing whitespace, so passage names, story
/// titles and tags read back trimmed.
pub fn plain_text(input: &str) -> String {
    unescape_entities(&strip_tags(input)).trim().to_string()
}

/// Escapes the characters that would otherwise read as markup.
pub fn escape_angles(value: &str) -> String {
    value.replace('<', "&lt;").replace('>', "&gt;")
}

/// Unescapes `&lt;`, `&gt;` and `&#39;`.
pub fn unescape_entities(value: &str) -> String {
    let value = LT_RE.replace_all(value, "<");
    let value = GT_RE.replace_all(&value, ">");
    APOS_RE.replace_all(&value, "'").into_owned()
}

#[cfg(test)]
mod tests {
    use super::{decode_description, encode_description, plain_text, strip_tags};

    #[test]
    fn encode_wraps_lines_and_escapes_angles() {
        assert_eq!(
            encode_description("a < b\nc > d"),
            "<p>a &lt; b</p><p>c &gt; d</p>"
        );
    }

    #[test]
    fn decode_inverts_encode_without_comments() {
        let text = "First line\n\n(if: $x > 1)[<b>bold</b>]\n[[Next->Cave]]";
        assert_eq!(decode_description(&encode_description(text)), text);
        assert_eq!(decode_description(&encode_description("")), "");
    }

    #[test]
    fn decode_drops_comment_text() {
        let decoded = decode_description(&encode_description("a < b\nsecret // drop"));
        assert!(decoded.starts_with("a < b\n"));
        assert!(!decoded.contains("drop"));
        assert!(!decoded.contains("//"));
    }

    #[test]
    fn decode_skips_whole_comment_lines() {
        let decoded = decode_description("<p>keep</p><p>// editor note</p><p>tail</p>");
        assert_eq!(decoded, "keep\ntail");
    }

    #[test]
    fn decode_handles_platform_markup() {
        let decoded = decode_description("<P>one<br/></P><p>it&#39;s &LT;two&gt;</p>");
        assert_eq!(decoded, "one\nit's <two>");
    }

    #[test]
    fn decode_accepts_plain_descriptions() {
        assert_eq!(
            decode_description("Lorem ipsum dolor sit amet..."),
            "Lorem ipsum dolor sit amet..."
        );
    }

    #[test]
    fn labels_lose_markup() {
        assert_eq!(strip_tags("<p><b>Untitled Story</b></p>"), "Untitled Story");
        assert_eq!(plain_text("<p> harlowe-3.3.9 </p>"), "harlowe-3.3.9");
        assert_eq!(plain_text("<p>A &lt;B&gt;</p>"), "A <B>");
    }
}
