//! Passage link inference.
//!
//! # Responsibility
//! - Decide whether passage text references another passage by name.
//! - Derive the initial edge set for a freshly imported story.
//!
//! # Invariants
//! - A reference is a case-insensitive whole-word occurrence inside one
//!   literal of a recognized link idiom: `[[...]]` (with or without an arrow
//!   target), `"..."`, `'...'` or `` `...` ``.
//! - Literals are found first and never span two literals or a line break.
//! - A `'` next to a word character on its outer side is an apostrophe, not
//!   a quote.
//! - Names that match no passage never produce edges.

use crate::model::story::Passage;
use once_cell::sync::Lazy;
use regex::Regex;

static BRACKET_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\]]*)\]\]").expect("valid bracket link regex"));
static DOUBLE_QUOTED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"\n]*)""#).expect("valid double quote regex"));
static BACKTICK_QUOTED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`([^`\n]*)`").expect("valid backtick regex"));

/// Compiled matcher for references to one candidate passage name.
#[derive(Debug, Clone)]
pub struct LinkMatcher {
    name: Option<Regex>,
}

impl LinkMatcher {
    /// Compiles a matcher. Blank candidates never match.
    pub fn new(candidate: &str) -> Self {
        Self {
            name: name_pattern(candidate),
        }
    }

    /// Returns whether `text` references this matcher's candidate.
    pub fn is_referenced_by(&self, text: &str) -> bool {
        let Some(name) = &self.name else {
            return false;
        };
        link_literals(text).any(|literal| name.is_match(literal))
    }
}

/// Returns whether `text` references `candidate_name`.
pub fn references(text: &str, candidate_name: &str) -> bool {
    LinkMatcher::new(candidate_name).is_referenced_by(text)
}

/// Infers `(source, target)` passage-index pairs.
///
/// An edge `i -> j` exists iff `i != j` and passage `i` references the name of
/// passage `j`. Pairs are ordered by source, then target.
pub fn infer_edges(passages: &[Passage]) -> Vec<(usize, usize)> {
    let matchers: Vec<LinkMatcher> = passages
        .iter()
        .map(|passage| LinkMatcher::new(&passage.name))
        .collect();

    let mut edges = Vec::new();
    for (source, passage) in passages.iter().enumerate() {
        for (target, matcher) in matchers.iter().enumerate() {
            if source != target && matcher.is_referenced_by(&passage.text) {
                edges.push((source, target));
            }
        }
    }
    edges
}

/// Yields the inner text of every link literal in `text`.
fn link_literals(text: &str) -> impl Iterator<Item = &str> + '_ {
    [&*BRACKET_LINK_RE, &*DOUBLE_QUOTED_RE, &*BACKTICK_QUOTED_RE]
        .into_iter()
        .flat_map(move |pattern| {
            pattern
                .captures_iter(text)
                .filter_map(|captures| captures.get(1))
                .map(|inner| inner.as_str())
        })
        .chain(single_quoted(text))
}

/// Finds `'...'` literals whose opening quote has no word character before
/// it and whose closing quote has none after it.
fn single_quoted(text: &str) -> Vec<&str> {
    let mut literals = Vec::new();
    let mut open: Option<usize> = None;
    let mut previous: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((index, c)) = chars.next() {
        let next = chars.peek().map(|(_, next)| *next);
        match (c, open) {
            ('\n', _) => open = None,
            ('\'', None) if !previous.is_some_and(is_word_char) => {
                open = Some(index + c.len_utf8());
            }
            ('\'', Some(start)) if !next.is_some_and(is_word_char) => {
                literals.push(&text[start..index]);
                open = None;
            }
            _ => {}
        }
        previous = Some(c);
    }
    literals
}

fn name_pattern(candidate: &str) -> Option<Regex> {
    let name = candidate.trim();
    if name.is_empty() {
        return None;
    }
    Regex::new(&format!("(?i){}", whole_word(name))).ok()
}

/// Escapes `name` and adds word boundaries on sides that start/end with a
/// word character.
fn whole_word(name: &str) -> String {
    let escaped = regex::escape(name);
    let lead = if name.chars().next().is_some_and(is_word_char) {
        r"\b"
    } else {
        ""
    };
    let trail = if name.chars().last().is_some_and(is_word_char) {
        r"\b"
    } else {
        ""
    };
    format!("{lead}{escaped}{trail}")
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
