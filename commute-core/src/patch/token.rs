//! Token character classes and whole-token replacement.
//!
//! A token class is a tiny regex bracket expression, in the dialect darcs
//! uses for `replace` patches: literal characters, ranges such as `a-z`,
//! the escapes `\.`, `\-` and `\\`, the control escapes `\n` and `\t`, and a
//! leading `^` to negate the class (`\^` at the start stands for a literal
//! caret). A token is a maximal run of characters in the class.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

/// The token class used when none is given: identifiers.
pub const DEFAULT_TOKEN_CLASS: &str = "A-Za-z_0-9";

/// Error parsing a token class.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum InvalidTokenClass {
    /// The class contains no characters.
    #[error("Empty token class")]
    Empty,
    /// An escape sequence that the token dialect does not support.
    #[error("'\\{0}' not supported in token class {1:?}")]
    UnsupportedEscape(char, SmolStr),
    /// A backslash at the end of the class.
    #[error("Dangling escape at the end of token class {0:?}")]
    DanglingEscape(SmolStr),
    /// A range missing its upper bound, such as `a-`.
    #[error("Incomplete range starting at '{0}' in token class {1:?}")]
    IncompleteRange(char, SmolStr),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ClassItem {
    Char(char),
    Range(char, char),
}

impl ClassItem {
    fn matches(self, c: char) -> bool {
        match self {
            ClassItem::Char(x) => x == c,
            ClassItem::Range(lo, hi) => lo <= c && c <= hi,
        }
    }
}

/// A parsed token character class.
///
/// Equality, ordering and hashing only consider the source text of the
/// class.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "SmolStr", into = "SmolStr")]
pub struct TokenClass {
    spec: SmolStr,
    negated: bool,
    items: Vec<ClassItem>,
}

impl TokenClass {
    /// Parse a token class.
    pub fn new(spec: impl Into<SmolStr>) -> Result<Self, InvalidTokenClass> {
        let spec = spec.into();
        if spec.is_empty() {
            return Err(InvalidTokenClass::Empty);
        }
        let (negated, body) = if let Some(rest) = spec.strip_prefix('^') {
            (true, rest)
        } else if spec.starts_with("\\^") {
            (false, &spec[1..])
        } else {
            (false, spec.as_str())
        };
        let items = parse_items(&unescape(body), &spec)?;
        Ok(Self {
            spec,
            negated,
            items,
        })
    }

    /// The source text of the class.
    pub fn as_str(&self) -> &str {
        &self.spec
    }

    /// Whether `c` is a token character.
    pub fn matches(&self, c: char) -> bool {
        self.items.iter().any(|item| item.matches(c)) != self.negated
    }

    /// Whether `s` consists of token characters only.
    pub fn is_token(&self, s: &str) -> bool {
        s.chars().all(|c| self.matches(c))
    }

    /// Iterate over the tokens of `line`.
    pub fn tokens<'a>(&'a self, line: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        Spans::new(self, line).filter_map(|span| match span {
            Span::Token(tok) => Some(tok),
            Span::Other(_) => None,
        })
    }

    /// Replace every token `old` of `line` by `new`.
    ///
    /// Returns `None` if `line` already contains the token `new`, as the
    /// replacement could then not be undone.
    pub fn try_tok_replace(&self, old: &str, new: &str, line: &str) -> Option<SmolStr> {
        let mut out = String::with_capacity(line.len());
        for span in Spans::new(self, line) {
            match span {
                Span::Token(tok) if tok == old => out.push_str(new),
                Span::Token(tok) if tok == new => return None,
                Span::Token(s) | Span::Other(s) => out.push_str(s),
            }
        }
        Some(out.into())
    }

    /// Apply [`TokenClass::try_tok_replace`] to every line, failing if any
    /// line fails.
    pub fn try_tok_replaces(&self, old: &str, new: &str, lines: &[SmolStr]) -> Option<Vec<SmolStr>> {
        lines
            .iter()
            .map(|line| self.try_tok_replace(old, new, line))
            .collect()
    }
}

impl Default for TokenClass {
    fn default() -> Self {
        DEFAULT_TOKEN_CLASS
            .parse()
            .expect("default token class is well formed")
    }
}

impl FromStr for TokenClass {
    type Err = InvalidTokenClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<SmolStr> for TokenClass {
    type Error = InvalidTokenClass;

    fn try_from(spec: SmolStr) -> Result<Self, Self::Error> {
        Self::new(spec)
    }
}

impl From<TokenClass> for SmolStr {
    fn from(class: TokenClass) -> Self {
        class.spec
    }
}

impl PartialEq for TokenClass {
    fn eq(&self, other: &Self) -> bool {
        self.spec == other.spec
    }
}

impl Eq for TokenClass {}

impl PartialOrd for TokenClass {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TokenClass {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.spec.cmp(&other.spec)
    }
}

impl std::hash::Hash for TokenClass {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.spec.hash(state);
    }
}

impl fmt::Debug for TokenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TokenClass").field(&self.spec).finish()
    }
}

impl fmt::Display for TokenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.spec)
    }
}

/// Resolve the control escapes `\n`, `\t` and `\^`, keeping every other
/// backslash for the class parser.
fn unescape(body: &str) -> Vec<char> {
    let mut out = Vec::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            let replacement = match chars.peek() {
                Some('n') => Some('\n'),
                Some('t') => Some('\t'),
                Some('^') => Some('^'),
                _ => None,
            };
            if let Some(r) = replacement {
                chars.next();
                out.push(r);
                continue;
            }
        }
        out.push(c);
    }
    out
}

fn parse_items(chars: &[char], spec: &SmolStr) -> Result<Vec<ClassItem>, InvalidTokenClass> {
    let mut items = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            match chars.get(i + 1) {
                Some(&e @ ('.' | '-' | '\\')) => items.push(ClassItem::Char(e)),
                Some(&e) => return Err(InvalidTokenClass::UnsupportedEscape(e, spec.clone())),
                None => return Err(InvalidTokenClass::DanglingEscape(spec.clone())),
            }
            i += 2;
        } else if chars.get(i + 1) == Some(&'-') {
            let hi = *chars
                .get(i + 2)
                .ok_or_else(|| InvalidTokenClass::IncompleteRange(c, spec.clone()))?;
            items.push(ClassItem::Range(c, hi));
            i += 3;
        } else {
            items.push(ClassItem::Char(c));
            i += 1;
        }
    }
    Ok(items)
}

/// A run of characters that are either all token characters or all not.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Span<'a> {
    Token(&'a str),
    Other(&'a str),
}

struct Spans<'a> {
    class: &'a TokenClass,
    rest: &'a str,
}

impl<'a> Spans<'a> {
    fn new(class: &'a TokenClass, line: &'a str) -> Self {
        Self { class, rest: line }
    }
}

impl<'a> Iterator for Spans<'a> {
    type Item = Span<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.rest.chars().next()?;
        let in_token = self.class.matches(first);
        let end = self
            .rest
            .find(|c| self.class.matches(c) != in_token)
            .unwrap_or(self.rest.len());
        let (span, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(if in_token {
            Span::Token(span)
        } else {
            Span::Other(span)
        })
    }
}
