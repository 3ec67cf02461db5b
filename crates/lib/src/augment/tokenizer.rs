//! Placeholder-aware tokenizer.
//!
//! Splits text into words (alphanumerics with an optional internal apostrophe), single
//! punctuation characters, and bracket placeholders such as `[country]`, which are kept as
//! one unsplittable token. Spacing is not preserved; [`detokenize`] rebuilds readable text.

use std::sync::LazyLock;

use regex::Regex;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]+\]|\w+(?:'\w+)?|[^\w\s]").expect("token regex"));

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]+\]").expect("placeholder regex"));

/// Punctuation that attaches to the preceding token when rebuilding text.
const CLOSING_PUNCT: &[&str] = &[".", ",", "!", "?", ";", ":"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Bracket-delimited parameter slot, e.g. `[a]`.
    Placeholder,
    Word,
    Punct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn word(text: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Word,
            text: text.into(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.kind == TokenKind::Placeholder
    }

    /// Words and placeholders; everything but punctuation.
    pub fn is_content(&self) -> bool {
        self.kind != TokenKind::Punct
    }
}

pub fn tokenize(text: &str) -> Vec<Token> {
    TOKEN_RE
        .find_iter(text)
        .map(|m| {
            let s = m.as_str();
            let kind = if s.starts_with('[') && s.len() > 2 && s.ends_with(']') {
                TokenKind::Placeholder
            } else if s.chars().next().is_some_and(|c| c.is_alphanumeric() || c == '_') {
                TokenKind::Word
            } else {
                TokenKind::Punct
            };
            Token {
                kind,
                text: s.to_string(),
            }
        })
        .collect()
}

pub fn detokenize(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        let attach = token.kind == TokenKind::Punct && CLOSING_PUNCT.contains(&token.text.as_str());
        if !out.is_empty() && !attach {
            out.push(' ');
        }
        out.push_str(&token.text);
    }
    out
}

/// Placeholders in left-to-right order, duplicates included.
pub fn placeholders(text: &str) -> Vec<&str> {
    PLACEHOLDER_RE.find_iter(text).map(|m| m.as_str()).collect()
}

/// True when every placeholder of `original` still appears verbatim in `candidate`.
pub fn preserves_placeholders(original: &[&str], candidate: &str) -> bool {
    original.iter().all(|p| candidate.contains(p))
}
