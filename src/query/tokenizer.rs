//! Query tokenizer.
//!
//! Splits free text on whitespace and reassembles the words into comparison
//! tokens (`key<op>value`). Words are folded into the currently open token
//! until a word opens a new one, which rebuilds multi-word values:
//!
//! ```text
//! name=Lightning Bolt qty >= 3
//! └──────┬──────────┘ └───┬──┘
//!   name=Lightning Bolt  qty>=3
//! ```
//!
//! A word opens a new token when it carries an operator after some parameter
//! text (`qty>=3`, `qty>=`). With keywords (the alias names of an
//! [`AliasConfig`]), a keyword also opens a new token once the open token
//! already has a value, and a keyword followed by words but no operator is an
//! implicit equality (`card Bolt` is `card=Bolt`).
//!
//! Tokens that end up without an operator, parameter or value are dropped.

use std::collections::HashSet;

use regex::Regex;
use tracing::{debug, trace};

use crate::config::AliasConfig;
use crate::{ComparisonToken, Operator};

/// Leftmost operator; two-character symbols win at the same position.
fn operator_pattern() -> &'static Regex {
    regex!(r">=|<=|!=|>|<|=")
}

/// Tokenizer output including the fragments that were dropped.
#[derive(Debug, Clone, Default)]
pub(crate) struct Scan {
    pub tokens: Vec<ComparisonToken>,
    pub dropped: Vec<String>,
}

/// Splits query text into [`ComparisonToken`]s.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    /// Lowercased clause keywords.
    keywords: HashSet<String>,
}

/// A token being assembled from consecutive words.
struct Open {
    text: String,
    words: usize,
    has_operator: bool,
}

impl Open {
    fn new(word: &str) -> Self {
        Open { text: word.to_string(), words: 1, has_operator: operator_pattern().is_match(word) }
    }

    fn push(&mut self, word: &str) {
        self.text.push(' ');
        self.text.push_str(word);
        self.words += 1;
        self.has_operator |= operator_pattern().is_match(word);
    }

    fn has_value(&self) -> bool {
        self.has_operator || self.words > 1
    }
}

impl Tokenizer {
    /// A tokenizer without keywords: only explicit comparisons are kept.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self { keywords: keywords.into_iter().map(|k| k.as_ref().to_lowercase()).collect() }
    }

    /// A tokenizer that knows every alias of `config`.
    pub fn for_config(config: &AliasConfig) -> Self {
        Self::with_keywords(config.keywords())
    }

    /// Tokenize `text`. Returns an empty vector when nothing recognizable is found.
    pub fn tokenize(&self, text: &str) -> Vec<ComparisonToken> {
        self.scan(text).tokens
    }

    pub(crate) fn scan(&self, text: &str) -> Scan {
        let mut assembled: Vec<Open> = Vec::new();

        for word in text.split_whitespace() {
            let opens = assembled.last().is_none_or(|open| self.opens_token(word, open));
            if opens {
                assembled.push(Open::new(word));
            } else if let Some(open) = assembled.last_mut() {
                open.push(word);
            }
        }

        let mut scan = Scan::default();
        for open in assembled {
            match self.finish(&open) {
                Some(token) => scan.tokens.push(token),
                None => scan.dropped.push(open.text),
            }
        }

        debug!(tokens = scan.tokens.len(), dropped = scan.dropped.len(), "tokenized query");
        scan
    }

    fn is_keyword(&self, word: &str) -> bool {
        !self.keywords.is_empty() && self.keywords.contains(&word.to_lowercase())
    }

    fn opens_token(&self, word: &str, open: &Open) -> bool {
        let has_parameter = operator_pattern().find(word).is_some_and(|m| m.start() > 0);
        // a lone non-keyword word cannot take a keyword as its value
        has_parameter || (self.is_keyword(word) && (open.has_value() || !self.is_keyword(&open.text)))
    }

    fn finish(&self, open: &Open) -> Option<ComparisonToken> {
        let text = open.text.as_str();

        let Some(m) = operator_pattern().find(text) else {
            // implicit equality: `card Lightning Bolt`
            return match text.split_once(' ') {
                Some((keyword, value)) if self.is_keyword(keyword) => Some(ComparisonToken {
                    raw_parameter: keyword.to_string(),
                    operator: Operator::Equal,
                    raw_value: value.to_string(),
                }),
                _ => {
                    trace!(fragment = text, "dropping fragment without comparison");
                    None
                }
            };
        };

        let raw_parameter = text[..m.start()].trim();
        let raw_value = text[m.end()..].trim();
        if raw_parameter.is_empty() || raw_value.is_empty() {
            debug!(fragment = text, "dropping malformed comparison");
            return None;
        }

        let operator = m.as_str().parse::<Operator>().ok()?;
        Some(ComparisonToken { raw_parameter: raw_parameter.to_string(), operator, raw_value: raw_value.to_string() })
    }
}

/// Tokenize `text` without keywords.
///
/// # Example
/// ```
/// let tokens = decklens::query::tokenize("card Fireblast qty>=3");
/// assert_eq!(tokens.len(), 1);
/// assert_eq!(tokens[0].to_string(), "qty>=3");
/// ```
pub fn tokenize(text: &str) -> Vec<ComparisonToken> {
    Tokenizer::new().tokenize(text)
}
