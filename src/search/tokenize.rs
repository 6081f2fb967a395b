//! Text tokenization and stemming shared by indexing and querying.

use rust_stemmers::{Algorithm, Stemmer};

/// Common English stop words to filter out from indexing.
/// These high-frequency words add little value to search relevance.
pub(crate) const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it",
    "its", "of", "on", "that", "the", "to", "was", "will", "with",
];

/// Lowercasing, stop-word filtering, stemming tokenizer.
///
/// Words are runs of alphanumeric characters joined by `-` or `_`. Compound
/// words are split on those delimiters and on lowercase-to-uppercase
/// transitions, and the joined form is kept as well:
/// - **CamelCase**: "HttpServer" → "http", "server", "httpserver"
/// - **snake_case**: "parse_json" → "parse", "json", "parsejson"
/// - **hyphen-case**: "multi-line" → "multi", "line", "multiline"
///
/// Every token is then stemmed, so "parsing" and "parse" meet.
pub(crate) struct Tokenizer {
    stemmer: Stemmer,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }
}

impl Tokenizer {
    /// Tokenizes a whole text in reading order.
    pub(crate) fn tokenize(&self, text: &str) -> Vec<String> {
        let mut tokens = vec![];
        for (_, word) in words(text) {
            self.push_word(word, &mut tokens);
        }
        tokens
    }

    /// Tokenizes a single word as produced by [`words`].
    pub(crate) fn word_tokens(&self, word: &str) -> Vec<String> {
        let mut tokens = vec![];
        self.push_word(word, &mut tokens);
        tokens
    }

    fn push_word(&self, word: &str, tokens: &mut Vec<String>) {
        let parts = subwords(word);
        if parts.len() > 1 {
            for part in &parts {
                self.push_token(part, tokens);
            }
            self.push_token(&parts.concat(), tokens);
        } else if let Some(part) = parts.first() {
            self.push_token(part, tokens);
        }
    }

    /// Add a token using proper stemming algorithm, filtering out stop words.
    fn push_token(&self, token: &str, tokens: &mut Vec<String>) {
        let lowercase = token.to_lowercase();

        if lowercase.is_empty() || STOP_WORDS.contains(&lowercase.as_str()) {
            return;
        }

        let stemmed = self.stemmer.stem(&lowercase);
        tokens.push(stemmed.into_owned());
    }
}

const fn is_joiner(c: char) -> bool {
    c == '-' || c == '_'
}

/// Iterates over the words of `text` with their byte offsets.
///
/// Leading and trailing joiners are not part of a word.
pub(crate) fn words(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut chars = text.char_indices().peekable();
    std::iter::from_fn(move || {
        let (start, first) = loop {
            let (i, c) = chars.next()?;
            if c.is_alphanumeric() {
                break (i, c);
            }
        };

        let mut end = start + first.len_utf8();
        while let Some(&(i, c)) = chars.peek() {
            if c.is_alphanumeric() {
                end = i + c.len_utf8();
            } else if !is_joiner(c) {
                break;
            }
            chars.next();
        }
        Some((start, &text[start..end]))
    })
}

/// Splits a word on joiners and lowercase-to-uppercase transitions.
fn subwords(word: &str) -> Vec<&str> {
    let mut parts = vec![];
    for segment in word.split(is_joiner).filter(|s| !s.is_empty()) {
        let mut part_start = 0;
        let mut last_lower = false;
        for (i, c) in segment.char_indices() {
            if last_lower && c.is_uppercase() {
                parts.push(&segment[part_start..i]);
                part_start = i;
            }
            last_lower = c.is_lowercase();
        }
        parts.push(&segment[part_start..]);
    }
    parts
}
