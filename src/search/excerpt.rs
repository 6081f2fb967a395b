//! Bounded snippets around matched terms.

use super::tokenize::{Tokenizer, words};

/// Maximum characters of document text in an excerpt, before ellipses.
pub(crate) const MAX_EXCERPT_CHARS: usize = 300;

/// Characters of context kept ahead of the first match.
const LEAD_CHARS: usize = 80;

const ELLIPSIS: &str = "...";

/// Builds a whitespace-collapsed excerpt of `content` anchored at the first
/// word producing any of `terms`, or at the start when nothing matches.
///
/// Cut points are moved to whitespace where possible; an ellipsis marks each
/// side that was cut.
pub(crate) fn excerpt(content: &str, terms: &[String], tokenizer: &Tokenizer) -> String {
    let anchor = words(content)
        .find(|(_, word)| {
            tokenizer
                .word_tokens(word)
                .iter()
                .any(|token| terms.contains(token))
        })
        .map_or(0, |(offset, _)| offset);

    let mut start = content[..anchor]
        .char_indices()
        .rev()
        .nth(LEAD_CHARS.saturating_sub(1))
        .map_or(0, |(i, _)| i);
    if start > 0
        && let Some(space) = content[start..anchor].find(char::is_whitespace)
    {
        start += space;
    }

    let mut end = content[start..]
        .char_indices()
        .nth(MAX_EXCERPT_CHARS)
        .map_or(content.len(), |(i, _)| start + i);
    if end < content.len()
        && let Some(space) = content[anchor..end].rfind(char::is_whitespace)
    {
        end = anchor + space;
    }

    let body = content[start..end].split_whitespace().collect::<Vec<_>>().join(" ");
    let mut out = String::with_capacity(body.len() + 2 * ELLIPSIS.len());
    if start > 0 {
        out.push_str(ELLIPSIS);
    }
    out.push_str(&body);
    if end < content.len() && !content[end..].trim().is_empty() {
        out.push_str(ELLIPSIS);
    }
    out
}
