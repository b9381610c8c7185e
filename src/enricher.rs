//! Content validation and word-count enrichment.
//!
//! Runs even when the fetch nominally succeeded: an HTTP 200 with empty or
//! near-empty content is a failure at the content layer and is recorded as
//! such, never as a silent success.

use crate::config::ContentConfig;
use crate::data_model::Enrichment;

pub const CONTENT_TOO_SHORT: &str = "content too short or missing";

/// Validates raw page text and derives the word count.
///
/// Absent content, or content whose trimmed length falls below the
/// configured minimum, produces `Rejected`; otherwise the body (capped at
/// `max_body_chars`) and its whitespace-token count are returned together so
/// the two can never disagree.
pub fn enrich(raw: Option<&str>, config: &ContentConfig) -> Enrichment {
    let Some(raw) = raw else {
        return Enrichment::Rejected {
            error: CONTENT_TOO_SHORT.to_string(),
        };
    };

    if raw.trim().chars().count() < config.min_chars {
        return Enrichment::Rejected {
            error: CONTENT_TOO_SHORT.to_string(),
        };
    }

    let body = truncate_chars(raw, config.max_body_chars);
    let word_count = body.split_whitespace().count() as u64;
    Enrichment::Content {
        body: body.to_string(),
        word_count,
    }
}

// Char-boundary-safe prefix; byte slicing would panic on multibyte text.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
