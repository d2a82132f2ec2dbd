//! Relevance selection: decides which documents and session collections feed
//! the prompt for one question. Matching is substring/keyword based: there is
//! no index, no scoring, and inclusion order follows the input collections.

use std::collections::HashSet;

use tracing::debug;

use crate::docs::types::{DocBody, Document};
use crate::sens::{most_recent, Announcement};
use crate::state::Company;

/// One labeled excerpt destined for the prompt. Request-scoped, not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextFragment {
    pub label: String,
    pub text: String,
}

/// Question keywords that pull the company list into context.
pub const HOLDINGS_KEYWORDS: &[&str] = &[
    "portfolio",
    "holdings",
    "position",
    "company",
    "companies",
    "sector",
    "sectors",
];

/// Question keywords that pull recent announcements into context.
pub const ANNOUNCEMENT_KEYWORDS: &[&str] = &["announcement", "news", "sens"];

const MAX_CHUNKS_PER_DOC: usize = 3;
const CHUNK_FRAGMENT_LIMIT: usize = 800;
const RAW_FRAGMENT_LIMIT: usize = 1500;
const CONTENT_MATCH_WINDOW: usize = 1000;
const MIN_TOKEN_LEN: usize = 3;
const RECENT_ANNOUNCEMENTS: usize = 5;

pub fn mentions_holdings(question: &str) -> bool {
    let q = question.to_lowercase();
    HOLDINGS_KEYWORDS.iter().any(|k| q.contains(k))
}

pub fn mentions_watchlist(question: &str) -> bool {
    question.to_lowercase().contains("watchlist")
}

pub fn mentions_announcements(question: &str) -> bool {
    let q = question.to_lowercase();
    ANNOUNCEMENT_KEYWORDS.iter().any(|k| q.contains(k))
}

/// Lowercased question tokens with punctuation stripped, longer than
/// `MIN_TOKEN_LEN` chars.
fn question_tokens(question: &str) -> Vec<String> {
    question
        .to_lowercase()
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|w| w.chars().count() > MIN_TOKEN_LEN)
        .collect()
}

/// Char-safe prefix of at most `limit` chars.
fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Boolean inclusion test for one document: any check passing includes it.
fn is_relevant(doc: &Document, entity_filter: Option<&str>, tokens: &[String]) -> bool {
    let name_lower = doc.name.to_lowercase();

    if let Some(filter) = entity_filter {
        let filter = filter.to_lowercase();
        if doc
            .entity
            .as_deref()
            .is_some_and(|e| e.eq_ignore_ascii_case(&filter))
        {
            return true;
        }
        if name_lower.contains(&filter) {
            return true;
        }
        if let Some(content) = doc.body.content() {
            let head = truncate_chars(content, CONTENT_MATCH_WINDOW).to_lowercase();
            if head.contains(&filter) {
                return true;
            }
        }
    }

    tokens.iter().any(|t| name_lower.contains(t.as_str()))
}

/// Pick the fragments that back one question.
///
/// Document fragments come first, in collection order; then the company list,
/// watchlist, and recent-announcement fragments, each only if its trigger
/// fires. An empty result tells the assembler to use the no-context template.
pub fn select_context(
    question: &str,
    entity_filter: Option<&str>,
    documents: &[Document],
    companies: &[Company],
    watchlist: &[String],
    announcements: &[Announcement],
) -> Vec<ContextFragment> {
    let tokens = question_tokens(question);
    let mut fragments = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    let mut push = |fragments: &mut Vec<ContextFragment>, label: String, text: String| {
        if seen.insert((label.clone(), text.clone())) {
            fragments.push(ContextFragment { label, text });
        }
    };

    for doc in documents {
        if !is_relevant(doc, entity_filter, &tokens) {
            continue;
        }
        match &doc.body {
            DocBody::Chunked { chunks, .. } => {
                for chunk in chunks.iter().take(MAX_CHUNKS_PER_DOC) {
                    push(
                        &mut fragments,
                        doc.name.clone(),
                        truncate_chars(chunk, CHUNK_FRAGMENT_LIMIT).to_string(),
                    );
                }
            }
            DocBody::Raw { content } => {
                push(
                    &mut fragments,
                    doc.name.clone(),
                    truncate_chars(content, RAW_FRAGMENT_LIMIT).to_string(),
                );
            }
            DocBody::SummaryOnly { summary } => {
                push(
                    &mut fragments,
                    format!("{} - Summary", doc.name),
                    summary.clone(),
                );
            }
        }
    }

    if mentions_holdings(question) && !companies.is_empty() {
        let listing = companies
            .iter()
            .map(|c| format!("{}: {} ({})", c.ticker, c.name, c.sector))
            .collect::<Vec<_>>()
            .join("\n");
        push(&mut fragments, "Tracked Companies".to_string(), listing);
    }

    if mentions_watchlist(question) && !watchlist.is_empty() {
        push(
            &mut fragments,
            "Watchlist".to_string(),
            format!("Tickers being watched: {}", watchlist.join(", ")),
        );
    }

    if mentions_announcements(question) && !announcements.is_empty() {
        let listing = most_recent(announcements, RECENT_ANNOUNCEMENTS)
            .iter()
            .map(|a| format!("{}: {} ({})", a.ticker, a.headline, a.category))
            .collect::<Vec<_>>()
            .join("\n");
        push(
            &mut fragments,
            "Recent SENS Announcements".to_string(),
            listing,
        );
    }

    debug!(
        question_tokens = tokens.len(),
        fragments = fragments.len(),
        "context selected"
    );
    fragments
}
