//! Citation extraction over the context block that was sent with a prompt.
//!
//! Labels are pulled from the `[Source: ...]` markers in the sent context, not
//! from markers in the generated answer, so the output is always a subset of
//! what the model was actually offered.

use std::collections::BTreeSet;

const SOURCE_MARKER: &str = "[Source: ";

/// Extract the deduplicated set of source labels present in a context block.
/// Idempotent by construction.
pub fn extract_citations(context_block: &str) -> BTreeSet<String> {
    let mut labels = BTreeSet::new();
    let mut rest = context_block;

    while let Some(start) = rest.find(SOURCE_MARKER) {
        let after = &rest[start + SOURCE_MARKER.len()..];
        match after.find(']') {
            Some(end) => {
                labels.insert(after[..end].to_string());
                rest = &after[end + 1..];
            }
            None => break,
        }
    }

    labels
}

/// Keep only labels the generated answer actually mentions.
///
/// The original product reported every offered source as cited, whether or
/// not the model used it. Intersecting with the answer text fixes that; when
/// the model cites nothing verbatim the full offered set is kept, since loose
/// paraphrase of a single source is common and dropping everything would hide
/// real provenance.
pub fn filter_cited(offered: BTreeSet<String>, answer: &str) -> BTreeSet<String> {
    let mentioned: BTreeSet<String> = offered
        .iter()
        .filter(|label| answer.contains(label.as_str()))
        .cloned()
        .collect();

    if mentioned.is_empty() {
        offered
    } else {
        mentioned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_labels() {
        let context = "[Source: SBK_Annual_Report.pdf]\ntext\n\n---\n\n[Source: Watchlist]\nmore";
        let labels = extract_citations(context);
        assert_eq!(labels.len(), 2);
        assert!(labels.contains("SBK_Annual_Report.pdf"));
        assert!(labels.contains("Watchlist"));
    }

    #[test]
    fn test_deduplicates_repeated_labels() {
        let context = "[Source: a.txt]\none\n[Source: a.txt]\ntwo";
        assert_eq!(extract_citations(context).len(), 1);
    }

    #[test]
    fn test_idempotent() {
        let context = "[Source: a.txt]\nx\n[Source: b.txt - Summary]\ny";
        let first = extract_citations(context);
        let joined: String = first
            .iter()
            .map(|l| format!("[Source: {}]", l))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(extract_citations(&joined), first);
    }

    #[test]
    fn test_empty_and_unclosed_markers() {
        assert!(extract_citations("").is_empty());
        assert!(extract_citations("no markers here").is_empty());
        assert!(extract_citations("[Source: dangling").is_empty());
    }

    #[test]
    fn test_filter_cited_intersects_with_answer() {
        let offered: BTreeSet<String> =
            ["a.txt".to_string(), "b.txt".to_string()].into_iter().collect();
        let answer = "Per [Source: a.txt], earnings grew.";
        let cited = filter_cited(offered, answer);
        assert_eq!(cited.len(), 1);
        assert!(cited.contains("a.txt"));
    }

    #[test]
    fn test_filter_cited_falls_back_to_offered_set() {
        let offered: BTreeSet<String> = ["a.txt".to_string()].into_iter().collect();
        let cited = filter_cited(offered.clone(), "The report shows growth.");
        assert_eq!(cited, offered);
    }
}
