use chrono::Utc;
use tracing::info;

use crate::error::{Error, Result};

use super::chunk::{chunk_text, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use super::types::{DocBody, DocKind, Document};

/// Turn an uploaded payload into a stored document.
///
/// The payload must already be text: this core does not parse PDF or Excel
/// binaries, so those kinds arrive pre-extracted. A payload that does not
/// decode as UTF-8 is a `ParseFailure` for that one item; other uploads in
/// the same batch are unaffected.
///
/// The ID is a blake3 hash of the content, so re-ingesting the same bytes
/// produces the same document.
pub fn ingest_bytes(
    name: &str,
    kind: DocKind,
    entity: Option<&str>,
    bytes: &[u8],
) -> Result<Document> {
    let content = match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            return Err(Error::ParseFailure {
                name: name.to_string(),
                message: format!(
                    "{} payload is not UTF-8 text; extract text before upload",
                    kind.as_str()
                ),
            })
        }
    };

    if content.trim().is_empty() {
        return Err(Error::ParseFailure {
            name: name.to_string(),
            message: "no text content".to_string(),
        });
    }

    let id = blake3::hash(content.as_bytes()).to_hex().to_string();
    let chunks = chunk_text(&content, DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP);

    let body = if chunks.len() > 1 {
        DocBody::Chunked { content, chunks }
    } else {
        DocBody::Raw { content }
    };

    let doc = Document {
        id,
        name: name.to_string(),
        kind,
        entity: entity.map(|s| s.to_string()),
        uploaded_at: Utc::now(),
        body,
    };

    info!(
        doc_id = %doc.id,
        name,
        kind = kind.as_str(),
        entity = entity.unwrap_or("-"),
        "document ingested"
    );

    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_text_ingests_as_chunked() {
        let text = "Standard Bank declared a final dividend. ".repeat(60);
        let doc = ingest_bytes("SBK_Results.txt", DocKind::Txt, Some("SBK"), text.as_bytes())
            .unwrap();
        match &doc.body {
            DocBody::Chunked { content, chunks } => {
                assert_eq!(content, &text);
                assert!(chunks.len() > 1);
            }
            other => panic!("expected chunked body, got {:?}", other),
        }
        assert_eq!(doc.entity.as_deref(), Some("SBK"));
    }

    #[test]
    fn test_short_text_ingests_as_raw() {
        let doc = ingest_bytes("note.txt", DocKind::Txt, None, b"MTN acquired a fintech.").unwrap();
        assert!(matches!(doc.body, DocBody::Raw { .. }));
    }

    #[test]
    fn test_binary_payload_is_parse_failure() {
        let err = ingest_bytes("report.pdf", DocKind::Pdf, None, &[0x25, 0x50, 0x44, 0x46, 0xff])
            .unwrap_err();
        assert!(matches!(err, Error::ParseFailure { .. }));
    }

    #[test]
    fn test_empty_payload_is_parse_failure() {
        let err = ingest_bytes("empty.csv", DocKind::Csv, None, b"  \n").unwrap_err();
        assert!(matches!(err, Error::ParseFailure { .. }));
    }

    #[test]
    fn test_same_content_same_id() {
        let a = ingest_bytes("a.txt", DocKind::Txt, None, b"identical content").unwrap();
        let b = ingest_bytes("b.txt", DocKind::Txt, None, b"identical content").unwrap();
        assert_eq!(a.id, b.id);
    }
}
