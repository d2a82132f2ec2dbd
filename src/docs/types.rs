use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Content-addressed document ID (blake3 hex hash).
pub type DocId = String;

/// Declared upload type. PDF/Excel text extraction happens upstream of this
/// core; the declared kind is kept for display and bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocKind {
    Pdf,
    Csv,
    Xlsx,
    Txt,
}

impl DocKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocKind::Pdf),
            "csv" => Some(DocKind::Csv),
            "xlsx" | "xls" => Some(DocKind::Xlsx),
            "txt" => Some(DocKind::Txt),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocKind::Pdf => "pdf",
            DocKind::Csv => "csv",
            DocKind::Xlsx => "xlsx",
            DocKind::Txt => "txt",
        }
    }
}

/// Document payload. One mandatory payload per variant; a chunked body keeps
/// its raw content so entity matching against the opening text still works.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum DocBody {
    Chunked { content: String, chunks: Vec<String> },
    Raw { content: String },
    SummaryOnly { summary: String },
}

impl DocBody {
    /// Raw text, if this body carries any.
    pub fn content(&self) -> Option<&str> {
        match self {
            DocBody::Chunked { content, .. } | DocBody::Raw { content } => Some(content),
            DocBody::SummaryOnly { .. } => None,
        }
    }
}

/// An ingested document, immutable once stored except for deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub name: String,
    pub kind: DocKind,
    /// Ticker of the company this document is associated with, if any.
    pub entity: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub body: DocBody,
}

impl Document {
    /// Build a document whose only payload is a generated summary.
    pub fn summary_only(name: &str, kind: DocKind, entity: Option<&str>, summary: String) -> Self {
        Document {
            id: blake3::hash(summary.as_bytes()).to_hex().to_string(),
            name: name.to_string(),
            kind,
            entity: entity.map(|s| s.to_string()),
            uploaded_at: Utc::now(),
            body: DocBody::SummaryOnly { summary },
        }
    }
}
