use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::docs::DocumentCollection;
use crate::error::{Error, Result};
use crate::llm::ModelSettings;
use crate::sens::Announcement;

/// JSE sector classifications used for company entry and context fragments.
pub const JSE_SECTORS: &[&str] = &[
    "Basic Materials",
    "Consumer Discretionary",
    "Consumer Staples",
    "Energy",
    "Financials",
    "Health Care",
    "Industrials",
    "Real Estate",
    "Technology",
    "Telecommunications",
    "Utilities",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub ticker: String,
    pub name: String,
    pub sector: String,
    pub description: String,
    pub added_at: DateTime<Utc>,
}

/// Normalize and validate a JSE ticker: 2-5 ASCII letters, uppercased.
pub fn validate_ticker(raw: &str) -> Result<String> {
    let ticker = raw.trim().to_ascii_uppercase();
    if ticker.len() >= 2
        && ticker.len() <= 5
        && ticker.chars().all(|c| c.is_ascii_alphabetic())
    {
        Ok(ticker)
    } else {
        Err(Error::InputValidation(format!(
            "ticker must be 2-5 letters, got '{}'",
            raw.trim()
        )))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in the append-only conversation log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Source labels cited for assistant messages; empty for user messages.
    pub sources: Vec<String>,
    pub model: String,
}

/// All state owned by one session. Created at session start, mutated only by
/// the session's own sequential handler calls, discarded at session end.
#[derive(Default)]
pub struct SessionState {
    pub companies: Vec<Company>,
    pub watchlist: Vec<String>,
    pub tracked_tickers: Vec<String>,
    pub documents: DocumentCollection,
    pub announcements: Vec<Announcement>,
    pub messages: Vec<Message>,
    pub settings: ModelSettings,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            settings: ModelSettings::default(),
            ..Default::default()
        }
    }

    /// Add a validated company. Duplicate tickers are rejected.
    pub fn add_company(
        &mut self,
        ticker: &str,
        name: &str,
        sector: &str,
        description: &str,
    ) -> Result<()> {
        let ticker = validate_ticker(ticker)?;
        if name.trim().is_empty() {
            return Err(Error::InputValidation("company name is required".into()));
        }
        if !JSE_SECTORS.contains(&sector) {
            return Err(Error::InputValidation(format!("unknown sector '{}'", sector)));
        }
        if self.companies.iter().any(|c| c.ticker == ticker) {
            return Err(Error::InputValidation(format!(
                "company with ticker '{}' already exists",
                ticker
            )));
        }

        info!(ticker = %ticker, name, sector, "company added");
        self.companies.push(Company {
            ticker,
            name: name.trim().to_string(),
            sector: sector.to_string(),
            description: description.trim().to_string(),
            added_at: Utc::now(),
        });
        Ok(())
    }

    pub fn remove_company(&mut self, ticker: &str) -> bool {
        let before = self.companies.len();
        self.companies.retain(|c| !c.ticker.eq_ignore_ascii_case(ticker));
        self.companies.len() != before
    }

    /// Add a ticker to the watchlist; duplicates are ignored.
    pub fn watch(&mut self, ticker: &str) -> Result<bool> {
        let ticker = validate_ticker(ticker)?;
        if self.watchlist.contains(&ticker) {
            return Ok(false);
        }
        self.watchlist.push(ticker);
        Ok(true)
    }

    pub fn unwatch(&mut self, ticker: &str) -> bool {
        let before = self.watchlist.len();
        self.watchlist.retain(|t| !t.eq_ignore_ascii_case(ticker));
        self.watchlist.len() != before
    }

    /// Start tracking a ticker for SENS alerts; duplicates are ignored.
    pub fn track(&mut self, ticker: &str) -> Result<bool> {
        let ticker = validate_ticker(ticker)?;
        if self.tracked_tickers.contains(&ticker) {
            return Ok(false);
        }
        self.tracked_tickers.push(ticker);
        Ok(true)
    }

    pub fn untrack(&mut self, ticker: &str) -> bool {
        let before = self.tracked_tickers.len();
        self.tracked_tickers.retain(|t| !t.eq_ignore_ascii_case(ticker));
        self.tracked_tickers.len() != before
    }

    pub fn clear_chat(&mut self) {
        self.messages.clear();
    }

    pub fn clear_documents(&mut self) {
        self.documents.clear();
    }

    /// Export portfolio bookkeeping and settings as a flat JSON object.
    /// Documents and the conversation log stay session-local.
    pub fn export(&self) -> serde_json::Value {
        serde_json::json!({
            "exported_at": Utc::now().to_rfc3339(),
            "companies": self.companies,
            "watchlist": self.watchlist,
            "tracked_tickers": self.tracked_tickers,
            "settings": self.settings,
        })
    }

    /// Apply an exported configuration. Only recognized top-level keys are
    /// applied; anything else in the payload is ignored and any state the
    /// payload doesn't mention is left as-is.
    pub fn import(&mut self, data: &serde_json::Value) -> Result<()> {
        if let Some(companies) = data.get("companies") {
            self.companies = serde_json::from_value(companies.clone())?;
        }
        if let Some(watchlist) = data.get("watchlist") {
            self.watchlist = serde_json::from_value(watchlist.clone())?;
        }
        if let Some(tracked) = data.get("tracked_tickers") {
            self.tracked_tickers = serde_json::from_value(tracked.clone())?;
        }
        if let Some(settings) = data.get("settings") {
            self.settings = serde_json::from_value(settings.clone())?;
        }
        info!(
            companies = self.companies.len(),
            watchlist = self.watchlist.len(),
            tracked = self.tracked_tickers.len(),
            "configuration imported"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ticker_normalizes() {
        assert_eq!(validate_ticker(" npn ").unwrap(), "NPN");
        assert_eq!(validate_ticker("SBK").unwrap(), "SBK");
    }

    #[test]
    fn test_validate_ticker_rejects_bad_input() {
        assert!(validate_ticker("X").is_err());
        assert!(validate_ticker("TOOLONG").is_err());
        assert!(validate_ticker("NP1").is_err());
        assert!(validate_ticker("").is_err());
    }

    #[test]
    fn test_add_company_rejects_duplicates_and_bad_sector() {
        let mut state = SessionState::new();
        state
            .add_company("SBK", "Standard Bank Group", "Financials", "")
            .unwrap();
        assert!(state.add_company("sbk", "Other", "Financials", "").is_err());
        assert!(state.add_company("NPN", "Naspers", "Fintech", "").is_err());
        assert_eq!(state.companies.len(), 1);
    }

    #[test]
    fn test_watch_dedupes() {
        let mut state = SessionState::new();
        assert!(state.watch("npn").unwrap());
        assert!(!state.watch("NPN").unwrap());
        assert_eq!(state.watchlist, vec!["NPN"]);
        assert!(state.unwatch("npn"));
        assert!(state.watchlist.is_empty());
    }

    #[test]
    fn test_track_and_untrack() {
        let mut state = SessionState::new();
        assert!(state.track("sol").unwrap());
        assert!(!state.track("SOL").unwrap());
        assert_eq!(state.tracked_tickers, vec!["SOL"]);
        assert!(state.untrack("sol"));
        assert!(!state.untrack("SOL"));
    }

    #[test]
    fn test_export_import_round_trip() {
        let mut state = SessionState::new();
        state
            .add_company("SOL", "Sasol Limited", "Energy", "")
            .unwrap();
        state.watch("MTN").unwrap();
        state.settings.temperature = 0.7;

        let exported = state.export();

        let mut fresh = SessionState::new();
        fresh.import(&exported).unwrap();
        assert_eq!(fresh.companies.len(), 1);
        assert_eq!(fresh.watchlist, vec!["MTN"]);
        assert!((fresh.settings.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_import_is_a_partial_merge() {
        let mut state = SessionState::new();
        state.watch("SBK").unwrap();
        state.settings.max_tokens = 1024;

        // Payload mentions only the watchlist; settings and unknown keys are
        // left untouched.
        let payload = serde_json::json!({
            "watchlist": ["NPN", "AGL"],
            "future_field": {"nested": true},
        });
        state.import(&payload).unwrap();

        assert_eq!(state.watchlist, vec!["NPN", "AGL"]);
        assert_eq!(state.settings.max_tokens, 1024);
    }

    #[test]
    fn test_chat_log_cleared_only_explicitly() {
        let mut state = SessionState::new();
        state.messages.push(Message {
            role: Role::User,
            content: "hello".into(),
            timestamp: Utc::now(),
            sources: vec![],
            model: String::new(),
        });
        state.clear_documents();
        assert_eq!(state.messages.len(), 1);
        state.clear_chat();
        assert!(state.messages.is_empty());
    }
}
