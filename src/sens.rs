//! SENS announcement feed: manually populated records plus the filters and
//! stats the monitor surface is built from. No fetching happens here.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Fixed category list for announcement entry and filtering.
pub const SENS_CATEGORIES: &[&str] = &[
    "Trading Statement",
    "Dividend Declaration",
    "Operational Update",
    "Acquisition",
    "Production Report",
    "Director Dealings",
    "Corporate Action",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub date: DateTime<Utc>,
    pub ticker: String,
    pub company: String,
    pub category: String,
    pub headline: String,
    pub summary: String,
    pub sentiment: Sentiment,
}

/// Time window filter for the announcement list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    AllTime,
    Today,
    ThisWeek,
    ThisMonth,
}

impl TimeWindow {
    fn contains(&self, date: DateTime<Utc>) -> bool {
        let age = Utc::now().signed_duration_since(date);
        match self {
            TimeWindow::AllTime => true,
            TimeWindow::Today => age < Duration::days(1),
            TimeWindow::ThisWeek => age <= Duration::days(7),
            TimeWindow::ThisMonth => age <= Duration::days(30),
        }
    }
}

/// Apply ticker/category/time filters. `None` means no constraint.
pub fn filter_announcements<'a>(
    announcements: &'a [Announcement],
    ticker: Option<&str>,
    category: Option<&str>,
    window: TimeWindow,
) -> Vec<&'a Announcement> {
    announcements
        .iter()
        .filter(|a| ticker.map_or(true, |t| a.ticker.eq_ignore_ascii_case(t)))
        .filter(|a| category.map_or(true, |c| a.category == c))
        .filter(|a| window.contains(a.date))
        .collect()
}

/// The `limit` most recent announcements, newest first.
pub fn most_recent(announcements: &[Announcement], limit: usize) -> Vec<&Announcement> {
    let mut sorted: Vec<&Announcement> = announcements.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted.truncate(limit);
    sorted
}

/// Sentiment counts for the stats row: (positive, negative, neutral).
pub fn sentiment_stats(announcements: &[Announcement]) -> (usize, usize, usize) {
    let mut counts = (0, 0, 0);
    for a in announcements {
        match a.sentiment {
            Sentiment::Positive => counts.0 += 1,
            Sentiment::Negative => counts.1 += 1,
            Sentiment::Neutral => counts.2 += 1,
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn announcement(ticker: &str, category: &str, hours_ago: i64, sentiment: Sentiment) -> Announcement {
        Announcement {
            date: Utc::now() - Duration::hours(hours_ago),
            ticker: ticker.to_string(),
            company: format!("{} Ltd", ticker),
            category: category.to_string(),
            headline: format!("{} update", ticker),
            summary: String::new(),
            sentiment,
        }
    }

    #[test]
    fn test_filter_by_ticker_case_insensitive() {
        let anns = vec![
            announcement("SBK", "Dividend Declaration", 2, Sentiment::Positive),
            announcement("NPN", "Trading Statement", 3, Sentiment::Positive),
        ];
        let filtered = filter_announcements(&anns, Some("sbk"), None, TimeWindow::AllTime);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].ticker, "SBK");
    }

    #[test]
    fn test_filter_by_category_and_window() {
        let anns = vec![
            announcement("SOL", "Operational Update", 5, Sentiment::Neutral),
            announcement("SOL", "Operational Update", 26, Sentiment::Neutral),
            announcement("SOL", "Acquisition", 5, Sentiment::Positive),
        ];
        let filtered =
            filter_announcements(&anns, None, Some("Operational Update"), TimeWindow::Today);
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_most_recent_orders_newest_first() {
        let anns = vec![
            announcement("AGL", "Production Report", 48, Sentiment::Neutral),
            announcement("MTN", "Acquisition", 30, Sentiment::Positive),
            announcement("SBK", "Dividend Declaration", 5, Sentiment::Positive),
        ];
        let recent = most_recent(&anns, 2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].ticker, "SBK");
        assert_eq!(recent[1].ticker, "MTN");
    }

    #[test]
    fn test_sentiment_stats() {
        let anns = vec![
            announcement("A", "Acquisition", 1, Sentiment::Positive),
            announcement("B", "Acquisition", 1, Sentiment::Positive),
            announcement("C", "Acquisition", 1, Sentiment::Negative),
        ];
        assert_eq!(sentiment_stats(&anns), (2, 1, 0));
    }
}
