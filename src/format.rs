//! Formatting helpers shared by the session driver and context fragments.

use chrono::{DateTime, Utc};

/// Format a monetary value with a currency symbol and K/M/B abbreviation.
pub fn format_currency(value: f64, currency: &str) -> String {
    let symbol = match currency {
        "ZAR" => "R",
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        other => other,
    };

    let abs = value.abs();
    if abs >= 1e9 {
        format!("{}{:.2}B", symbol, value / 1e9)
    } else if abs >= 1e6 {
        format!("{}{:.2}M", symbol, value / 1e6)
    } else if abs >= 1e3 {
        format!("{}{:.2}K", symbol, value / 1e3)
    } else {
        format!("{}{:.2}", symbol, value)
    }
}

/// Format a fraction as a percentage (0.05 → "5.00%").
pub fn format_percentage(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value * 100.0)
}

/// Format a large number with K/M/B/T abbreviation.
pub fn format_number(value: f64, decimals: usize) -> String {
    let abs = value.abs();
    if abs >= 1e12 {
        format!("{:.*}T", decimals, value / 1e12)
    } else if abs >= 1e9 {
        format!("{:.*}B", decimals, value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.*}M", decimals, value / 1e6)
    } else if abs >= 1e3 {
        format!("{:.*}K", decimals, value / 1e3)
    } else {
        format!("{:.*}", decimals, value)
    }
}

/// Relative time for announcement cards ("2h ago").
pub fn format_relative_time(ts: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(ts);

    if duration.num_seconds() < 0 {
        "just now".to_string()
    } else if duration.num_seconds() < 60 {
        format!("{}s ago", duration.num_seconds())
    } else if duration.num_minutes() < 60 {
        format!("{}m ago", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{}h ago", duration.num_hours())
    } else {
        format!("{}d ago", duration.num_days())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_currency_abbreviation() {
        assert_eq!(format_currency(1_500_000_000.0, "ZAR"), "R1.50B");
        assert_eq!(format_currency(2_500_000.0, "USD"), "$2.50M");
        assert_eq!(format_currency(6_200.0, "ZAR"), "R6.20K");
        assert_eq!(format_currency(620.0, "ZAR"), "R620.00");
    }

    #[test]
    fn test_currency_unknown_code_passthrough() {
        assert_eq!(format_currency(100.0, "BWP"), "BWP100.00");
    }

    #[test]
    fn test_percentage() {
        assert_eq!(format_percentage(0.05, 2), "5.00%");
        assert_eq!(format_percentage(-0.123, 1), "-12.3%");
    }

    #[test]
    fn test_number_abbreviation() {
        assert_eq!(format_number(3_200_000_000_000.0, 2), "3.20T");
        assert_eq!(format_number(42.0, 0), "42");
    }

    #[test]
    fn test_relative_time() {
        let ts = Utc::now() - Duration::hours(2);
        assert_eq!(format_relative_time(ts), "2h ago");
        let ts = Utc::now() - Duration::days(3);
        assert_eq!(format_relative_time(ts), "3d ago");
    }
}
