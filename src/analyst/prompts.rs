//! Prompt templates for the analyst. Every persona carries the
//! no-price-predictions constraint; it is load-bearing for the product's
//! risk posture and must survive any edit to these preambles.

use crate::sens::{most_recent, Announcement};

use super::context::ContextFragment;

/// Delimiter between context fragments in the assembled block.
pub const CONTEXT_DELIMITER: &str = "\n\n---\n\n";

/// Cap on document text fed to the summarization prompt.
const SUMMARIZE_INPUT_LIMIT: usize = 10_000;
const DIGEST_ANNOUNCEMENT_LIMIT: usize = 10;

/// Analysis persona selected per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisMode {
    #[default]
    General,
    Fundamental,
    Technical,
    Sentiment,
    News,
}

impl AnalysisMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "general" => Some(AnalysisMode::General),
            "fundamental" => Some(AnalysisMode::Fundamental),
            "technical" => Some(AnalysisMode::Technical),
            "sentiment" => Some(AnalysisMode::Sentiment),
            "news" => Some(AnalysisMode::News),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::General => "general",
            AnalysisMode::Fundamental => "fundamental",
            AnalysisMode::Technical => "technical",
            AnalysisMode::Sentiment => "sentiment",
            AnalysisMode::News => "news",
        }
    }

    fn preamble(&self) -> &'static str {
        match self {
            AnalysisMode::General => GENERAL_PREAMBLE,
            AnalysisMode::Fundamental => FUNDAMENTAL_PREAMBLE,
            AnalysisMode::Technical => TECHNICAL_PREAMBLE,
            AnalysisMode::Sentiment => SENTIMENT_PREAMBLE,
            AnalysisMode::News => NEWS_PREAMBLE,
        }
    }
}

const GENERAL_PREAMBLE: &str = "\
You are a senior financial analyst specializing in JSE-listed equities.
Provide clear, well-reasoned analysis based on the provided context.
Focus on actionable insights and always cite your sources from the context.
Do not make price predictions. Instead, highlight key factors that could influence investment decisions.";

const FUNDAMENTAL_PREAMBLE: &str = "\
You are a fundamental analyst examining JSE-listed companies.
Focus on financial metrics, valuation ratios, earnings quality, and competitive positioning.
Analyze the provided data to assess the company's financial health and intrinsic value drivers.
Do not make price predictions. Highlight strengths, weaknesses, and key metrics to monitor.";

const TECHNICAL_PREAMBLE: &str = "\
You are a technical analyst reviewing JSE equity charts and patterns.
Analyze price action, volume, support/resistance levels, and relevant indicators.
Identify key levels and patterns. Do not make price predictions.
Focus on risk management and probability-based scenarios.";

const SENTIMENT_PREAMBLE: &str = "\
You are a market sentiment analyst covering JSE equities.
Analyze news, SENS announcements, and market commentary to gauge investor sentiment.
Identify key themes, concerns, and catalysts driving market perception.
Do not make price predictions. Provide a balanced view of bullish and bearish arguments.";

const NEWS_PREAMBLE: &str = "\
You are a financial news analyst covering JSE-listed companies.
Summarize key developments, corporate actions, and material announcements.
Assess potential impact on the company and its stakeholders.
Do not make price predictions. Highlight what investors should monitor going forward.";

/// Render fragments into the context block that is actually sent. The
/// citation extractor runs over exactly this string.
pub fn render_context(fragments: &[ContextFragment]) -> String {
    fragments
        .iter()
        .map(|f| format!("[Source: {}]\n{}", f.label, f.text))
        .collect::<Vec<_>>()
        .join(CONTEXT_DELIMITER)
}

/// Assemble the final prompt: persona, context block, question, in that order.
/// With no fragments the general-knowledge template is used instead; it
/// carries no citation instruction because there is nothing to cite.
pub fn build_prompt(fragments: &[ContextFragment], question: &str, mode: AnalysisMode) -> String {
    if fragments.is_empty() {
        return format!(
            "{preamble}\nThe user hasn't uploaded specific documents for this query.\n\
             Provide helpful analysis based on general financial principles.\n\n\
             USER QUESTION:\n{question}\n\n\
             Note: For more specific analysis, suggest the user upload relevant documents or specify a ticker.",
            preamble = GENERAL_PREAMBLE,
            question = question,
        );
    }

    format!(
        "{preamble}\n\nAVAILABLE CONTEXT:\n{context}\n\nUSER QUESTION:\n{question}\n\n\
         Provide a thorough but concise analysis. Cite sources using [Source: name] notation.\n\
         If the context doesn't contain relevant information, say so and provide general guidance.",
        preamble = mode.preamble(),
        context = render_context(fragments),
        question = question,
    )
}

/// Prompt for the per-announcement analysis action on the SENS monitor.
pub fn announcement_analysis_prompt(a: &Announcement) -> String {
    format!(
        "Analyze this JSE SENS announcement and provide insights for investors:\n\n\
         COMPANY: {company} ({ticker})\n\
         CATEGORY: {category}\n\
         HEADLINE: {headline}\n\
         SUMMARY: {summary}\n\n\
         Provide:\n\
         1. Key takeaways from this announcement\n\
         2. Potential impact on the company and shareholders\n\
         3. What investors should monitor going forward\n\
         4. Any red flags or positive signals\n\n\
         Do not make price predictions. Focus on analytical insights.",
        company = a.company,
        ticker = a.ticker,
        category = a.category,
        headline = a.headline,
        summary = a.summary,
    )
}

/// Prompt for the daily digest over the most recent announcements.
pub fn daily_digest_prompt(announcements: &[Announcement]) -> String {
    let lines = most_recent(announcements, DIGEST_ANNOUNCEMENT_LIMIT)
        .iter()
        .map(|a| format!("- {}: {} ({})", a.ticker, a.headline, a.category))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Summarize today's key JSE SENS announcements for an investor:\n\n\
         ANNOUNCEMENTS:\n{lines}\n\n\
         Provide:\n\
         1. Key themes and trends\n\
         2. Notable corporate actions\n\
         3. Sectors showing activity\n\
         4. What investors should watch\n\n\
         Keep it concise and actionable. Do not make price predictions.",
    )
}

/// Prompt for document summarization at ingestion time.
pub fn summarize_prompt(document_text: &str, max_words: usize) -> String {
    let capped: String = document_text.chars().take(SUMMARIZE_INPUT_LIMIT).collect();
    format!(
        "Summarize the following financial document in {max_words} words or less.\n\
         Focus on key financial data, announcements, and material information.\n\n\
         DOCUMENT:\n{capped}\n\nSUMMARY:",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sens::Sentiment;
    use chrono::Utc;

    fn fragment(label: &str, text: &str) -> ContextFragment {
        ContextFragment {
            label: label.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_empty_fragments_use_no_context_template() {
        let prompt = build_prompt(&[], "How should I think about bank equities?", AnalysisMode::General);
        assert!(!prompt.contains("[Source:"));
        assert!(prompt.contains("How should I think about bank equities?"));
        assert!(prompt.contains("upload relevant documents"));
    }

    #[test]
    fn test_rag_prompt_structure() {
        let fragments = vec![
            fragment("SBK_Annual_Report.pdf", "Dividend of 620 cents declared."),
            fragment("Watchlist", "Tickers being watched: NPN"),
        ];
        let prompt = build_prompt(&fragments, "What was the dividend?", AnalysisMode::Fundamental);

        assert!(prompt.starts_with(FUNDAMENTAL_PREAMBLE));
        assert!(prompt.contains("[Source: SBK_Annual_Report.pdf]\nDividend of 620 cents declared."));
        assert!(prompt.contains(CONTEXT_DELIMITER));
        // Fixed ordering: context block before the question.
        let ctx_pos = prompt.find("AVAILABLE CONTEXT:").unwrap();
        let q_pos = prompt.find("USER QUESTION:").unwrap();
        assert!(ctx_pos < q_pos);
    }

    #[test]
    fn test_every_preamble_forbids_price_predictions() {
        for mode in [
            AnalysisMode::General,
            AnalysisMode::Fundamental,
            AnalysisMode::Technical,
            AnalysisMode::Sentiment,
            AnalysisMode::News,
        ] {
            assert!(
                mode.preamble().contains("Do not make price predictions"),
                "{} preamble is missing the prediction constraint",
                mode.as_str()
            );
        }
    }

    #[test]
    fn test_mode_parse_round_trip() {
        for s in ["general", "fundamental", "technical", "sentiment", "news"] {
            assert_eq!(AnalysisMode::parse(s).unwrap().as_str(), s);
        }
        assert!(AnalysisMode::parse("quant").is_none());
    }

    #[test]
    fn test_digest_prompt_lists_announcements() {
        let a = Announcement {
            date: Utc::now(),
            ticker: "MTN".to_string(),
            company: "MTN Group Limited".to_string(),
            category: "Acquisition".to_string(),
            headline: "Acquisition of Fintech Startup".to_string(),
            summary: String::new(),
            sentiment: Sentiment::Positive,
        };
        let prompt = daily_digest_prompt(&[a]);
        assert!(prompt.contains("- MTN: Acquisition of Fintech Startup (Acquisition)"));
        assert!(prompt.contains("Do not make price predictions"));
    }

    #[test]
    fn test_summarize_prompt_caps_input() {
        let text = "x".repeat(20_000);
        let prompt = summarize_prompt(&text, 500);
        assert!(prompt.chars().count() < 11_000);
        assert!(prompt.contains("500 words or less"));
    }
}
