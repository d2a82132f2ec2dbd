pub mod citations;
pub mod context;
pub mod prompts;

use chrono::Utc;
use tracing::info;

use crate::llm::LlmClient;
use crate::sens::Announcement;
use crate::state::{Message, Role, SessionState};

use citations::{extract_citations, filter_cited};
use context::select_context;
use prompts::{build_prompt, render_context, AnalysisMode};

const SUMMARY_MAX_WORDS: usize = 500;

/// Result of one ask cycle, mirrored into the conversation log.
pub struct AskOutcome {
    pub answer: String,
    pub sources: Vec<String>,
    pub model: String,
    pub used_context: bool,
}

/// The retrieval-and-prompt-assembly engine behind the chat surface.
pub struct Analyst {
    llm: LlmClient,
}

impl Analyst {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    /// One full request cycle: select context, assemble the prompt, complete,
    /// extract citations, and append both turns to the conversation log.
    ///
    /// The completion call never fails outward; backend errors arrive as the
    /// assistant's response text and leave prior state intact.
    pub async fn ask(
        &self,
        state: &mut SessionState,
        question: &str,
        entity_filter: Option<&str>,
        mode: AnalysisMode,
    ) -> AskOutcome {
        state.messages.push(Message {
            role: Role::User,
            content: question.to_string(),
            timestamp: Utc::now(),
            sources: Vec::new(),
            model: String::new(),
        });

        let fragments = select_context(
            question,
            entity_filter,
            state.documents.as_slice(),
            &state.companies,
            &state.watchlist,
            &state.announcements,
        );
        let context_block = render_context(&fragments);
        let prompt = build_prompt(&fragments, question, mode);

        info!(
            mode = mode.as_str(),
            entity = entity_filter.unwrap_or("-"),
            fragments = fragments.len(),
            "ask cycle started"
        );

        let answer = self.llm.complete(&prompt, &state.settings).await;

        let offered = extract_citations(&context_block);
        let sources: Vec<String> = filter_cited(offered, &answer).into_iter().collect();

        state.messages.push(Message {
            role: Role::Assistant,
            content: answer.clone(),
            timestamp: Utc::now(),
            sources: sources.clone(),
            model: state.settings.model.clone(),
        });

        info!(
            answer_len = answer.len(),
            sources = sources.len(),
            "ask cycle complete"
        );

        AskOutcome {
            answer,
            sources,
            model: state.settings.model.clone(),
            used_context: !fragments.is_empty(),
        }
    }

    /// Analyze a single SENS announcement.
    pub async fn analyze_announcement(
        &self,
        state: &SessionState,
        announcement: &Announcement,
    ) -> String {
        let prompt = prompts::announcement_analysis_prompt(announcement);
        self.llm.complete(&prompt, &state.settings).await
    }

    /// Digest of the most recent announcements in the feed.
    pub async fn daily_digest(&self, state: &SessionState) -> String {
        if state.announcements.is_empty() {
            return "No announcements in the feed yet. Add some on the SENS monitor first."
                .to_string();
        }
        let prompt = prompts::daily_digest_prompt(&state.announcements);
        self.llm.complete(&prompt, &state.settings).await
    }

    /// Summarize document text, used to attach summaries at ingestion time.
    pub async fn summarize(&self, state: &SessionState, document_text: &str) -> String {
        let prompt = prompts::summarize_prompt(document_text, SUMMARY_MAX_WORDS);
        self.llm.complete(&prompt, &state.settings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::ingest::ingest_bytes;
    use crate::docs::types::DocKind;

    fn unreachable_analyst() -> Analyst {
        // Nothing listens on the discard port; completions degrade to the
        // service-unavailable message.
        Analyst::new(LlmClient::with_base_url("http://127.0.0.1:9/v1"))
    }

    #[tokio::test]
    async fn test_ask_degrades_to_inline_error_and_logs_both_turns() {
        let analyst = unreachable_analyst();
        let mut state = SessionState::new();

        let outcome = analyst
            .ask(&mut state, "What is happening?", None, AnalysisMode::General)
            .await;

        assert!(outcome.answer.starts_with("Error"));
        assert!(!outcome.used_context);
        assert!(outcome.sources.is_empty());
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[0].role, Role::User);
        assert_eq!(state.messages[1].role, Role::Assistant);
        assert_eq!(state.messages[1].content, outcome.answer);
    }

    #[tokio::test]
    async fn test_ask_with_context_reports_offered_sources() {
        let analyst = unreachable_analyst();
        let mut state = SessionState::new();
        state.documents.add(
            ingest_bytes(
                "SBK_Annual_Report.pdf",
                DocKind::Pdf,
                Some("SBK"),
                b"SBK dividend policy remains unchanged.",
            )
            .unwrap(),
        );

        let outcome = analyst
            .ask(
                &mut state,
                "What is the dividend policy?",
                Some("SBK"),
                AnalysisMode::Fundamental,
            )
            .await;

        assert!(outcome.used_context);
        // The error answer cites nothing verbatim, so the offered set is kept.
        assert_eq!(outcome.sources, vec!["SBK_Annual_Report.pdf".to_string()]);
    }

    #[tokio::test]
    async fn test_daily_digest_without_announcements_short_circuits() {
        let analyst = unreachable_analyst();
        let state = SessionState::new();
        let digest = analyst.daily_digest(&state).await;
        assert!(digest.contains("No announcements"));
    }
}
