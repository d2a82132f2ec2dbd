mod analyst;
mod docs;
mod error;
mod format;
mod llm;
mod sens;
mod state;

use std::io::Write;
use std::path::Path;

use chrono::Utc;
use tracing::{error, info, Level};

use analyst::prompts::AnalysisMode;
use analyst::Analyst;
use docs::ingest::ingest_bytes;
use docs::types::{DocKind, Document};
use error::Error;
use format::format_relative_time;
use llm::{response_words, LlmClient, AVAILABLE_MODELS};
use sens::{
    filter_announcements, sentiment_stats, Announcement, Sentiment, TimeWindow, SENS_CATEGORIES,
};
use state::SessionState;

/// Cosmetic delay between printed words of an answer.
const WORD_PACE_MS: u64 = 20;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let _ = dotenv::dotenv();

    let llm = LlmClient::from_env()?;
    let analyst = Analyst::new(llm);
    let mut session = Session::new(analyst);
    if let Ok(model) = dotenv::var("LLM_MODEL") {
        if !model.is_empty() {
            info!(model = %model, "default model overridden from environment");
            session.state.settings.model = model;
        }
    }

    info!("session started");
    println!("JSE analyst session. Type /help for commands, plain text to ask a question.");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" {
            break;
        }

        session.dispatch(line).await;
    }

    info!("session ended");
    Ok(())
}

/// One interactive session: the explicit app-state struct plus the engine,
/// mutated only by these sequential handlers.
struct Session {
    analyst: Analyst,
    state: SessionState,
    mode: AnalysisMode,
    focus: Option<String>,
}

impl Session {
    fn new(analyst: Analyst) -> Self {
        Self {
            analyst,
            state: SessionState::new(),
            mode: AnalysisMode::General,
            focus: None,
        }
    }

    async fn dispatch(&mut self, line: &str) {
        let result = if let Some(rest) = line.strip_prefix('/') {
            let (cmd, args) = rest.split_once(' ').unwrap_or((rest, ""));
            self.run_command(cmd, args.trim()).await
        } else {
            self.ask(line).await;
            Ok(())
        };

        if let Err(e) = result {
            // Every failure path is an inline message; prior state is intact.
            println!("{}", e);
        }
    }

    async fn run_command(&mut self, cmd: &str, args: &str) -> Result<(), Error> {
        match cmd {
            "help" => print_help(),
            "focus" => self.set_focus(args)?,
            "mode" => self.set_mode(args)?,
            "model" => self.set_model(args)?,
            "temp" => self.set_temperature(args)?,
            "tokens" => self.set_max_tokens(args)?,
            "ingest" => self.ingest(args).await?,
            "summarize" => self.summarize(args).await?,
            "sources" => self.list_sources(),
            "company" => self.add_company(args)?,
            "watch" => {
                if self.state.watch(args)? {
                    println!("Watching {}", args.trim().to_uppercase());
                } else {
                    println!("Already watching {}", args.trim().to_uppercase());
                }
            }
            "unwatch" => {
                println!(
                    "{}",
                    if self.state.unwatch(args) { "Removed." } else { "Not on the watchlist." }
                );
            }
            "track" => {
                self.state.track(args)?;
                println!("Tracking {} for SENS alerts", args.trim().to_uppercase());
            }
            "untrack" => {
                println!(
                    "{}",
                    if self.state.untrack(args) { "Removed." } else { "Not tracked." }
                );
            }
            "sens" => self.add_announcement(args)?,
            "feed" => self.show_feed(args)?,
            "analyze" => self.analyze(args).await?,
            "digest" => {
                let digest = self.analyst.daily_digest(&self.state).await;
                print_paced(&digest).await;
            }
            "export" => self.export(args)?,
            "import" => self.import(args)?,
            "clear" => self.clear(args)?,
            other => println!("Unknown command /{}. Try /help.", other),
        }
        Ok(())
    }

    async fn ask(&mut self, question: &str) {
        let outcome = self
            .analyst
            .ask(&mut self.state, question, self.focus.as_deref(), self.mode)
            .await;

        print_paced(&outcome.answer).await;
        if !outcome.sources.is_empty() {
            println!("\nSources:");
            for source in &outcome.sources {
                println!("  • {}", source);
            }
        } else if !outcome.used_context {
            println!("\n(no matching documents; upload some with /ingest or set /focus)");
        }
    }

    fn set_focus(&mut self, args: &str) -> Result<(), Error> {
        if args.is_empty() || args == "off" {
            self.focus = None;
            println!("Focus cleared.");
        } else {
            let ticker = state::validate_ticker(args)?;
            println!("Focusing on {}", ticker);
            self.focus = Some(ticker);
        }
        Ok(())
    }

    fn set_mode(&mut self, args: &str) -> Result<(), Error> {
        match AnalysisMode::parse(args) {
            Some(mode) => {
                self.mode = mode;
                println!("Analysis mode: {}", mode.as_str());
                Ok(())
            }
            None => Err(Error::InputValidation(format!(
                "unknown mode '{}'; valid: general, fundamental, technical, sentiment, news",
                args
            ))),
        }
    }

    fn set_model(&mut self, args: &str) -> Result<(), Error> {
        if !AVAILABLE_MODELS.contains(&args) {
            return Err(Error::InputValidation(format!(
                "unknown model '{}'; valid: {}",
                args,
                AVAILABLE_MODELS.join(", ")
            )));
        }
        self.state.settings.model = args.to_string();
        println!("Model: {}", args);
        Ok(())
    }

    fn set_temperature(&mut self, args: &str) -> Result<(), Error> {
        let temp: f32 = args
            .parse()
            .map_err(|_| Error::InputValidation(format!("'{}' is not a number", args)))?;
        if !(0.0..=1.0).contains(&temp) {
            return Err(Error::InputValidation("temperature must be in 0.0-1.0".into()));
        }
        self.state.settings.temperature = temp;
        println!("Temperature: {}", temp);
        Ok(())
    }

    fn set_max_tokens(&mut self, args: &str) -> Result<(), Error> {
        let tokens: u32 = args
            .parse()
            .map_err(|_| Error::InputValidation(format!("'{}' is not a number", args)))?;
        if !(256..=4096).contains(&tokens) {
            return Err(Error::InputValidation("max tokens must be in 256-4096".into()));
        }
        self.state.settings.max_tokens = tokens;
        println!("Max tokens: {}", tokens);
        Ok(())
    }

    /// `/ingest <path> [ticker]`: upload a file into the session collection.
    async fn ingest(&mut self, args: &str) -> Result<(), Error> {
        let (path, ticker) = match args.split_once(' ') {
            Some((p, t)) => (p, Some(state::validate_ticker(t)?)),
            None if !args.is_empty() => (args, None),
            None => {
                return Err(Error::InputValidation(
                    "usage: /ingest <path> [ticker]".into(),
                ))
            }
        };

        let path = Path::new(path);
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let kind = DocKind::from_extension(ext).ok_or_else(|| {
            Error::InputValidation(format!(
                "unsupported file type '.{}'; supported: pdf, csv, xlsx, txt",
                ext
            ))
        })?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        let bytes = std::fs::read(path)?;
        let doc = ingest_bytes(&name, kind, ticker.as_deref(), &bytes)?;
        if self.state.documents.add(doc) {
            println!("Added {} to the knowledge base", name);
        } else {
            println!("{} is already in the knowledge base", name);
        }
        Ok(())
    }

    /// `/summarize <name>`: LLM summary of an ingested document. The summary
    /// is stored as a companion document so retrieval can serve it later.
    async fn summarize(&mut self, args: &str) -> Result<(), Error> {
        let doc = self
            .state
            .documents
            .find_by_name(args)
            .ok_or_else(|| Error::InputValidation(format!("no document named '{}'", args)))?;
        let Some(content) = doc.body.content() else {
            return Err(Error::InputValidation(format!(
                "'{}' carries only a summary already",
                args
            )));
        };
        let content = content.to_string();
        let (name, kind, entity) = (doc.name.clone(), doc.kind, doc.entity.clone());

        let summary = self.analyst.summarize(&self.state, &content).await;
        print_paced(&summary).await;

        if !summary.starts_with("Error") {
            self.state.documents.add(Document::summary_only(
                &name,
                kind,
                entity.as_deref(),
                summary,
            ));
        }
        Ok(())
    }

    fn list_sources(&self) {
        if self.state.documents.is_empty() {
            println!("No documents ingested yet. Use /ingest to add some.");
            return;
        }
        println!("Ingested documents:");
        for doc in self.state.documents.iter() {
            println!(
                "  - {} ({}) {} `{}`",
                doc.name,
                doc.kind.as_str(),
                doc.entity.as_deref().map(|e| format!("[{}]", e)).unwrap_or_default(),
                &doc.id[..12],
            );
        }
    }

    /// `/company TICKER;Name;Sector[;Description]` or `/company remove TICKER`
    fn add_company(&mut self, args: &str) -> Result<(), Error> {
        if let Some(ticker) = args.strip_prefix("remove ") {
            if self.state.remove_company(ticker.trim()) {
                println!("Removed {}", ticker.trim().to_uppercase());
            } else {
                println!("No company with ticker {}", ticker.trim().to_uppercase());
            }
            return Ok(());
        }

        let parts: Vec<&str> = args.split(';').map(str::trim).collect();
        if parts.len() < 3 {
            return Err(Error::InputValidation(
                "usage: /company TICKER;Name;Sector[;Description]".into(),
            ));
        }
        let description = parts.get(3).copied().unwrap_or("");
        self.state
            .add_company(parts[0], parts[1], parts[2], description)?;
        println!("Added {} ({})", parts[1], parts[0].trim().to_uppercase());
        Ok(())
    }

    /// `/sens TICKER;Company;Category;Headline;Summary[;sentiment]`
    fn add_announcement(&mut self, args: &str) -> Result<(), Error> {
        let parts: Vec<&str> = args.split(';').map(str::trim).collect();
        if parts.len() < 5 {
            return Err(Error::InputValidation(
                "usage: /sens TICKER;Company;Category;Headline;Summary[;sentiment]".into(),
            ));
        }
        let ticker = state::validate_ticker(parts[0])?;
        if !SENS_CATEGORIES.contains(&parts[2]) {
            return Err(Error::InputValidation(format!(
                "unknown category '{}'; valid: {}",
                parts[2],
                SENS_CATEGORIES.join(", ")
            )));
        }
        let sentiment = match parts.get(5).copied() {
            Some("positive") => Sentiment::Positive,
            Some("negative") => Sentiment::Negative,
            None | Some("neutral") => Sentiment::Neutral,
            Some(other) => {
                return Err(Error::InputValidation(format!(
                    "unknown sentiment '{}'",
                    other
                )))
            }
        };

        self.state.announcements.push(Announcement {
            date: Utc::now(),
            ticker,
            company: parts[1].to_string(),
            category: parts[2].to_string(),
            headline: parts[3].to_string(),
            summary: parts[4].to_string(),
            sentiment,
        });
        println!("Announcement added to the feed.");
        Ok(())
    }

    /// `/feed [today|week|month] [ticker]`
    fn show_feed(&self, args: &str) -> Result<(), Error> {
        if self.state.announcements.is_empty() {
            println!("The SENS feed is empty. Add announcements with /sens.");
            return Ok(());
        }

        let mut window = TimeWindow::AllTime;
        let mut ticker = None;
        for word in args.split_whitespace() {
            match word {
                "today" => window = TimeWindow::Today,
                "week" => window = TimeWindow::ThisWeek,
                "month" => window = TimeWindow::ThisMonth,
                other => ticker = Some(state::validate_ticker(other)?),
            }
        }

        let filtered =
            filter_announcements(&self.state.announcements, ticker.as_deref(), None, window);
        if filtered.is_empty() {
            println!("No announcements match that filter.");
            return Ok(());
        }

        let (pos, neg, neu) = sentiment_stats(&self.state.announcements);
        println!(
            "{} of {} announcements ({} positive, {} negative, {} neutral overall):",
            filtered.len(),
            self.state.announcements.len(),
            pos,
            neg,
            neu
        );
        let mut shown: Vec<&Announcement> = filtered;
        shown.sort_by(|a, b| b.date.cmp(&a.date));
        for (i, a) in shown.iter().take(20).enumerate() {
            println!(
                "  [{}] {}: {} ({}, {})",
                i,
                a.ticker,
                a.headline,
                a.category,
                format_relative_time(a.date)
            );
        }
        Ok(())
    }

    /// `/analyze <index>`: analyze an announcement from the /feed listing.
    async fn analyze(&mut self, args: &str) -> Result<(), Error> {
        let idx: usize = args
            .parse()
            .map_err(|_| Error::InputValidation("usage: /analyze <feed index>".into()))?;
        let recent = sens::most_recent(&self.state.announcements, 20);
        let announcement = recent
            .get(idx)
            .copied()
            .ok_or_else(|| Error::InputValidation(format!("no announcement at index {}", idx)))?
            .clone();

        let analysis = self
            .analyst
            .analyze_announcement(&self.state, &announcement)
            .await;
        print_paced(&analysis).await;
        Ok(())
    }

    fn export(&self, args: &str) -> Result<(), Error> {
        let path = if args.is_empty() { "jse_analyst_export.json" } else { args };
        let data = serde_json::to_string_pretty(&self.state.export())?;
        std::fs::write(path, data)?;
        println!("Exported to {}", path);
        Ok(())
    }

    fn import(&mut self, args: &str) -> Result<(), Error> {
        if args.is_empty() {
            return Err(Error::InputValidation("usage: /import <path>".into()));
        }
        let raw = std::fs::read_to_string(args)?;
        let data: serde_json::Value = serde_json::from_str(&raw)?;
        self.state.import(&data)?;
        println!("Configuration imported.");
        Ok(())
    }

    fn clear(&mut self, args: &str) -> Result<(), Error> {
        match args {
            "chat" => {
                self.state.clear_chat();
                println!("Chat history cleared.");
            }
            "docs" => {
                self.state.clear_documents();
                println!("Documents cleared.");
            }
            _ => {
                return Err(Error::InputValidation(
                    "usage: /clear chat | /clear docs".into(),
                ))
            }
        }
        Ok(())
    }
}

/// Print an already-computed answer word by word. Pacing only; the answer is
/// complete before the first word appears.
async fn print_paced(text: &str) {
    for word in response_words(text) {
        print!("{} ", word);
        if std::io::stdout().flush().is_err() {
            error!("stdout closed mid-answer");
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(WORD_PACE_MS)).await;
    }
    println!();
}

fn print_help() {
    println!(
        "\
Ask a question by typing it. Commands:
  /focus <ticker>|off        narrow retrieval to one ticker
  /mode <general|fundamental|technical|sentiment|news>
  /model <name>  /temp <0-1>  /tokens <256-4096>
  /ingest <path> [ticker]    upload a pdf/csv/xlsx/txt document
  /summarize <name>          summarize an ingested document
  /sources                   list ingested documents
  /company T;Name;Sector[;Desc]  /company remove T
  /watch <t> /unwatch <t> /track <t> /untrack <t>
  /sens T;Company;Category;Headline;Summary[;sentiment]
  /feed [today|week|month] [ticker]  /analyze <i>  /digest
  /export [path]  /import <path>
  /clear chat|docs  /quit"
    );
}
