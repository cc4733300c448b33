use crate::debounce::Debouncer;
use crate::error::LookupError;
use crate::models::Suggestion;
use crate::sequencer::{Acceptance, QueryToken, RequestSequencer};
use crate::tmdb::TitleLookup;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

const TITLE_KEY: &str = "title";

#[derive(Debug, Clone)]
pub struct SuggestionSettings {
    pub debounce: Duration,
    pub max_results: usize,
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            max_results: 10,
        }
    }
}

/// Keystrokes in, latest suggestion list out.
pub struct SuggestionPipeline {
    lookup: Arc<dyn TitleLookup>,
    sequencer: Arc<RequestSequencer<Vec<Suggestion>>>,
    debouncer: Debouncer<&'static str>,
    settings: SuggestionSettings,
}

impl SuggestionPipeline {
    pub fn new(lookup: Arc<dyn TitleLookup>, settings: SuggestionSettings) -> Self {
        Self {
            lookup,
            sequencer: Arc::new(RequestSequencer::new()),
            debouncer: Debouncer::new(),
            settings,
        }
    }

    /// Feed the current contents of the title field.
    ///
    /// A blank value clears the suggestions at once and drops any pending or
    /// in-flight query.
    pub fn on_title_input(&self, text: &str) {
        if text.trim().is_empty() {
            self.debouncer.cancel(&TITLE_KEY);
            self.sequencer.reset();
            return;
        }

        // Minted before the timer starts so a later blank input always
        // invalidates this query, however far it has got.
        let token = self.sequencer.issue();
        let query = text.to_string();
        let lookup = Arc::clone(&self.lookup);
        let sequencer = Arc::clone(&self.sequencer);
        let max_results = self.settings.max_results;

        self.debouncer.schedule(TITLE_KEY, self.settings.debounce, move || async move {
            run_query(lookup, sequencer, token, query, max_results).await;
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Suggestion>> {
        self.sequencer.subscribe()
    }

    pub fn current(&self) -> Vec<Suggestion> {
        self.sequencer.current()
    }

    /// Stop any pending query and clear the list, e.g. when the form closes.
    pub fn teardown(&self) {
        self.debouncer.cancel_all();
        self.sequencer.reset();
    }
}

async fn run_query(
    lookup: Arc<dyn TitleLookup>,
    sequencer: Arc<RequestSequencer<Vec<Suggestion>>>,
    token: QueryToken,
    query: String,
    max_results: usize,
) {
    debug!("Issuing suggestion query '{}' (token {})", query, token.value());

    let suggestions = match lookup.search(&query).await {
        Ok(mut titles) => {
            titles.truncate(max_results);
            titles
        }
        Err(LookupError::EmptyQuery) => Vec::new(),
        Err(e) => {
            // Typing must never be blocked by the remote service.
            warn!("Suggestion lookup for '{}' failed: {}", query, e);
            Vec::new()
        }
    };

    if sequencer.accept(token, suggestions) == Acceptance::Applied {
        info!("Suggestions updated for '{}'", query);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;
    use crate::models::Enrichment;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::time::sleep;

    /// Answers from a table, each after its own delay; records every query.
    struct ScriptedLookup {
        answers: HashMap<String, (Duration, Option<Vec<String>>)>,
        queries: Mutex<Vec<String>>,
    }

    impl ScriptedLookup {
        fn new(answers: &[(&str, u64, Option<Vec<&str>>)]) -> Arc<Self> {
            Arc::new(Self {
                answers: answers
                    .iter()
                    .map(|(q, ms, titles)| {
                        let titles = titles
                            .as_ref()
                            .map(|t| t.iter().map(|s| s.to_string()).collect::<Vec<String>>());
                        (q.to_string(), (Duration::from_millis(*ms), titles))
                    })
                    .collect(),
                queries: Mutex::new(Vec::new()),
            })
        }

        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl TitleLookup for ScriptedLookup {
        async fn search(&self, query: &str) -> Result<Vec<Suggestion>, LookupError> {
            self.queries.lock().unwrap().push(query.to_string());
            let (delay, titles) = self
                .answers
                .get(query)
                .cloned()
                .unwrap_or((Duration::ZERO, Some(Vec::new())));
            sleep(delay).await;
            titles.ok_or(LookupError::Remote(RemoteError::Status(503)))
        }

        async fn fetch_details(&self, title: &str) -> Result<Enrichment, LookupError> {
            Err(LookupError::NotFound(title.to_string()))
        }
    }

    fn pipeline(lookup: Arc<ScriptedLookup>) -> SuggestionPipeline {
        SuggestionPipeline::new(
            lookup,
            SuggestionSettings {
                debounce: Duration::from_millis(300),
                max_results: 2,
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_burst_issues_one_query_with_last_value() {
        let lookup = ScriptedLookup::new(&[("Incep", 10, Some(vec!["Inception"]))]);
        let pipeline = pipeline(Arc::clone(&lookup));

        for text in ["I", "In", "Inc", "Ince", "Incep"] {
            pipeline.on_title_input(text);
            sleep(Duration::from_millis(100)).await;
        }
        sleep(Duration::from_secs(1)).await;

        assert_eq!(lookup.queries(), vec!["Incep".to_string()]);
        assert_eq!(pipeline.current(), vec!["Inception".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_earlier_response_is_discarded() {
        // "He" answers after 2s, "Heat" after 50ms.
        let lookup = ScriptedLookup::new(&[
            ("He", 2_000, Some(vec!["Hereditary"])),
            ("Heat", 50, Some(vec!["Heat"])),
        ]);
        let pipeline = pipeline(Arc::clone(&lookup));

        pipeline.on_title_input("He");
        sleep(Duration::from_millis(400)).await;
        pipeline.on_title_input("Heat");
        sleep(Duration::from_secs(3)).await;

        assert_eq!(lookup.queries(), vec!["He".to_string(), "Heat".to_string()]);
        assert_eq!(pipeline.current(), vec!["Heat".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_error_degrades_to_empty_list() {
        let lookup = ScriptedLookup::new(&[("Up", 10, Some(vec!["Up"])), ("Upg", 10, None)]);
        let pipeline = pipeline(lookup);

        pipeline.on_title_input("Up");
        sleep(Duration::from_secs(1)).await;
        assert_eq!(pipeline.current(), vec!["Up".to_string()]);

        pipeline.on_title_input("Upg");
        sleep(Duration::from_secs(1)).await;
        assert!(pipeline.current().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_input_clears_immediately_and_drops_in_flight() {
        let lookup = ScriptedLookup::new(&[
            ("Alien", 10, Some(vec!["Alien"])),
            ("Aliens", 1_000, Some(vec!["Aliens"])),
        ]);
        let pipeline = pipeline(Arc::clone(&lookup));

        pipeline.on_title_input("Alien");
        sleep(Duration::from_secs(1)).await;
        assert_eq!(pipeline.current(), vec!["Alien".to_string()]);

        pipeline.on_title_input("Aliens");
        sleep(Duration::from_millis(400)).await;
        pipeline.on_title_input("  ");
        assert!(pipeline.current().is_empty());

        sleep(Duration::from_secs(2)).await;
        assert!(pipeline.current().is_empty());
    }

    #[tokio::test]
    async fn test_released_query_cannot_outlive_blank_input() {
        // The timer has handed the query over but the search has not started.
        let lookup = ScriptedLookup::new(&[("Jaws", 0, Some(vec!["Jaws"]))]);
        let sequencer: Arc<RequestSequencer<Vec<Suggestion>>> = Arc::new(RequestSequencer::new());
        let token = sequencer.issue();
        sequencer.reset();

        run_query(lookup.clone(), Arc::clone(&sequencer), token, "Jaws".to_string(), 10).await;

        assert_eq!(lookup.queries(), vec!["Jaws".to_string()]);
        assert!(sequencer.current().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_input_during_quiet_period_issues_nothing() {
        let lookup = ScriptedLookup::new(&[("Jaws", 0, Some(vec!["Jaws"]))]);
        let pipeline = pipeline(Arc::clone(&lookup));

        pipeline.on_title_input("Jaws");
        sleep(Duration::from_millis(100)).await;
        pipeline.on_title_input("");
        sleep(Duration::from_secs(1)).await;

        assert!(lookup.queries().is_empty());
        assert!(pipeline.current().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_are_capped() {
        let lookup = ScriptedLookup::new(&[("Star", 10, Some(vec!["Star Wars", "Stardust", "Starman"]))]);
        let pipeline = pipeline(lookup);

        pipeline.on_title_input("Star");
        sleep(Duration::from_secs(1)).await;

        assert_eq!(pipeline.current(), vec!["Star Wars".to_string(), "Stardust".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_cancels_pending_query() {
        let lookup = ScriptedLookup::new(&[]);
        let pipeline = pipeline(Arc::clone(&lookup));

        pipeline.on_title_input("Jaws");
        pipeline.teardown();
        sleep(Duration::from_secs(1)).await;

        assert!(lookup.queries().is_empty());
    }
}
