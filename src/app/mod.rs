use crate::confirm::{ConfirmationFlow, PendingDelete};
use crate::error::WatchlistError;
use crate::models::{DraftEntry, Suggestion, WatchlistEntry};
use crate::store::WatchlistStore;
use crate::suggest::{SuggestionPipeline, SuggestionSettings};
use crate::tmdb::TitleLookup;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{broadcast, watch};
use tracing::{info, instrument, warn};

/// Non-fatal messages for the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Added { title: String },
    EnrichmentSkipped { title: String, reason: String },
    Removed { title: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Added { title } => write!(f, "{} added to the watchlist.", title),
            Notice::EnrichmentSkipped { title, reason } => {
                write!(f, "Saved {} without poster or cast details ({})", title, reason)
            }
            Notice::Removed { title } => write!(f, "{} removed from the watchlist.", title),
        }
    }
}

/// Entry point for the presentation layer.
pub struct WatchlistApp {
    store: Arc<WatchlistStore>,
    lookup: Arc<dyn TitleLookup>,
    suggestions: SuggestionPipeline,
    confirmation: Mutex<ConfirmationFlow>,
    notices: broadcast::Sender<Notice>,
}

impl WatchlistApp {
    pub fn new(
        store: Arc<WatchlistStore>,
        lookup: Arc<dyn TitleLookup>,
        settings: SuggestionSettings,
    ) -> Self {
        let (notices, _) = broadcast::channel(64);
        Self {
            store,
            suggestions: SuggestionPipeline::new(Arc::clone(&lookup), settings),
            lookup,
            confirmation: Mutex::new(ConfirmationFlow::new()),
            notices,
        }
    }

    pub fn store(&self) -> &WatchlistStore {
        &self.store
    }

    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    pub fn suggestions(&self) -> watch::Receiver<Vec<Suggestion>> {
        self.suggestions.subscribe()
    }

    pub fn current_suggestions(&self) -> Vec<Suggestion> {
        self.suggestions.current()
    }

    pub fn on_title_input(&self, text: &str) {
        self.suggestions.on_title_input(text);
    }

    /// Validate, enrich on a best-effort basis, then commit.
    ///
    /// Only a validation failure prevents the commit. The draft is consumed
    /// either way, so the form starts over empty.
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn on_submit(&self, draft: DraftEntry) -> Result<WatchlistEntry, WatchlistError> {
        let valid = self.store.validate(&draft).map_err(|e| {
            warn!("Rejected draft: {}", e);
            e
        })?;

        let enrichment = match self.lookup.fetch_details(valid.title()).await {
            Ok(enrichment) => Some(enrichment),
            Err(e) => {
                warn!("Enrichment skipped for '{}': {}", valid.title(), e);
                self.notify(Notice::EnrichmentSkipped {
                    title: valid.title().to_string(),
                    reason: e.to_string(),
                });
                None
            }
        };

        let entry = self.store.commit_entry(valid, enrichment);
        self.notify(Notice::Added {
            title: entry.title.clone(),
        });
        Ok(entry)
    }

    pub fn on_delete_requested(&self, index: usize) -> Result<PendingDelete, WatchlistError> {
        self.confirmation().request_delete(&self.store, index)
    }

    pub fn on_confirm(&self) -> Result<WatchlistEntry, WatchlistError> {
        let removed = self.confirmation().confirm(&self.store)?;
        self.notify(Notice::Removed {
            title: removed.title.clone(),
        });
        Ok(removed)
    }

    pub fn on_cancel(&self) {
        self.confirmation().cancel();
    }

    pub fn pending_delete(&self) -> Option<PendingDelete> {
        self.confirmation().pending().cloned()
    }

    /// Where the pending entry sits now; `None` once it has left the list.
    pub fn pending_delete_position(&self) -> Option<usize> {
        self.confirmation().pending_position(&self.store)
    }

    /// Cancel pending suggestion work, e.g. when the form is closed.
    pub fn teardown(&self) {
        self.suggestions.teardown();
    }

    fn confirmation(&self) -> MutexGuard<'_, ConfirmationFlow> {
        self.confirmation
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn notify(&self, notice: Notice) {
        info!("{}", notice);
        // No subscribers is fine.
        let _ = self.notices.send(notice);
    }
}
