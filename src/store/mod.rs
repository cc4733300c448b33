use crate::error::{ValidationError, WatchlistError};
use crate::models::{DraftEntry, DraftField, Enrichment, EntryId, Genre, Platform, WatchlistEntry};
use chrono::Utc;
use std::collections::BTreeSet;
use tokio::sync::watch;
use tracing::{error, info};

/// A draft whose required fields have all been checked.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidDraft {
    title: String,
    platform: Platform,
    genre: Genre,
    link: String,
}

impl ValidDraft {
    pub fn title(&self) -> &str {
        &self.title
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

pub fn validate(draft: &DraftEntry) -> Result<ValidDraft, ValidationError> {
    let mut missing = BTreeSet::new();
    if is_blank(&draft.title) {
        missing.insert(DraftField::Title);
    }
    if draft.platform.is_none() {
        missing.insert(DraftField::Platform);
    }
    if draft.genre.is_none() {
        missing.insert(DraftField::Genre);
    }
    if is_blank(&draft.link) {
        missing.insert(DraftField::Link);
    }

    match (draft.platform, draft.genre) {
        (Some(platform), Some(genre)) if missing.is_empty() => Ok(ValidDraft {
            title: draft.title.trim().to_string(),
            platform,
            genre,
            link: draft.link.trim().to_string(),
        }),
        _ => Err(ValidationError { missing }),
    }
}

/// The ordered, in-memory watchlist.
///
/// Every mutation publishes a full snapshot to subscribers. Duplicate titles
/// are allowed.
pub struct WatchlistStore {
    entries: watch::Sender<Vec<WatchlistEntry>>,
}

impl WatchlistStore {
    pub fn new() -> Self {
        let (entries, _) = watch::channel(Vec::new());
        Self { entries }
    }

    pub fn validate(&self, draft: &DraftEntry) -> Result<ValidDraft, ValidationError> {
        validate(draft)
    }

    /// Append a validated draft. Absent enrichment leaves the optional fields empty.
    pub fn commit_entry(&self, draft: ValidDraft, enrichment: Option<Enrichment>) -> WatchlistEntry {
        let enrichment = enrichment.unwrap_or_default();
        let entry = WatchlistEntry {
            id: EntryId::new(),
            title: draft.title,
            platform: draft.platform,
            genre: draft.genre,
            link: draft.link,
            poster_path: enrichment.poster_path,
            rating: enrichment.rating,
            cast: enrichment.cast,
            added_at: Utc::now(),
        };

        self.entries.send_modify(|entries| entries.push(entry.clone()));
        info!("{} added to the watchlist", entry.title);
        entry
    }

    pub fn remove_entry(&self, index: usize) -> Result<WatchlistEntry, WatchlistError> {
        let mut removed = None;
        let mut len = 0;
        self.entries.send_if_modified(|entries| {
            len = entries.len();
            if index < len {
                removed = Some(entries.remove(index));
                true
            } else {
                false
            }
        });

        match removed {
            Some(entry) => {
                info!("Removed '{}' from position {}", entry.title, index);
                Ok(entry)
            }
            None => {
                error!("Delete index {} out of range ({} entries)", index, len);
                Err(WatchlistError::IndexOutOfRange { index, len })
            }
        }
    }

    pub fn remove_by_id(&self, id: EntryId) -> Result<WatchlistEntry, WatchlistError> {
        let mut removed = None;
        self.entries.send_if_modified(|entries| {
            match entries.iter().position(|e| e.id == id) {
                Some(index) => {
                    removed = Some(entries.remove(index));
                    true
                }
                None => false,
            }
        });

        match removed {
            Some(entry) => {
                info!("Removed '{}' ({})", entry.title, id);
                Ok(entry)
            }
            None => {
                error!("Entry {} not found for removal", id);
                Err(WatchlistError::UnknownEntry(id))
            }
        }
    }

    pub fn get(&self, index: usize) -> Option<WatchlistEntry> {
        self.entries.borrow().get(index).cloned()
    }

    pub fn position_of(&self, id: EntryId) -> Option<usize> {
        self.entries.borrow().iter().position(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Vec<WatchlistEntry> {
        self.entries.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<WatchlistEntry>> {
        self.entries.subscribe()
    }
}

impl Default for WatchlistStore {
    fn default() -> Self {
        Self::new()
    }
}
