use crate::error::WatchlistError;
use crate::models::{EntryId, WatchlistEntry};
use crate::store::WatchlistStore;
use tracing::{debug, error, info};

/// A delete waiting for the user to confirm or cancel.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDelete {
    pub id: EntryId,
    /// Position at request time; see `ConfirmationFlow::pending_position`.
    pub index: usize,
    pub title: String,
}

impl PendingDelete {
    pub fn prompt(&self) -> String {
        format!("Are you sure you want to delete \"{}\" from the watchlist?", self.title)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ConfirmState {
    #[default]
    Idle,
    PendingConfirm(PendingDelete),
}

/// Gates removal behind an explicit confirm. At most one delete is pending;
/// a new request replaces the previous one.
#[derive(Debug, Default)]
pub struct ConfirmationFlow {
    state: ConfirmState,
}

impl ConfirmationFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ConfirmState {
        &self.state
    }

    pub fn pending(&self) -> Option<&PendingDelete> {
        match &self.state {
            ConfirmState::PendingConfirm(pending) => Some(pending),
            ConfirmState::Idle => None,
        }
    }

    /// Current position of the pending entry, following it as the list shifts.
    pub fn pending_position(&self, store: &WatchlistStore) -> Option<usize> {
        self.pending().and_then(|p| store.position_of(p.id))
    }

    pub fn is_pending(&self, store: &WatchlistStore, index: usize) -> bool {
        self.pending_position(store) == Some(index)
    }

    /// Move to `PendingConfirm` for the entry currently at `index`.
    pub fn request_delete(
        &mut self,
        store: &WatchlistStore,
        index: usize,
    ) -> Result<PendingDelete, WatchlistError> {
        let Some(entry) = store.get(index) else {
            let len = store.len();
            error!("Delete requested for index {} but the watchlist has {} entries", index, len);
            return Err(WatchlistError::IndexOutOfRange { index, len });
        };

        if let ConfirmState::PendingConfirm(previous) = &self.state {
            debug!("Delete request for '{}' replaces pending '{}'", entry.title, previous.title);
        }

        let pending = PendingDelete {
            id: entry.id,
            index,
            title: entry.title,
        };
        self.state = ConfirmState::PendingConfirm(pending.clone());
        Ok(pending)
    }

    /// Remove the pending entry and return to `Idle`.
    ///
    /// The state returns to `Idle` even when the entry has already gone.
    pub fn confirm(&mut self, store: &WatchlistStore) -> Result<WatchlistEntry, WatchlistError> {
        match std::mem::take(&mut self.state) {
            ConfirmState::PendingConfirm(pending) => {
                info!("Delete of '{}' confirmed", pending.title);
                store.remove_by_id(pending.id)
            }
            ConfirmState::Idle => {
                error!("Confirm received with no pending delete");
                Err(WatchlistError::NothingPending)
            }
        }
    }

    /// Return to `Idle`. Returns whether a delete was pending.
    pub fn cancel(&mut self) -> bool {
        match std::mem::take(&mut self.state) {
            ConfirmState::PendingConfirm(pending) => {
                debug!("Delete of '{}' cancelled", pending.title);
                true
            }
            ConfirmState::Idle => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DraftEntry, Genre, Platform};

    fn store_with(titles: &[&str]) -> WatchlistStore {
        let store = WatchlistStore::new();
        for title in titles {
            let draft = DraftEntry::new(*title, Platform::Netflix, Genre::Comedy, "netflix.com");
            let valid = store.validate(&draft).unwrap();
            store.commit_entry(valid, None);
        }
        store
    }

    #[test]
    fn test_confirm_removes_and_returns_to_idle() {
        let store = store_with(&["A", "B"]);
        let mut flow = ConfirmationFlow::new();

        let pending = flow.request_delete(&store, 1).unwrap();
        assert_eq!(
            pending.prompt(),
            "Are you sure you want to delete \"B\" from the watchlist?"
        );

        let removed = flow.confirm(&store).unwrap();
        assert_eq!(removed.title, "B");
        assert_eq!(store.len(), 1);
        assert_eq!(flow.state(), &ConfirmState::Idle);
    }

    #[test]
    fn test_cancel_keeps_entry() {
        let store = store_with(&["A"]);
        let mut flow = ConfirmationFlow::new();

        flow.request_delete(&store, 0).unwrap();
        assert!(flow.cancel());
        assert!(!flow.cancel());
        assert_eq!(store.len(), 1);
        assert_eq!(flow.confirm(&store).unwrap_err(), WatchlistError::NothingPending);
    }

    #[test]
    fn test_new_request_replaces_pending() {
        let store = store_with(&["A", "B"]);
        let mut flow = ConfirmationFlow::new();

        flow.request_delete(&store, 0).unwrap();
        flow.request_delete(&store, 1).unwrap();

        assert!(!flow.is_pending(&store, 0));
        assert!(flow.is_pending(&store, 1));

        assert_eq!(flow.confirm(&store).unwrap().title, "B");
        assert_eq!(store.snapshot()[0].title, "A");
    }

    #[test]
    fn test_request_out_of_range_keeps_state() {
        let store = store_with(&["A"]);
        let mut flow = ConfirmationFlow::new();
        flow.request_delete(&store, 0).unwrap();

        let err = flow.request_delete(&store, 4).unwrap_err();
        assert_eq!(err, WatchlistError::IndexOutOfRange { index: 4, len: 1 });
        assert!(flow.is_pending(&store, 0));
    }

    #[test]
    fn test_confirm_targets_entry_not_position() {
        let store = store_with(&["A", "B", "C"]);
        let mut flow = ConfirmationFlow::new();
        flow.request_delete(&store, 2).unwrap();

        // The list shifts while the dialog is open.
        store.remove_entry(0).unwrap();

        assert_eq!(flow.confirm(&store).unwrap().title, "C");
        let remaining: Vec<_> = store.snapshot().into_iter().map(|e| e.title).collect();
        assert_eq!(remaining, vec!["B".to_string()]);
    }

    #[test]
    fn test_pending_position_follows_entry() {
        let store = store_with(&["A", "B", "C"]);
        let mut flow = ConfirmationFlow::new();
        flow.request_delete(&store, 2).unwrap();

        store.remove_entry(0).unwrap();

        assert_eq!(flow.pending_position(&store), Some(1));
        assert!(flow.is_pending(&store, 1));
        assert!(!flow.is_pending(&store, 2));

        // Once the entry itself is gone nothing is highlighted.
        store.remove_entry(1).unwrap();
        assert_eq!(flow.pending_position(&store), None);
        assert!(!flow.is_pending(&store, 1));
    }

    #[test]
    fn test_confirm_after_entry_vanished_reports_and_goes_idle() {
        let store = store_with(&["A"]);
        let mut flow = ConfirmationFlow::new();
        let id = flow.request_delete(&store, 0).unwrap().id;
        store.remove_entry(0).unwrap();

        assert_eq!(flow.confirm(&store).unwrap_err(), WatchlistError::UnknownEntry(id));
        assert_eq!(flow.state(), &ConfirmState::Idle);
    }
}
