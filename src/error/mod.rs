use crate::models::{DraftField, EntryId};
use std::collections::BTreeSet;

/// Failures of the remote title lookup.
#[derive(thiserror::Error, Debug)]
pub enum LookupError {
    /// Blank query, answered locally without a network call.
    #[error("Search query is empty")]
    EmptyQuery,

    #[error("Remote lookup failed: {0}")]
    Remote(#[from] RemoteError),

    #[error("No match found for: {0}")]
    NotFound(String),
}

#[derive(thiserror::Error, Debug)]
pub enum RemoteError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP request failed: {0}")]
    Status(u16),

    #[error("malformed response body: {0}")]
    Malformed(String),
}

/// A draft is missing one or more required fields.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Please fill in all the fields (missing: {})", join_fields(.missing))]
pub struct ValidationError {
    pub missing: BTreeSet<DraftField>,
}

fn join_fields(fields: &BTreeSet<DraftField>) -> String {
    fields
        .iter()
        .map(|field| field.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WatchlistError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Index {index} is out of range for a watchlist of {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Entry {0} is no longer in the watchlist")]
    UnknownEntry(EntryId),

    #[error("No delete is awaiting confirmation")]
    NothingPending,
}
