pub mod app;
pub mod config;
pub mod confirm;
pub mod debounce;
pub mod error;
pub mod http;
pub mod models;
pub mod sequencer;
pub mod store;
pub mod suggest;
pub mod tmdb;

pub use app::{Notice, WatchlistApp};
pub use error::{LookupError, RemoteError, ValidationError, WatchlistError};
pub use models::{DraftEntry, Enrichment, EntryId, Genre, Platform, WatchlistEntry};
pub use store::WatchlistStore;
pub use tmdb::{TitleLookup, TmdbClient};
