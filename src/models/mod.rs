use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A candidate title returned by the live search.
pub type Suggestion = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Platform {
    #[serde(rename = "Amazon Prime Video")]
    AmazonPrimeVideo,
    #[serde(rename = "Disney+ Hotstar")]
    DisneyHotstar,
    Netflix,
}

impl Platform {
    pub const ALL: [Platform; 3] = [
        Platform::AmazonPrimeVideo,
        Platform::DisneyHotstar,
        Platform::Netflix,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Platform::AmazonPrimeVideo => "Amazon Prime Video",
            Platform::DisneyHotstar => "Disney+ Hotstar",
            Platform::Netflix => "Netflix",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Platform {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Platform::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownOption(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Genre {
    Action,
    Comedy,
    Romance,
}

impl Genre {
    pub const ALL: [Genre; 3] = [Genre::Action, Genre::Comedy, Genre::Romance];

    pub fn label(&self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Comedy => "Comedy",
            Genre::Romance => "Romance",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Genre {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Genre::ALL
            .into_iter()
            .find(|g| g.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownOption(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown option: {0:?}")]
pub struct UnknownOption(pub String);

/// Required fields of a draft, in form order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DraftField {
    Title,
    Platform,
    Genre,
    Link,
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DraftField::Title => "title",
            DraftField::Platform => "platform",
            DraftField::Genre => "genre",
            DraftField::Link => "link",
        })
    }
}

/// An entry still being filled in by the user. Starts empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftEntry {
    pub title: String,
    pub platform: Option<Platform>,
    pub genre: Option<Genre>,
    pub link: String,
}

impl DraftEntry {
    pub fn new(title: impl Into<String>, platform: Platform, genre: Genre, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            platform: Some(platform),
            genre: Some(genre),
            link: link.into(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Stable identifier minted when an entry is committed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Optional metadata from the remote detail lookup. Passed through as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    pub poster_path: Option<String>,
    pub rating: Option<f64>,
    pub cast: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub id: EntryId,
    pub title: String,
    pub platform: Platform,
    pub genre: Genre,
    pub link: String,
    pub poster_path: Option<String>,
    pub rating: Option<f64>,
    pub cast: Option<Vec<String>>,
    pub added_at: DateTime<Utc>,
}

impl WatchlistEntry {
    /// Link usable as an href; bare hosts get an `http://` scheme.
    pub fn href(&self) -> String {
        if self.link.starts_with("http") {
            self.link.clone()
        } else {
            format!("http://{}", self.link)
        }
    }

    pub fn poster_url(&self, image_base_url: &str) -> Option<String> {
        self.poster_path
            .as_ref()
            .map(|path| format!("{}{}", image_base_url.trim_end_matches('/'), path))
    }

    /// Rating on a five star scale in half-star steps.
    pub fn stars(&self) -> Option<f64> {
        self.rating.map(|r| r.round() / 2.0)
    }

    pub fn cast_line(&self) -> Option<String> {
        self.cast.as_ref().map(|names| names.join(", "))
    }
}
