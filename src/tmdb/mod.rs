use crate::config::TmdbConfig;
use crate::error::LookupError;
use crate::http::HttpClient;
use crate::models::{Enrichment, Suggestion};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

/// Remote title search used by the suggestion pipeline and by submit-time enrichment.
///
/// Implementations must not touch shared state; callers decide what to do with
/// the results.
#[async_trait::async_trait]
pub trait TitleLookup: Send + Sync {
    /// Candidate titles for `query`. Blank queries fail with
    /// [`LookupError::EmptyQuery`] without a network call.
    async fn search(&self, query: &str) -> Result<Vec<Suggestion>, LookupError>;

    /// Details for the first match of `title`.
    async fn fetch_details(&self, title: &str) -> Result<Enrichment, LookupError>;
}

pub struct TmdbClient {
    http: HttpClient,
    config: TmdbConfig,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

#[derive(Debug, Clone, Deserialize)]
struct SearchHit {
    id: u64,
    title: String,
    poster_path: Option<String>,
    vote_average: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct MovieDetails {
    poster_path: Option<String>,
    vote_average: Option<f64>,
    credits: Option<Credits>,
}

#[derive(Debug, Deserialize)]
struct Credits {
    #[serde(default)]
    cast: Vec<CastMember>,
}

#[derive(Debug, Deserialize)]
struct CastMember {
    name: String,
}

impl TmdbClient {
    pub fn new(http: HttpClient, config: TmdbConfig) -> Self {
        Self { http, config }
    }

    #[instrument(skip(self))]
    async fn search_hits(&self, query: &str) -> Result<Vec<SearchHit>, LookupError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(LookupError::EmptyQuery);
        }

        let url = format!(
            "{}/search/movie?api_key={}&query={}",
            self.config.base_url(),
            urlencoding::encode(&self.config.api_key),
            urlencoding::encode(query)
        );

        let response: SearchResponse = self.http.get_json(&url).await?;
        debug!("Search for '{}' returned {} results", query, response.results.len());
        Ok(response.results)
    }

    #[instrument(skip(self))]
    async fn movie_details(&self, id: u64) -> Result<MovieDetails, LookupError> {
        let url = format!(
            "{}/movie/{}?api_key={}&append_to_response=credits",
            self.config.base_url(),
            id,
            urlencoding::encode(&self.config.api_key)
        );

        Ok(self.http.get_json(&url).await?)
    }
}

#[async_trait::async_trait]
impl TitleLookup for TmdbClient {
    async fn search(&self, query: &str) -> Result<Vec<Suggestion>, LookupError> {
        let hits = self.search_hits(query).await?;
        Ok(hits.into_iter().map(|hit| hit.title).collect())
    }

    async fn fetch_details(&self, title: &str) -> Result<Enrichment, LookupError> {
        let hits = self.search_hits(title).await?;
        let Some(hit) = hits.into_iter().next() else {
            return Err(LookupError::NotFound(title.trim().to_string()));
        };

        info!("Found match for '{}': {} (TMDB: {})", title, hit.title, hit.id);

        let details = self.movie_details(hit.id).await.map_err(|e| {
            warn!("Detail lookup failed for TMDB {}: {}", hit.id, e);
            e
        })?;

        let cast = details.credits.map(|credits| {
            credits
                .cast
                .into_iter()
                .take(self.config.cast_limit())
                .map(|member| member.name)
                .collect::<Vec<_>>()
        });

        Ok(Enrichment {
            poster_path: details.poster_path.or(hit.poster_path),
            rating: details.vote_average.or(hit.vote_average),
            cast,
        })
    }
}
