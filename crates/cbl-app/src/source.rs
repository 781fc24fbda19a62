// Remote data sources: the published identifier sheet and the season
// leaderboards.
//
// `DataSource` is the seam the dashboard fetches through, so tests can swap
// in fixture-backed sources without touching the network.

use async_trait::async_trait;
use cbl_baseball::identity::{parse_identity_html, IdentityError, IdentityMap};
use cbl_baseball::schema::StatKind;
use cbl_baseball::stats::{leaderboard_url, parse_leaderboard, SeasonStatLine, StatsError};
use cbl_core::config::SourcesConfig;
use thiserror::Error;
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to parse identifier sheet: {0}")]
    Identity(#[from] IdentityError),

    #[error("failed to parse leaderboard: {0}")]
    Stats(#[from] StatsError),

    /// Raised by non-HTTP sources (fixtures, fakes).
    #[error("{0}")]
    Other(String),
}

// ---------------------------------------------------------------------------
// DataSource trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch and parse the identifier map.
    async fn fetch_id_map(&self) -> Result<IdentityMap, FetchError>;

    /// Fetch every player's full-season line of `kind` for `season`.
    async fn fetch_stats(
        &self,
        kind: StatKind,
        season: i32,
    ) -> Result<Vec<SeasonStatLine>, FetchError>;
}

// ---------------------------------------------------------------------------
// HttpSource
// ---------------------------------------------------------------------------

/// Fetches from the configured public endpoints.
pub struct HttpSource {
    http: reqwest::Client,
    id_map_url: String,
    stats_base_url: String,
}

impl HttpSource {
    pub fn new(id_map_url: String, stats_base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            id_map_url,
            stats_base_url,
        }
    }

    pub fn from_config(sources: &SourcesConfig) -> Self {
        Self::new(sources.id_map_url.clone(), sources.stats_base_url.clone())
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let http_err = |source| FetchError::Http {
            url: url.to_string(),
            source,
        };

        let response = self.http.get(url).send().await.map_err(http_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        let body = response.text().await.map_err(http_err)?;
        debug!(url, bytes = body.len(), "fetched");
        Ok(body)
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn fetch_id_map(&self) -> Result<IdentityMap, FetchError> {
        info!("Fetching identifier map");
        let body = self.get_text(&self.id_map_url).await?;
        Ok(parse_identity_html(&body)?)
    }

    async fn fetch_stats(
        &self,
        kind: StatKind,
        season: i32,
    ) -> Result<Vec<SeasonStatLine>, FetchError> {
        info!(?kind, season, "Fetching season leaderboard");
        let url = leaderboard_url(&self.stats_base_url, kind, season);
        let body = self.get_text(&url).await?;
        Ok(parse_leaderboard(&body)?)
    }
}
