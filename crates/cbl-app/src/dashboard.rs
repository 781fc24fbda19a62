// Dashboard: produces the batter, pitcher and defense tables.
//
// Remote inputs (identifier map, both leaderboards) go through one
// `TtlCache` each, so a page view within the cache window reuses the last
// fetch. Local CSVs are re-read on every build.

use std::path::Path;
use std::sync::Arc;

use cbl_baseball::defense::{load_defense, DefenseError};
use cbl_baseball::identity::IdentityMap;
use cbl_baseball::merge::{build_player_table, MergeError};
use cbl_baseball::roster::{load_roster, RosterError};
use cbl_baseball::schema::StatKind;
use cbl_baseball::stats::SeasonStatLine;
use cbl_core::cache::TtlCache;
use cbl_core::config::Config;
use cbl_core::table::Table;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use crate::page::Page;
use crate::source::{DataSource, FetchError};

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Defense(#[from] DefenseError),
}

/// All three output tables from one refresh.
#[derive(Debug, Clone)]
pub struct DashboardTables {
    pub batters: Table,
    pub pitchers: Table,
    pub defense: Table,
}

pub struct Dashboard<S> {
    config: Config,
    source: S,
    id_map: TtlCache<Arc<IdentityMap>>,
    batting: TtlCache<Arc<Vec<SeasonStatLine>>>,
    pitching: TtlCache<Arc<Vec<SeasonStatLine>>>,
}

impl<S: DataSource> Dashboard<S> {
    pub fn new(config: Config, source: S) -> Self {
        let ttl = config.cache_ttl_secs;
        Self {
            config,
            source,
            id_map: TtlCache::with_ttl_secs("id_map", ttl),
            batting: TtlCache::with_ttl_secs("batting_stats", ttl),
            pitching: TtlCache::with_ttl_secs("pitching_stats", ttl),
        }
    }

    async fn identities(&self, now: DateTime<Utc>) -> Result<Arc<IdentityMap>, FetchError> {
        self.id_map
            .get_or_refresh(now, || async {
                let map = self.source.fetch_id_map().await?;
                info!("Identifier map loaded: {} rows", map.len());
                Ok(Arc::new(map))
            })
            .await
    }

    async fn season_stats(
        &self,
        kind: StatKind,
        now: DateTime<Utc>,
    ) -> Result<Arc<Vec<SeasonStatLine>>, FetchError> {
        let cache = match kind {
            StatKind::Batting => &self.batting,
            StatKind::Pitching => &self.pitching,
        };
        let season = self.config.season;
        cache
            .get_or_refresh(now, || async {
                let lines = self.source.fetch_stats(kind, season).await?;
                info!(?kind, season, "Leaderboard loaded: {} lines", lines.len());
                Ok(Arc::new(lines))
            })
            .await
    }

    async fn player_table(
        &self,
        kind: StatKind,
        roster_path: &str,
        now: DateTime<Utc>,
    ) -> Result<Table, DashboardError> {
        let identities = self.identities(now).await?;
        let stats = self.season_stats(kind, now).await?;
        let roster = load_roster(Path::new(roster_path))?;
        Ok(build_player_table(
            kind,
            &roster,
            &stats,
            &identities,
            &self.config.sources.profile_base_url,
        )?)
    }

    /// Enriched batter table as of `now`.
    pub async fn batters(&self, now: DateTime<Utc>) -> Result<Table, DashboardError> {
        self.player_table(StatKind::Batting, &self.config.data_paths.batters, now)
            .await
    }

    /// Enriched pitcher table as of `now`.
    pub async fn pitchers(&self, now: DateTime<Utc>) -> Result<Table, DashboardError> {
        self.player_table(StatKind::Pitching, &self.config.data_paths.pitchers, now)
            .await
    }

    /// Defense table. Reads only the local CSV.
    pub fn defense(&self) -> Result<Table, DashboardError> {
        Ok(load_defense(Path::new(&self.config.data_paths.defense))?)
    }

    /// Table for a single page.
    pub async fn page(&self, page: Page, now: DateTime<Utc>) -> Result<Table, DashboardError> {
        match page {
            Page::Batters => self.batters(now).await,
            Page::Pitchers => self.pitchers(now).await,
            Page::Defense => self.defense(),
        }
    }

    /// Build all three tables.
    pub async fn refresh(&self, now: DateTime<Utc>) -> Result<DashboardTables, DashboardError> {
        Ok(DashboardTables {
            batters: self.batters(now).await?,
            pitchers: self.pitchers(now).await?,
            defense: self.defense()?,
        })
    }

    /// Drop all cached remote data so the next build fetches.
    pub async fn invalidate(&self) {
        self.id_map.invalidate().await;
        self.batting.invalidate().await;
        self.pitching.invalidate().await;
    }
}
