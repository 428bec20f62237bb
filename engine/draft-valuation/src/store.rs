//! Record store access
//!
//! The engine reads the full historical corpus from an external record store
//! on every query and never writes back. [`RecordStore`] is the seam; the
//! in-memory and JSON-directory stores are the two implementations shipped
//! with the crate.

use crate::error::{Result, ValuationError};
use crate::types::*;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Bulk read access to the league history
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    async fn draft_picks(&self) -> Result<Vec<DraftPick>>;

    async fn players(&self) -> Result<Vec<Player>>;

    async fn roster_entries(&self) -> Result<Vec<RosterEntry>>;

    async fn teams(&self) -> Result<Vec<Team>>;

    async fn seasons(&self) -> Result<Vec<Season>>;

    async fn owners(&self) -> Result<Vec<Owner>>;
}

/// Snapshot of every record the engine needs for one query
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub seasons: Vec<Season>,
    pub owners: Vec<Owner>,
    pub teams: Vec<Team>,
    pub players: Vec<Player>,
    pub draft_picks: Vec<DraftPick>,
    pub roster_entries: Vec<RosterEntry>,
}

impl Corpus {
    /// Fetch all collections from a store concurrently
    pub async fn load(store: &dyn RecordStore) -> Result<Self> {
        let (draft_picks, players, roster_entries, teams, seasons, owners) = tokio::try_join!(
            store.draft_picks(),
            store.players(),
            store.roster_entries(),
            store.teams(),
            store.seasons(),
            store.owners()
        )?;

        debug!(
            "Loaded corpus: {} picks, {} players, {} roster entries, {} teams, {} seasons, {} owners",
            draft_picks.len(),
            players.len(),
            roster_entries.len(),
            teams.len(),
            seasons.len(),
            owners.len()
        );

        Ok(Self { seasons, owners, teams, players, draft_picks, roster_entries })
    }

    /// Build id lookups over this corpus
    pub fn index(&self) -> CorpusIndex<'_> {
        CorpusIndex {
            seasons: self.seasons.iter().map(|s| (s.id, s)).collect(),
            owners: self.owners.iter().map(|o| (o.id, o)).collect(),
            teams: self.teams.iter().map(|t| (t.id, t)).collect(),
            players: self.players.iter().map(|p| (p.id, p)).collect(),
        }
    }
}

/// Id lookups borrowed from a [`Corpus`]
#[derive(Debug)]
pub struct CorpusIndex<'a> {
    seasons: HashMap<SeasonId, &'a Season>,
    owners: HashMap<OwnerId, &'a Owner>,
    teams: HashMap<TeamId, &'a Team>,
    players: HashMap<PlayerId, &'a Player>,
}

impl<'a> CorpusIndex<'a> {
    pub fn season(&self, id: SeasonId) -> Option<&'a Season> {
        self.seasons.get(&id).copied()
    }

    pub fn owner(&self, id: OwnerId) -> Option<&'a Owner> {
        self.owners.get(&id).copied()
    }

    pub fn team(&self, id: TeamId) -> Option<&'a Team> {
        self.teams.get(&id).copied()
    }

    pub fn player(&self, id: PlayerId) -> Option<&'a Player> {
        self.players.get(&id).copied()
    }
}

/// Store backed by an in-memory corpus
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    corpus: Corpus,
}

impl InMemoryStore {
    pub fn new(corpus: Corpus) -> Self {
        Self { corpus }
    }
}

#[async_trait::async_trait]
impl RecordStore for InMemoryStore {
    async fn draft_picks(&self) -> Result<Vec<DraftPick>> {
        Ok(self.corpus.draft_picks.clone())
    }

    async fn players(&self) -> Result<Vec<Player>> {
        Ok(self.corpus.players.clone())
    }

    async fn roster_entries(&self) -> Result<Vec<RosterEntry>> {
        Ok(self.corpus.roster_entries.clone())
    }

    async fn teams(&self) -> Result<Vec<Team>> {
        Ok(self.corpus.teams.clone())
    }

    async fn seasons(&self) -> Result<Vec<Season>> {
        Ok(self.corpus.seasons.clone())
    }

    async fn owners(&self) -> Result<Vec<Owner>> {
        Ok(self.corpus.owners.clone())
    }
}

/// Store reading one JSON array file per collection from a directory.
///
/// Expected files: `seasons.json`, `owners.json`, `teams.json`,
/// `players.json`, `draft_picks.json`, `roster_entries.json`. A missing file
/// is read as an empty collection.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    data_dir: PathBuf,
}

impl JsonDirStore {
    pub const SEASONS_FILE: &'static str = "seasons.json";
    pub const OWNERS_FILE: &'static str = "owners.json";
    pub const TEAMS_FILE: &'static str = "teams.json";
    pub const PLAYERS_FILE: &'static str = "players.json";
    pub const DRAFT_PICKS_FILE: &'static str = "draft_picks.json";
    pub const ROSTER_ENTRIES_FILE: &'static str = "roster_entries.json";

    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    async fn read_collection<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>> {
        let path = self.data_dir.join(file);
        if !tokio::fs::try_exists(&path).await? {
            debug!("Record file {:?} not found, treating as empty", path);
            return Ok(Vec::new());
        }

        let content = tokio::fs::read_to_string(&path).await?;
        let records: Vec<T> = serde_json::from_str(&content).map_err(|e| {
            warn!("Failed to parse record file {:?}: {}", path, e);
            ValuationError::Serialization(e)
        })?;

        info!("Loaded {} records from {:?}", records.len(), path);
        Ok(records)
    }
}

#[async_trait::async_trait]
impl RecordStore for JsonDirStore {
    async fn draft_picks(&self) -> Result<Vec<DraftPick>> {
        self.read_collection(Self::DRAFT_PICKS_FILE).await
    }

    async fn players(&self) -> Result<Vec<Player>> {
        self.read_collection(Self::PLAYERS_FILE).await
    }

    async fn roster_entries(&self) -> Result<Vec<RosterEntry>> {
        self.read_collection(Self::ROSTER_ENTRIES_FILE).await
    }

    async fn teams(&self) -> Result<Vec<Team>> {
        self.read_collection(Self::TEAMS_FILE).await
    }

    async fn seasons(&self) -> Result<Vec<Season>> {
        self.read_collection(Self::SEASONS_FILE).await
    }

    async fn owners(&self) -> Result<Vec<Owner>> {
        self.read_collection(Self::OWNERS_FILE).await
    }
}
