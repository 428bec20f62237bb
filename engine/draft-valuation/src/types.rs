//! Record types consumed by the valuation pipeline

use serde::{Deserialize, Serialize};
use std::fmt;

pub type SeasonId = u32;
pub type TeamId = u32;
pub type OwnerId = u32;
pub type PlayerId = u32;

/// Canonical fantasy position.
///
/// Raw position strings coming from imports are noisy ("D/ST", "DEF", lower
/// case, blanks). [`Position::canonicalize`] is the single place where they
/// are mapped onto this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Position {
    QB,
    RB,
    WR,
    TE,
    K,
    DST,
}

impl Position {
    /// All positions in display order
    pub const ALL: [Position; 6] =
        [Position::QB, Position::RB, Position::WR, Position::TE, Position::K, Position::DST];

    /// Position assigned to raw strings that match no known position.
    ///
    /// Most unlabeled fantasy draftees are skill players, so unknown input is
    /// valued against the RB pool.
    pub const FALLBACK: Position = Position::RB;

    /// Map a raw position label onto a canonical position.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// "D/ST", "DEF" and "DST" are defense; anything unrecognized (including
    /// an empty label) becomes [`Position::FALLBACK`].
    pub fn canonicalize(raw: &str) -> Position {
        Position::parse_known(raw).unwrap_or(Position::FALLBACK)
    }

    /// Like [`Position::canonicalize`] but `None` for unrecognized labels
    pub fn parse_known(raw: &str) -> Option<Position> {
        match raw.trim().to_uppercase().as_str() {
            "QB" => Some(Position::QB),
            "RB" => Some(Position::RB),
            "WR" => Some(Position::WR),
            "TE" => Some(Position::TE),
            "K" => Some(Position::K),
            "DST" | "D/ST" | "DEF" => Some(Position::DST),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::QB => "QB",
            Position::RB => "RB",
            Position::WR => "WR",
            Position::TE => "TE",
            Position::K => "K",
            Position::DST => "DST",
        }
    }
}

impl From<String> for Position {
    fn from(raw: String) -> Self {
        Position::canonicalize(&raw)
    }
}

impl std::str::FromStr for Position {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Position::canonicalize(s))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A year of competition in a league
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub id: SeasonId,
    pub year: u32,
    #[serde(default, alias = "leagueId")]
    pub league_id: Option<u32>,
}

/// A person who controls teams across seasons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub id: OwnerId,
    #[serde(alias = "displayName")]
    pub display_name: String,
}

/// A roster-holding entity inside one season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    #[serde(alias = "seasonId")]
    pub season_id: SeasonId,
    #[serde(alias = "ownerId")]
    pub owner_id: OwnerId,
    pub name: String,
    #[serde(default, alias = "finalStanding")]
    pub final_standing: Option<u32>,
}

/// A league-agnostic player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Position label as imported; use [`Player::canonical_position`]
    pub position: String,
    /// NFL team abbreviation (e.g. "BAL")
    #[serde(default, alias = "nflTeam", alias = "team")]
    pub nfl_team: Option<String>,
}

impl Player {
    pub fn canonical_position(&self) -> Position {
        Position::canonicalize(&self.position)
    }
}

/// One draft selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPick {
    #[serde(alias = "seasonId")]
    pub season_id: SeasonId,
    #[serde(alias = "teamId")]
    pub team_id: TeamId,
    #[serde(alias = "playerId")]
    pub player_id: PlayerId,
    pub round: u32,
    /// Pick number inside the round
    pub pick: u32,
    /// 1-indexed pick number across the whole draft
    #[serde(alias = "overallPick")]
    pub overall_pick: u32,
}

impl DraftPick {
    /// Identity of the real-world draft event this row records
    pub fn key(&self) -> PickKey {
        PickKey {
            season_id: self.season_id,
            player_id: self.player_id,
            team_id: self.team_id,
            overall_pick: self.overall_pick,
        }
    }
}

/// Deduplication key for draft picks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PickKey {
    pub season_id: SeasonId,
    pub player_id: PlayerId,
    pub team_id: TeamId,
    pub overall_pick: u32,
}

/// Points scored by a player while on a roster.
///
/// Either one row per week or one already-summed season row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    #[serde(alias = "teamId")]
    pub team_id: TeamId,
    #[serde(alias = "playerId")]
    pub player_id: PlayerId,
    #[serde(alias = "seasonId")]
    pub season_id: SeasonId,
    #[serde(default)]
    pub week: Option<u32>,
    pub points: f64,
}
