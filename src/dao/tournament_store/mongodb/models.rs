use mongodb::bson::{Bson, DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{MongoDaoError, MongoResult};
use crate::dao::models::{
    MatchEntity, MatchStatusEntity, MatchTeamEntity, SetScoreEntity, TeamEntity, TeamStatsEntity,
};

/// Counters are stored as 64-bit integers so `$inc` never changes their BSON type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MongoStatsDocument {
    #[serde(default)]
    matches_played: i64,
    #[serde(default)]
    matches_won: i64,
    #[serde(default)]
    matches_lost: i64,
    #[serde(default)]
    games_for: i64,
    #[serde(default)]
    games_against: i64,
    #[serde(default)]
    points: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoTeamDocument {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    player_one: String,
    player_two: String,
    category: String,
    zone: String,
    #[serde(default)]
    stats: MongoStatsDocument,
    created_at: DateTime,
    updated_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMatchTeamDocument {
    id: String,
    name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MongoSetDocument {
    team_a: i64,
    team_b: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMatchDocument {
    #[serde(rename = "_id")]
    id: String,
    team_a: MongoMatchTeamDocument,
    team_b: MongoMatchTeamDocument,
    court: String,
    starts_at: DateTime,
    round: String,
    zone: String,
    status: MatchStatusEntity,
    #[serde(default)]
    sets: Vec<MongoSetDocument>,
    #[serde(default)]
    winner_id: Option<String>,
    #[serde(default)]
    finished_at: Option<DateTime>,
    created_at: DateTime,
    updated_at: DateTime,
}

impl From<TeamStatsEntity> for MongoStatsDocument {
    fn from(value: TeamStatsEntity) -> Self {
        Self {
            matches_played: value.matches_played.into(),
            matches_won: value.matches_won.into(),
            matches_lost: value.matches_lost.into(),
            games_for: value.games_for.into(),
            games_against: value.games_against.into(),
            points: value.points.into(),
        }
    }
}

impl From<MongoStatsDocument> for TeamStatsEntity {
    fn from(value: MongoStatsDocument) -> Self {
        Self {
            matches_played: counter(value.matches_played),
            matches_won: counter(value.matches_won),
            matches_lost: counter(value.matches_lost),
            games_for: counter(value.games_for),
            games_against: counter(value.games_against),
            points: counter(value.points),
        }
    }
}

impl From<TeamEntity> for MongoTeamDocument {
    fn from(value: TeamEntity) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            player_one: value.player_one,
            player_two: value.player_two,
            category: value.category,
            zone: value.zone,
            stats: value.stats.into(),
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl TryFrom<MongoTeamDocument> for TeamEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoTeamDocument) -> MongoResult<Self> {
        Ok(Self {
            id: parse_id(&value.id)?,
            name: value.name,
            player_one: value.player_one,
            player_two: value.player_two,
            category: value.category,
            zone: value.zone,
            stats: value.stats.into(),
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        })
    }
}

impl From<SetScoreEntity> for MongoSetDocument {
    fn from(value: SetScoreEntity) -> Self {
        Self {
            team_a: value.team_a.into(),
            team_b: value.team_b.into(),
        }
    }
}

impl From<MongoSetDocument> for SetScoreEntity {
    fn from(value: MongoSetDocument) -> Self {
        Self {
            team_a: counter(value.team_a),
            team_b: counter(value.team_b),
        }
    }
}

impl From<MatchTeamEntity> for MongoMatchTeamDocument {
    fn from(value: MatchTeamEntity) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
        }
    }
}

impl TryFrom<MongoMatchTeamDocument> for MatchTeamEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoMatchTeamDocument) -> MongoResult<Self> {
        Ok(Self {
            id: parse_id(&value.id)?,
            name: value.name,
        })
    }
}

impl From<MatchEntity> for MongoMatchDocument {
    fn from(value: MatchEntity) -> Self {
        Self {
            id: value.id.to_string(),
            team_a: value.team_a.into(),
            team_b: value.team_b.into(),
            court: value.court,
            starts_at: DateTime::from_system_time(value.starts_at),
            round: value.round,
            zone: value.zone,
            status: value.status,
            sets: value.sets.into_iter().map(Into::into).collect(),
            winner_id: value.winner_id.map(|id| id.to_string()),
            finished_at: value.finished_at.map(DateTime::from_system_time),
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl TryFrom<MongoMatchDocument> for MatchEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoMatchDocument) -> MongoResult<Self> {
        Ok(Self {
            id: parse_id(&value.id)?,
            team_a: value.team_a.try_into()?,
            team_b: value.team_b.try_into()?,
            court: value.court,
            starts_at: value.starts_at.to_system_time(),
            round: value.round,
            zone: value.zone,
            status: value.status,
            sets: value.sets.into_iter().map(Into::into).collect(),
            winner_id: value.winner_id.as_deref().map(parse_id).transpose()?,
            finished_at: value.finished_at.map(|at| at.to_system_time()),
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        })
    }
}

/// BSON array of set documents, for `$set` updates.
pub fn sets_as_bson(sets: &[SetScoreEntity]) -> Bson {
    Bson::Array(
        sets.iter()
            .map(|set| {
                Bson::Document(doc! {
                    "team_a": i64::from(set.team_a),
                    "team_b": i64::from(set.team_b),
                })
            })
            .collect(),
    )
}

/// `$inc` document adding a stats delta to `stats.*`.
pub fn stats_increment(delta: &TeamStatsEntity) -> Document {
    doc! {
        "stats.matches_played": i64::from(delta.matches_played),
        "stats.matches_won": i64::from(delta.matches_won),
        "stats.matches_lost": i64::from(delta.matches_lost),
        "stats.games_for": i64::from(delta.games_for),
        "stats.games_against": i64::from(delta.games_against),
        "stats.points": i64::from(delta.points),
    }
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": id.to_string()}
}

fn parse_id(raw: &str) -> MongoResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| MongoDaoError::InvalidDocumentId { id: raw.to_owned() })
}

fn counter(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
