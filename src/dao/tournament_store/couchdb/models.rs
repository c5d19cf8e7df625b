use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::error::CouchDaoError;
use crate::dao::models::{
    MatchEntity, MatchStatusEntity, MatchTeamEntity, SetScoreEntity, TeamEntity, TeamStatsEntity,
    TeamStatsUpdate,
};

pub const TEAM_PREFIX: &str = "team::";
pub const MATCH_PREFIX: &str = "match::";
pub const END_SUFFIX: &str = "\u{ffff}";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    pub id: String,
    #[serde(default)]
    pub doc: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchTeamDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub team: TeamBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamBody {
    pub name: String,
    pub player_one: String,
    pub player_two: String,
    pub category: String,
    pub zone: String,
    #[serde(default)]
    pub stats: TeamStatsEntity,
    /// Matches whose result is already counted in `stats`.
    #[serde(default)]
    pub applied_matches: Vec<Uuid>,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchMatchDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub game: MatchBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchBody {
    pub team_a: MatchTeamEntity,
    pub team_b: MatchTeamEntity,
    pub court: String,
    pub starts_at: SystemTime,
    pub round: String,
    pub zone: String,
    pub status: MatchStatusEntity,
    #[serde(default)]
    pub sets: Vec<SetScoreEntity>,
    #[serde(default)]
    pub winner_id: Option<Uuid>,
    #[serde(default)]
    pub finished_at: Option<SystemTime>,
    /// Standings increments written with the finished status and cleared once both
    /// team documents carry them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pending_stats: Vec<CouchStatsUpdate>,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CouchStatsUpdate {
    pub team_id: Uuid,
    pub delta: TeamStatsEntity,
}

impl From<TeamStatsUpdate> for CouchStatsUpdate {
    fn from(value: TeamStatsUpdate) -> Self {
        Self {
            team_id: value.team_id,
            delta: value.delta,
        }
    }
}

impl From<TeamEntity> for CouchTeamDocument {
    fn from(team: TeamEntity) -> Self {
        Self {
            id: team_doc_id(team.id),
            rev: None,
            team: TeamBody {
                name: team.name,
                player_one: team.player_one,
                player_two: team.player_two,
                category: team.category,
                zone: team.zone,
                stats: team.stats,
                applied_matches: Vec::new(),
                created_at: team.created_at,
                updated_at: team.updated_at,
            },
        }
    }
}

impl TryFrom<CouchTeamDocument> for TeamEntity {
    type Error = CouchDaoError;

    fn try_from(doc: CouchTeamDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: extract_uuid(&doc.id)?,
            name: doc.team.name,
            player_one: doc.team.player_one,
            player_two: doc.team.player_two,
            category: doc.team.category,
            zone: doc.team.zone,
            stats: doc.team.stats,
            created_at: doc.team.created_at,
            updated_at: doc.team.updated_at,
        })
    }
}

impl From<MatchEntity> for CouchMatchDocument {
    fn from(game: MatchEntity) -> Self {
        Self {
            id: match_doc_id(game.id),
            rev: None,
            game: MatchBody {
                team_a: game.team_a,
                team_b: game.team_b,
                court: game.court,
                starts_at: game.starts_at,
                round: game.round,
                zone: game.zone,
                status: game.status,
                sets: game.sets,
                winner_id: game.winner_id,
                finished_at: game.finished_at,
                pending_stats: Vec::new(),
                created_at: game.created_at,
                updated_at: game.updated_at,
            },
        }
    }
}

impl TryFrom<CouchMatchDocument> for MatchEntity {
    type Error = CouchDaoError;

    fn try_from(doc: CouchMatchDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: extract_uuid(&doc.id)?,
            team_a: doc.game.team_a,
            team_b: doc.game.team_b,
            court: doc.game.court,
            starts_at: doc.game.starts_at,
            round: doc.game.round,
            zone: doc.game.zone,
            status: doc.game.status,
            sets: doc.game.sets,
            winner_id: doc.game.winner_id,
            finished_at: doc.game.finished_at,
            created_at: doc.game.created_at,
            updated_at: doc.game.updated_at,
        })
    }
}

pub fn team_doc_id(id: Uuid) -> String {
    format!("{}{}", TEAM_PREFIX, id)
}

pub fn match_doc_id(id: Uuid) -> String {
    format!("{}{}", MATCH_PREFIX, id)
}

pub fn extract_uuid(doc_id: &str) -> Result<Uuid, CouchDaoError> {
    let (_, id) = doc_id
        .split_once("::")
        .ok_or_else(|| CouchDaoError::InvalidDocId {
            doc_id: doc_id.to_string(),
            reason: "missing separator",
        })?;

    Uuid::parse_str(id).map_err(|_| CouchDaoError::InvalidDocId {
        doc_id: doc_id.to_string(),
        reason: "invalid UUID",
    })
}
