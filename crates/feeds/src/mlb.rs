//! MLB Stats API client.
//!
//! Two endpoints are used: the day's schedule, then one linescore per game
//! for live scores and inning.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Timelike, Utc};
use poller_core::{GameRecord, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::MlbApiConfig;
use crate::http::{build_client, get_json};

/// Placeholder stored when the linescore carries no inning state.
pub const UNKNOWN_INNING_STATE: &str = "N/A";

/// A scheduled game from the day's listing.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSummary {
    pub game_pk: i64,
    pub game_date: DateTime<Utc>,
    pub home_team: String,
    pub away_team: String,
    pub status: String,
}

/// Live detail for one game.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Linescore {
    pub current_inning: Option<i32>,
    pub inning_state: Option<String>,
    pub home_runs: Option<i32>,
    pub away_runs: Option<i32>,
}

impl GameSummary {
    /// Combines the listing entry with its linescore into a snapshot.
    pub fn into_record(self, linescore: Linescore) -> GameRecord {
        GameRecord {
            game_pk: self.game_pk,
            game_date: self.game_date.date_naive(),
            game_time: self
                .game_date
                .time()
                .with_nanosecond(0)
                .unwrap_or_else(|| self.game_date.time()),
            home_team: self.home_team,
            away_team: self.away_team,
            home_score: linescore.home_runs,
            away_score: linescore.away_runs,
            inning: linescore.current_inning,
            inning_state: linescore
                .inning_state
                .unwrap_or_else(|| UNKNOWN_INNING_STATE.to_string()),
            status: self.status,
        }
    }
}

/// Source of schedule listings and per-game detail.
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    /// Games scheduled on `date`. Failure here is fatal for the cycle.
    async fn games_on(&self, date: NaiveDate) -> Result<Vec<GameSummary>>;

    /// Live detail for one game.
    async fn linescore(&self, game_pk: i64) -> Result<Linescore>;
}

// Wire format

#[derive(Debug, Deserialize)]
struct ScheduleResponse {
    #[serde(default)]
    dates: Vec<ScheduleDate>,
}

#[derive(Debug, Deserialize)]
struct ScheduleDate {
    #[serde(default)]
    games: Vec<ScheduleGame>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleGame {
    game_pk: i64,
    game_date: DateTime<Utc>,
    teams: ScheduleTeams,
    status: ScheduleStatus,
}

#[derive(Debug, Deserialize)]
struct ScheduleTeams {
    home: ScheduleSide,
    away: ScheduleSide,
}

#[derive(Debug, Deserialize)]
struct ScheduleSide {
    team: TeamRef,
}

#[derive(Debug, Deserialize)]
struct TeamRef {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleStatus {
    detailed_state: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinescoreResponse {
    current_inning: Option<i32>,
    inning_state: Option<String>,
    #[serde(default)]
    teams: LinescoreTeams,
}

#[derive(Debug, Default, Deserialize)]
struct LinescoreTeams {
    #[serde(default)]
    home: LinescoreSide,
    #[serde(default)]
    away: LinescoreSide,
}

#[derive(Debug, Default, Deserialize)]
struct LinescoreSide {
    runs: Option<i32>,
}

impl From<ScheduleGame> for GameSummary {
    fn from(game: ScheduleGame) -> Self {
        Self {
            game_pk: game.game_pk,
            game_date: game.game_date,
            home_team: game.teams.home.team.name,
            away_team: game.teams.away.team.name,
            status: game.status.detailed_state,
        }
    }
}

impl From<LinescoreResponse> for Linescore {
    fn from(raw: LinescoreResponse) -> Self {
        Self {
            current_inning: raw.current_inning,
            inning_state: raw.inning_state,
            home_runs: raw.teams.home.runs,
            away_runs: raw.teams.away.runs,
        }
    }
}

/// Only the first date block is read; the request spans a single day.
fn parse_schedule(raw: ScheduleResponse) -> Vec<GameSummary> {
    raw.dates
        .into_iter()
        .next()
        .map(|d| d.games.into_iter().map(GameSummary::from).collect())
        .unwrap_or_default()
}

/// HTTP client for the MLB Stats API.
#[derive(Debug, Clone)]
pub struct MlbClient {
    client: Client,
    config: MlbApiConfig,
}

impl MlbClient {
    pub fn new(config: MlbApiConfig) -> Result<Self> {
        let client = build_client(config.timeout())?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl ScheduleSource for MlbClient {
    async fn games_on(&self, date: NaiveDate) -> Result<Vec<GameSummary>> {
        let day = date.format("%Y-%m-%d").to_string();
        let sport_id = self.config.sport_id.to_string();
        let url = format!("{}/api/v1/schedule", self.config.base_url);
        let request = self.client.get(&url).query(&[
            ("startDate", day.as_str()),
            ("endDate", day.as_str()),
            ("sportId", sport_id.as_str()),
        ]);

        let raw: ScheduleResponse = get_json(request, "MLB schedule").await?;
        let games = parse_schedule(raw);
        debug!(date = %day, games = games.len(), "Fetched MLB schedule");
        Ok(games)
    }

    async fn linescore(&self, game_pk: i64) -> Result<Linescore> {
        let url = format!("{}/api/v1/game/{}/linescore", self.config.base_url, game_pk);
        let raw: LinescoreResponse =
            get_json(self.client.get(&url), &format!("MLB linescore {game_pk}")).await?;
        Ok(raw.into())
    }
}
