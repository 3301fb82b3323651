//! Replay parsing through an external parser.
//!
//! The binary replay format is not parsed in-process. The configured command is run
//! with the path of a temporary copy of the replay appended as its last argument,
//! and must print a JSON report in the shape produced by `screp`.

use std::process::Output;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serenity::async_trait;

use crate::error::replay::ReplayError;

/// Duration of one game frame at the "fastest" game speed.
const FRAME_MS: u64 = 42;

/// Information about a parsed replay.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaySummary {
    /// Game title as set by the host, may be empty.
    pub title: String,
    pub map_name: String,
    pub duration_ms: u64,
    pub start_time: Option<DateTime<Utc>>,
    pub players: Vec<ReplayPlayer>,
    pub chat: Vec<ChatLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayPlayer {
    pub id: u8,
    pub name: String,
    /// Race name, e.g. `Zerg`.
    pub race: String,
    pub team: u8,
    pub is_observer: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    /// Time into the game at which the message was sent.
    pub time_ms: u64,
    pub player: String,
    pub message: String,
}

impl ReplaySummary {
    /// A `Name vs Name` style description of the match-up, grouped by team.
    pub fn matchup(&self) -> String {
        let mut teams: Vec<(u8, Vec<&str>)> = Vec::new();
        for player in self.players.iter().filter(|p| !p.is_observer) {
            match teams.iter_mut().find(|(team, _)| *team == player.team) {
                Some((_, names)) => names.push(&player.name),
                None => teams.push((player.team, vec![&player.name])),
            }
        }

        teams
            .iter()
            .map(|(_, names)| names.join(", "))
            .collect::<Vec<_>>()
            .join(" vs ")
    }
}

/// Parses replay files.
#[async_trait]
pub trait ReplayParser: Send + Sync {
    /// Parses the raw bytes of a replay file.
    ///
    /// # Arguments
    /// - `data` - Content of the `.rep` file
    ///
    /// # Returns
    /// - `Ok(ReplaySummary)` - Parsed replay information
    /// - `Err(ReplayError::UnsupportedVersion)` - Replay predates StarCraft: Remastered
    /// - `Err(ReplayError::Unknown)` - Any other failure
    async fn parse(&self, data: &[u8]) -> Result<ReplaySummary, ReplayError>;
}

/// Replay parser running an external command.
pub struct CommandReplayParser {
    command: Vec<String>,
}

impl CommandReplayParser {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

#[async_trait]
impl ReplayParser for CommandReplayParser {
    async fn parse(&self, data: &[u8]) -> Result<ReplaySummary, ReplayError> {
        let output = run_with_replay_file(&self.command, data)
            .await
            .map_err(|e| ReplayError::Unknown(format!("Failed to run replay parser: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let message = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(ReplayError::from_message(message));
        }

        let report: ScrepReport = serde_json::from_slice(&output.stdout)
            .map_err(|e| ReplayError::Unknown(format!("Invalid replay parser output: {}", e)))?;

        Ok(report.into_summary())
    }
}

/// Runs a command with a temporary copy of a replay file as its last argument.
///
/// The temporary file is removed once the command has finished.
pub(crate) async fn run_with_replay_file(
    command: &[String],
    data: &[u8],
) -> std::io::Result<Output> {
    let Some((program, args)) = command.split_first() else {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "empty command",
        ));
    };

    let file = tempfile::Builder::new()
        .prefix("hydrabot-")
        .suffix(".rep")
        .tempfile()?;
    tokio::fs::write(file.path(), data).await?;

    tokio::process::Command::new(program)
        .args(args)
        .arg(file.path())
        .kill_on_drop(true)
        .output()
        .await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ScrepReport {
    header: ScrepHeader,
    #[serde(default)]
    computed: Option<ScrepComputed>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ScrepHeader {
    frames: u64,
    #[serde(default)]
    start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    map: String,
    #[serde(default)]
    players: Vec<ScrepPlayer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ScrepPlayer {
    #[serde(rename = "ID")]
    id: u8,
    name: String,
    race: ScrepNamed,
    #[serde(default)]
    team: u8,
    #[serde(default)]
    observer: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ScrepNamed {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ScrepComputed {
    #[serde(default)]
    chat_cmds: Option<Vec<ScrepChat>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ScrepChat {
    frame: u64,
    #[serde(rename = "PlayerID")]
    player_id: u8,
    message: String,
}

impl ScrepReport {
    fn into_summary(self) -> ReplaySummary {
        let header = self.header;
        let players: Vec<ReplayPlayer> = header
            .players
            .into_iter()
            .map(|player| ReplayPlayer {
                id: player.id,
                name: player.name,
                race: player.race.name,
                team: player.team,
                is_observer: player.observer,
            })
            .collect();

        let chat = self
            .computed
            .and_then(|computed| computed.chat_cmds)
            .unwrap_or_default()
            .into_iter()
            .map(|line| ChatLine {
                time_ms: line.frame * FRAME_MS,
                player: players
                    .iter()
                    .find(|player| player.id == line.player_id)
                    .map(|player| player.name.clone())
                    .unwrap_or_else(|| format!("Player {}", line.player_id)),
                message: line.message,
            })
            .collect();

        ReplaySummary {
            title: strip_control_codes(&header.title),
            map_name: strip_control_codes(&header.map),
            duration_ms: header.frames * FRAME_MS,
            start_time: header.start_time,
            players,
            chat,
        }
    }
}

/// Removes StarCraft text color codes from a string.
fn strip_control_codes(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}
