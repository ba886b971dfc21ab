use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::Config;
use crate::http_client::http_client;

const GAME_STATE_PATH: &str = "/api/game-state";
const PLAYER_NAMES_PATH: &str = "/api/player-names";
const GUESS_PATH: &str = "/api/guess";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GameStateResponse {
    #[serde(default)]
    pub blurred_image: String,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub game_id: Option<String>,
    #[serde(default)]
    pub next_reset: Option<u64>,
    pub current_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GuessResponse {
    pub correct: bool,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub hint_image: Option<String>,
    #[serde(default)]
    pub hint_text: Option<String>,
    #[serde(default)]
    pub player_name: Option<String>,
    #[serde(default)]
    pub next_reset: Option<u64>,
}

#[derive(Debug, Serialize)]
struct GuessRequest<'a> {
    guess: &'a str,
    hint_level: u8,
}

/// The three calls the game client makes against the puzzle server.
pub trait GameApi {
    fn fetch_game_state(&self) -> Result<GameStateResponse>;
    fn fetch_player_names(&self) -> Result<Vec<String>>;
    fn submit_guess(&self, guess: &str, hint_level: u8) -> Result<GuessResponse>;
}

pub struct HttpGameApi {
    client: &'static Client,
    config: Config,
}

impl HttpGameApi {
    pub fn new(config: Config) -> Result<Self> {
        let client = http_client(config.request_timeout)?;
        Ok(Self { client, config })
    }

    fn get_text(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()?;
        let status = resp.status();
        let body = resp.text().context("failed reading body")?;
        success_body(status, body)
    }
}

impl GameApi for HttpGameApi {
    fn fetch_game_state(&self) -> Result<GameStateResponse> {
        let url = self.config.endpoint(GAME_STATE_PATH);
        let body = self.get_text(&url).context("game state request failed")?;
        parse_game_state_json(&body)
    }

    fn fetch_player_names(&self) -> Result<Vec<String>> {
        let url = self.config.endpoint(PLAYER_NAMES_PATH);
        let body = self.get_text(&url).context("player names request failed")?;
        parse_player_names_json(&body)
    }

    fn submit_guess(&self, guess: &str, hint_level: u8) -> Result<GuessResponse> {
        let url = self.config.endpoint(GUESS_PATH);
        let resp = self
            .client
            .post(&url)
            .json(&GuessRequest {
                guess: guess.trim(),
                hint_level,
            })
            .send()
            .context("guess request failed")?;
        let status = resp.status();
        let body = resp.text().context("failed reading body")?;
        parse_guess_response_json(&success_body(status, body)?)
    }
}

/// Non-2xx answers are errors carrying the body, whatever it parses as.
fn success_body(status: StatusCode, body: String) -> Result<String> {
    if !status.is_success() {
        return Err(anyhow::anyhow!("http {}: {}", status, body));
    }
    Ok(body)
}

pub fn parse_game_state_json(raw: &str) -> Result<GameStateResponse> {
    serde_json::from_str(raw.trim()).context("invalid game-state json")
}

pub fn parse_guess_response_json(raw: &str) -> Result<GuessResponse> {
    serde_json::from_str(raw.trim()).context("invalid guess json")
}

/// `null` and an empty body both mean "no names yet".
pub fn parse_player_names_json(raw: &str) -> Result<Vec<String>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    serde_json::from_str(trimmed).context("invalid player-names json")
}

fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
