use std::env;
use std::path::PathBuf;
use std::time::Duration;

const APP_DIR: &str = "daily_guess_terminal";
const DEFAULT_API_BASE: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub request_timeout: Duration,
    pub state_path: Option<PathBuf>,
    pub share_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            state_path: None,
            share_command: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let api_base = env::var("GUESS_API_BASE")
            .ok()
            .and_then(|val| non_empty(&val))
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let timeout_secs = env::var("GUESS_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(1, 120);
        let state_path = env::var("GUESS_STATE_PATH")
            .ok()
            .and_then(|val| non_empty(&val))
            .map(PathBuf::from);
        let share_command = env::var("GUESS_SHARE_CMD")
            .ok()
            .and_then(|val| non_empty(&val));

        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(timeout_secs),
            state_path,
            share_command,
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    /// Progress file, honoring `GUESS_STATE_PATH` before the cache directory.
    pub fn resolved_state_path(&self) -> Option<PathBuf> {
        self.state_path
            .clone()
            .or_else(|| app_dir().map(|dir| dir.join(crate::persist::STORAGE_FILE)))
    }
}

pub fn app_dir() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Ok(base) = env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(APP_DIR));
        }
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(APP_DIR))
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let config = Config {
            api_base: "http://example.test".to_string(),
            ..Config::default()
        };
        assert_eq!(
            config.endpoint("/api/game-state"),
            "http://example.test/api/game-state"
        );
        assert_eq!(
            config.endpoint("api/guess"),
            "http://example.test/api/guess"
        );
    }

    #[test]
    fn explicit_state_path_wins() {
        let config = Config {
            state_path: Some(PathBuf::from("/tmp/progress.json")),
            ..Config::default()
        };
        assert_eq!(
            config.resolved_state_path(),
            Some(PathBuf::from("/tmp/progress.json"))
        );
    }
}
