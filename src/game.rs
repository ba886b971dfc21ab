use serde::{Deserialize, Serialize};

use crate::api::{GameStateResponse, GuessResponse};
use crate::persist::StoredGame;

pub const MAX_HINT_LEVEL: u8 = 4;
pub const MAX_GUESSES: usize = MAX_HINT_LEVEL as usize + 1;

pub const MSG_CORRECT: &str = "Congratulations! You got it right!";
pub const MSG_GAME_OVER: &str = "Game Over! Try again tomorrow!";
pub const MSG_WRONG: &str = "Wrong guess! Here's your next hint:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Loading,
    /// Initial load failed; only a reload gets out of here.
    Unavailable,
    Active { hint_level: u8 },
    Won { hint_level: u8 },
    Lost,
}

impl GamePhase {
    pub fn hint_level(self) -> u8 {
        match self {
            GamePhase::Loading | GamePhase::Unavailable => 0,
            GamePhase::Active { hint_level } | GamePhase::Won { hint_level } => hint_level,
            GamePhase::Lost => MAX_HINT_LEVEL,
        }
    }

    pub fn is_over(self) -> bool {
        matches!(self, GamePhase::Won { .. } | GamePhase::Lost)
    }

    pub fn accepts_guesses(self) -> bool {
        matches!(self, GamePhase::Active { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessRecord {
    pub guess: String,
    pub correct: bool,
    pub hint_level: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    Correct,
    Exhausted,
    NextHint,
}

impl GuessOutcome {
    pub fn message(self) -> &'static str {
        match self {
            GuessOutcome::Correct => MSG_CORRECT,
            GuessOutcome::Exhausted => MSG_GAME_OVER,
            GuessOutcome::NextHint => MSG_WRONG,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    pub phase: GamePhase,
    pub current_image: String,
    pub hint_text: Option<String>,
    pub guesses: Vec<GuessRecord>,
    pub game_id: Option<String>,
    pub current_date: Option<String>,
    pub player_name: Option<String>,
    pub next_reset: Option<u64>,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            phase: GamePhase::Loading,
            current_image: String::new(),
            hint_text: None,
            guesses: Vec::with_capacity(MAX_GUESSES),
            game_id: None,
            current_date: None,
            player_name: None,
            next_reset: None,
        }
    }

    pub fn hint_level(&self) -> u8 {
        self.phase.hint_level()
    }

    pub fn is_over(&self) -> bool {
        self.phase.is_over()
    }

    pub fn begin_loading(&mut self) {
        if !self.is_over() && !matches!(self.phase, GamePhase::Active { .. }) {
            self.phase = GamePhase::Loading;
        }
    }

    pub fn load_failed(&mut self) {
        if matches!(self.phase, GamePhase::Loading) {
            self.phase = GamePhase::Unavailable;
        }
    }

    /// Applies a fresh puzzle fetch. A different day starts from scratch;
    /// the same day keeps whatever progress is already in memory.
    pub fn apply_loaded(&mut self, data: GameStateResponse) {
        let same_day = self.current_date.as_deref() == Some(data.current_date.as_str());
        if !same_day {
            *self = GameSession::new();
        }
        if !same_day || self.guesses.is_empty() {
            self.current_image = data.blurred_image;
        }
        self.game_id = data.game_id;
        self.next_reset = data.next_reset;
        self.current_date = Some(data.current_date);
        if matches!(self.phase, GamePhase::Loading | GamePhase::Unavailable) {
            self.phase = GamePhase::Active { hint_level: 0 };
        }
    }

    /// Restores same-day progress. Returns false when the record belongs to
    /// another day (stale, ignored).
    pub fn restore(&mut self, record: &StoredGame) -> bool {
        if self.current_date.as_deref() != Some(record.date.as_str()) {
            return false;
        }

        let mut guesses = record.guesses.clone();
        guesses.truncate(MAX_GUESSES);
        let hint_level = record.hint_level.min(MAX_HINT_LEVEL);

        self.phase = if guesses.iter().any(|g| g.correct) {
            GamePhase::Won { hint_level }
        } else if record.game_over || guesses.len() >= MAX_GUESSES {
            GamePhase::Lost
        } else {
            GamePhase::Active { hint_level }
        };
        self.guesses = guesses;
        self.player_name = if self.is_over() {
            record.player_name.clone()
        } else {
            None
        };
        true
    }

    /// Applies the server verdict for a guess made at `hint_level`.
    /// Returns `None` when the session no longer accepts guesses (the
    /// response arrived after the game ended or the day rolled over).
    pub fn apply_guess(
        &mut self,
        guess: String,
        hint_level: u8,
        resp: GuessResponse,
    ) -> Option<GuessOutcome> {
        let GamePhase::Active { hint_level: current } = self.phase else {
            return None;
        };
        if current != hint_level || self.guesses.len() >= MAX_GUESSES {
            return None;
        }

        self.guesses.push(GuessRecord {
            guess,
            correct: resp.correct,
            hint_level,
        });
        if let Some(next_reset) = resp.next_reset {
            self.next_reset = Some(next_reset);
        }

        let outcome = if resp.correct {
            self.phase = GamePhase::Won { hint_level };
            GuessOutcome::Correct
        } else if hint_level >= MAX_HINT_LEVEL {
            self.phase = GamePhase::Lost;
            GuessOutcome::Exhausted
        } else {
            self.phase = GamePhase::Active {
                hint_level: hint_level + 1,
            };
            GuessOutcome::NextHint
        };

        match outcome {
            GuessOutcome::Correct | GuessOutcome::Exhausted => {
                if let Some(url) = resp.image_url {
                    self.current_image = url;
                }
                self.player_name = resp.player_name;
            }
            GuessOutcome::NextHint => {
                if let Some(image) = resp.hint_image.or(resp.image_url) {
                    self.current_image = image;
                }
                self.hint_text = resp.hint_text;
            }
        }
        Some(outcome)
    }

    /// One second of countdown. Stops at zero.
    pub fn tick(&mut self) {
        if let Some(secs) = self.next_reset.as_mut() {
            *secs = secs.saturating_sub(1);
        }
    }

    pub fn to_record(&self) -> Option<StoredGame> {
        let date = self.current_date.clone()?;
        Some(StoredGame {
            date,
            guesses: self.guesses.clone(),
            hint_level: self.hint_level(),
            game_over: self.is_over(),
            player_name: self.player_name.clone(),
        })
    }
}
