use std::collections::VecDeque;

use crate::api::{GameStateResponse, GuessResponse};
use crate::autocomplete::Autocomplete;
use crate::clock::format_countdown;
use crate::game::{GamePhase, GameSession};
use crate::persist::GameStore;
use crate::share::{self, ShareOutcome};

pub const MSG_LOAD_ERROR: &str = "Error loading game";
pub const MSG_GUESS_ERROR: &str = "Error submitting guess";

#[derive(Debug, Clone)]
pub enum Delta {
    GameStateLoaded(GameStateResponse),
    GameStateFailed(String),
    PlayerNamesLoaded(Vec<String>),
    PlayerNamesFailed(String),
    GuessEvaluated {
        guess: String,
        hint_level: u8,
        response: GuessResponse,
    },
    GuessFailed(String),
    ShareFinished(ShareOutcome),
    Tick,
    DailyReset,
    Log(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCommand {
    FetchGameState,
    FetchPlayerNames,
    SubmitGuess { guess: String, hint_level: u8 },
}

pub struct AppState {
    pub session: GameSession,
    pub autocomplete: Autocomplete,
    pub message: Option<String>,
    pub guess_in_flight: bool,
    pub share_in_flight: bool,
    pub reload_requested: bool,
    pub help_overlay: bool,
    pub logs: VecDeque<String>,
    store: Option<GameStore>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        let mut autocomplete = Autocomplete::new();
        autocomplete.set_disabled(true);
        Self {
            session: GameSession::new(),
            autocomplete,
            message: None,
            guess_in_flight: false,
            share_in_flight: false,
            reload_requested: false,
            help_overlay: false,
            logs: VecDeque::with_capacity(200),
            store: None,
        }
    }

    pub fn with_store(store: GameStore) -> Self {
        let mut state = Self::new();
        state.store = Some(store);
        state
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.session.phase, GamePhase::Loading)
    }

    pub fn countdown_text(&self) -> String {
        self.session
            .next_reset
            .map(format_countdown)
            .unwrap_or_default()
    }

    /// Marks the session as loading and returns the fetch to issue.
    pub fn begin_reload(&mut self) -> ProviderCommand {
        self.reload_requested = false;
        self.session.begin_loading();
        self.sync_input();
        ProviderCommand::FetchGameState
    }

    pub fn take_reload_request(&mut self) -> bool {
        std::mem::take(&mut self.reload_requested)
    }

    /// Validates the pending input and returns the request to send, or
    /// `None` when nothing should go out: blank text, game not active, or a
    /// guess already awaiting its verdict.
    pub fn begin_guess(&mut self) -> Option<ProviderCommand> {
        let guess = self.autocomplete.query().trim().to_string();
        if guess.is_empty() || self.guess_in_flight {
            return None;
        }
        let GamePhase::Active { hint_level } = self.session.phase else {
            return None;
        };
        self.guess_in_flight = true;
        self.sync_input();
        Some(ProviderCommand::SubmitGuess { guess, hint_level })
    }

    pub fn can_share(&self) -> bool {
        self.session.is_over()
    }

    pub fn share_text(&self) -> String {
        share::share_text(
            self.session.current_date.as_deref().unwrap_or_default(),
            &self.session.guesses,
            &self.countdown_text(),
        )
    }

    /// Returns the text to share, or `None` while the game is still running
    /// or another share has not reported back yet.
    pub fn begin_share(&mut self) -> Option<String> {
        if !self.can_share() || self.share_in_flight {
            return None;
        }
        self.share_in_flight = true;
        Some(self.share_text())
    }

    pub fn record_share(&mut self, outcome: ShareOutcome) {
        if let ShareOutcome::Failed(err) = &outcome {
            self.push_log(format!("[WARN] Clipboard error: {err}"));
        }
        if let Some(msg) = outcome.message() {
            self.message = Some(msg.to_string());
        }
    }

    fn sync_input(&mut self) {
        let enabled = self.session.phase.accepts_guesses() && !self.guess_in_flight;
        self.autocomplete.set_disabled(!enabled);
    }

    fn persist(&mut self) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        let Some(record) = self.session.to_record() else {
            return;
        };
        if let Err(err) = store.save(&record) {
            self.push_log(format!("[WARN] Could not save progress: {err:#}"));
        }
    }

    fn restore_from_store(&mut self) {
        let Some(record) = self.store.as_ref().and_then(|s| s.load()) else {
            return;
        };
        if self.session.restore(&record) {
            self.push_log(format!(
                "[INFO] Restored progress for {} ({} guesses)",
                record.date,
                self.session.guesses.len()
            ));
            self.persist();
        }
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::GameStateLoaded(data) => {
            let date = data.current_date.clone();
            let rollover = state.session.current_date.as_deref() != Some(date.as_str());
            state.session.apply_loaded(data);
            if rollover {
                state.message = None;
                state.guess_in_flight = false;
                state.autocomplete.clear();
                state.restore_from_store();
            }
            state.push_log(format!("[INFO] Puzzle loaded for {date}"));
        }
        Delta::GameStateFailed(err) => {
            state.session.load_failed();
            state.message = Some(MSG_LOAD_ERROR.to_string());
            state.push_log(format!("[WARN] Game state error: {err}"));
        }
        Delta::PlayerNamesLoaded(names) => {
            state.push_log(format!("[INFO] {} player names loaded", names.len()));
            state.autocomplete.set_candidates(names);
        }
        Delta::PlayerNamesFailed(err) => {
            state.push_log(format!("[WARN] Player names error: {err}"));
        }
        Delta::GuessEvaluated {
            guess,
            hint_level,
            response,
        } => {
            state.guess_in_flight = false;
            match state.session.apply_guess(guess, hint_level, response) {
                Some(outcome) => {
                    state.message = Some(outcome.message().to_string());
                    state.autocomplete.clear();
                    state.persist();
                }
                None => state.push_log("[INFO] Ignored guess verdict for a finished session"),
            }
        }
        Delta::GuessFailed(err) => {
            state.guess_in_flight = false;
            state.message = Some(MSG_GUESS_ERROR.to_string());
            state.push_log(format!("[WARN] Guess error: {err}"));
        }
        Delta::ShareFinished(outcome) => {
            state.share_in_flight = false;
            state.record_share(outcome);
        }
        Delta::Tick => state.session.tick(),
        Delta::DailyReset => {
            state.reload_requested = true;
            state.push_log("[INFO] Midnight reached, fetching the new puzzle");
        }
        Delta::Log(msg) => state.push_log(msg),
    }
    state.sync_input();
}
