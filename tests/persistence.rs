use std::fs;

use daily_guess_terminal::api::{GameStateResponse, GuessResponse};
use daily_guess_terminal::game::{GamePhase, GuessRecord};
use daily_guess_terminal::persist::{GameStore, StoredGame};
use daily_guess_terminal::state::{AppState, Delta, ProviderCommand, apply_delta};

fn puzzle(date: &str) -> GameStateResponse {
    GameStateResponse {
        blurred_image: "blurred-0".to_string(),
        game_id: Some("154".to_string()),
        next_reset: Some(600),
        current_date: date.to_string(),
    }
}

fn play(state: &mut AppState, text: &str, response: GuessResponse) {
    state.autocomplete.on_text_change(text);
    let Some(ProviderCommand::SubmitGuess { guess, hint_level }) = state.begin_guess() else {
        panic!("guess should be accepted");
    };
    apply_delta(
        state,
        Delta::GuessEvaluated {
            guess,
            hint_level,
            response,
        },
    );
}

fn wrong() -> GuessResponse {
    GuessResponse {
        correct: false,
        hint_image: Some("next".to_string()),
        hint_text: Some("Player's Club: Inter Miami".to_string()),
        ..GuessResponse::default()
    }
}

#[test]
fn store_round_trips_record() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = GameStore::new(dir.path().join("nested").join("progress.json"));
    let record = StoredGame {
        date: "2024-01-01".to_string(),
        guesses: vec![GuessRecord {
            guess: "Kane".to_string(),
            correct: false,
            hint_level: 0,
        }],
        hint_level: 1,
        game_over: false,
        player_name: None,
    };
    store.save(&record).expect("save");
    assert_eq!(store.load(), Some(record));
}

#[test]
fn record_uses_camel_case_fields() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = GameStore::new(dir.path().join("progress.json"));
    store
        .save(&StoredGame {
            date: "2024-01-01".to_string(),
            guesses: vec![GuessRecord {
                guess: "Messi".to_string(),
                correct: true,
                hint_level: 2,
            }],
            hint_level: 2,
            game_over: true,
            player_name: Some("Lionel Messi".to_string()),
        })
        .expect("save");

    let raw = fs::read_to_string(store.path()).expect("read");
    let json: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(json["date"], "2024-01-01");
    assert_eq!(json["hintLevel"], 2);
    assert_eq!(json["gameOver"], true);
    assert_eq!(json["playerName"], "Lionel Messi");
    assert_eq!(json["guesses"][0]["hintLevel"], 2);
    assert_eq!(json["guesses"][0]["correct"], true);
}

#[test]
fn missing_or_corrupt_file_loads_nothing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = GameStore::new(dir.path().join("progress.json"));
    assert!(store.load().is_none());
    fs::write(store.path(), "{not json").expect("write");
    assert!(store.load().is_none());
}

#[test]
fn same_day_progress_survives_restart() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("progress.json");

    let mut first = AppState::with_store(GameStore::new(&path));
    apply_delta(&mut first, Delta::GameStateLoaded(puzzle("2024-01-01")));
    play(&mut first, "Kane", wrong());
    play(&mut first, "Salah", wrong());
    play(
        &mut first,
        "Lionel Messi",
        GuessResponse {
            correct: true,
            image_url: Some("https://img.example/154.png".to_string()),
            player_name: Some("Lionel Messi".to_string()),
            ..GuessResponse::default()
        },
    );

    let mut second = AppState::with_store(GameStore::new(&path));
    apply_delta(&mut second, Delta::GameStateLoaded(puzzle("2024-01-01")));

    assert_eq!(second.session.guesses, first.session.guesses);
    assert_eq!(second.session.hint_level(), 2);
    assert_eq!(second.session.phase, GamePhase::Won { hint_level: 2 });
    assert_eq!(second.session.player_name.as_deref(), Some("Lionel Messi"));
    assert!(second.autocomplete.is_disabled());
}

#[test]
fn in_progress_game_restores_hint_level() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("progress.json");

    let mut first = AppState::with_store(GameStore::new(&path));
    apply_delta(&mut first, Delta::GameStateLoaded(puzzle("2024-01-01")));
    play(&mut first, "Kane", wrong());

    let mut second = AppState::with_store(GameStore::new(&path));
    apply_delta(&mut second, Delta::GameStateLoaded(puzzle("2024-01-01")));
    assert_eq!(second.session.phase, GamePhase::Active { hint_level: 1 });
    assert!(second.session.player_name.is_none());
    assert!(!second.autocomplete.is_disabled());
}

#[test]
fn record_from_another_day_is_ignored() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("progress.json");

    let mut first = AppState::with_store(GameStore::new(&path));
    apply_delta(&mut first, Delta::GameStateLoaded(puzzle("2024-01-01")));
    play(&mut first, "Kane", wrong());

    let mut second = AppState::with_store(GameStore::new(&path));
    apply_delta(&mut second, Delta::GameStateLoaded(puzzle("2024-01-02")));
    assert!(second.session.guesses.is_empty());
    assert_eq!(second.session.phase, GamePhase::Active { hint_level: 0 });
    assert!(second.session.player_name.is_none());
    assert!(second.message.is_none());
}

#[test]
fn every_guess_is_written_through() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = GameStore::new(dir.path().join("progress.json"));
    let mut state = AppState::with_store(store.clone());
    apply_delta(&mut state, Delta::GameStateLoaded(puzzle("2024-01-01")));

    play(&mut state, "Kane", wrong());
    let saved = store.load().expect("saved after first guess");
    assert_eq!(saved.guesses.len(), 1);
    assert_eq!(saved.hint_level, 1);
    assert!(!saved.game_over);

    play(&mut state, "Salah", wrong());
    let saved = store.load().expect("saved after second guess");
    assert_eq!(saved.guesses.len(), 2);
    assert_eq!(saved.hint_level, 2);
}

#[test]
fn failed_guess_is_not_persisted() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = GameStore::new(dir.path().join("progress.json"));
    let mut state = AppState::with_store(store.clone());
    apply_delta(&mut state, Delta::GameStateLoaded(puzzle("2024-01-01")));

    state.autocomplete.on_text_change("Kane");
    assert!(state.begin_guess().is_some());
    apply_delta(&mut state, Delta::GuessFailed("offline".to_string()));
    assert!(store.load().is_none());
}
