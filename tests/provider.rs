use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use daily_guess_terminal::api::{GameApi, GameStateResponse, GuessResponse};
use daily_guess_terminal::clock::spawn_timers;
use daily_guess_terminal::feed::{handle_command, spawn_provider, spawn_share};
use daily_guess_terminal::share::{Clipboard, ShareOutcome, ShareTarget};
use daily_guess_terminal::state::{Delta, ProviderCommand};

#[derive(Clone, Default)]
struct FakeApi {
    offline: bool,
    submitted: Arc<Mutex<Vec<(String, u8)>>>,
}

impl GameApi for FakeApi {
    fn fetch_game_state(&self) -> Result<GameStateResponse> {
        if self.offline {
            bail!("connection refused");
        }
        Ok(GameStateResponse {
            blurred_image: "blurred".to_string(),
            game_id: Some("1".to_string()),
            next_reset: Some(60),
            current_date: "2024-01-01".to_string(),
        })
    }

    fn fetch_player_names(&self) -> Result<Vec<String>> {
        if self.offline {
            bail!("connection refused");
        }
        Ok(vec!["Lionel Messi".to_string()])
    }

    fn submit_guess(&self, guess: &str, hint_level: u8) -> Result<GuessResponse> {
        if self.offline {
            bail!("connection refused");
        }
        self.submitted
            .lock()
            .expect("submitted lock")
            .push((guess.to_string(), hint_level));
        Ok(GuessResponse {
            correct: guess == "Lionel Messi",
            ..GuessResponse::default()
        })
    }
}

#[test]
fn commands_map_to_deltas() {
    let api = FakeApi::default();
    assert!(matches!(
        handle_command(&api, ProviderCommand::FetchGameState),
        Delta::GameStateLoaded(ref s) if s.current_date == "2024-01-01"
    ));
    assert!(matches!(
        handle_command(&api, ProviderCommand::FetchPlayerNames),
        Delta::PlayerNamesLoaded(ref names) if names.len() == 1
    ));
    let delta = handle_command(
        &api,
        ProviderCommand::SubmitGuess {
            guess: "Lionel Messi".to_string(),
            hint_level: 3,
        },
    );
    match delta {
        Delta::GuessEvaluated {
            guess,
            hint_level,
            response,
        } => {
            assert_eq!(guess, "Lionel Messi");
            assert_eq!(hint_level, 3);
            assert!(response.correct);
        }
        other => panic!("unexpected delta {other:?}"),
    }
}

#[test]
fn failures_map_to_failure_deltas() {
    let api = FakeApi {
        offline: true,
        ..FakeApi::default()
    };
    assert!(matches!(
        handle_command(&api, ProviderCommand::FetchGameState),
        Delta::GameStateFailed(_)
    ));
    assert!(matches!(
        handle_command(&api, ProviderCommand::FetchPlayerNames),
        Delta::PlayerNamesFailed(_)
    ));
    assert!(matches!(
        handle_command(
            &api,
            ProviderCommand::SubmitGuess {
                guess: "x".to_string(),
                hint_level: 0,
            }
        ),
        Delta::GuessFailed(_)
    ));
}

#[test]
fn provider_thread_processes_in_order_and_exits() {
    let api = FakeApi::default();
    let submitted = api.submitted.clone();
    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let handle = spawn_provider(api, tx, cmd_rx);

    for (i, name) in ["A", "B", "C"].iter().enumerate() {
        cmd_tx
            .send(ProviderCommand::SubmitGuess {
                guess: name.to_string(),
                hint_level: i as u8,
            })
            .expect("send");
    }
    drop(cmd_tx);
    handle.join().expect("provider thread");

    let order: Vec<String> = rx
        .try_iter()
        .filter_map(|delta| match delta {
            Delta::GuessEvaluated { guess, .. } => Some(guess),
            _ => None,
        })
        .collect();
    assert_eq!(order, vec!["A", "B", "C"]);
    assert_eq!(submitted.lock().expect("submitted lock").len(), 3);
}

#[test]
fn timers_tick_and_go_quiet_after_drop() {
    let (tx, rx) = mpsc::channel();
    let timers = spawn_timers(tx);

    let first = rx
        .recv_timeout(Duration::from_secs(3))
        .expect("a tick within three seconds");
    assert!(matches!(first, Delta::Tick));

    drop(timers);
    // Anything already queued is fine; nothing new may arrive.
    while rx.try_recv().is_ok() {}
    assert!(matches!(
        rx.recv_timeout(Duration::from_millis(1500)),
        Err(mpsc::RecvTimeoutError::Disconnected)
    ));
}

struct SlowTarget(Duration);

impl ShareTarget for SlowTarget {
    fn share(&mut self, _title: &str, _text: &str) -> Result<()> {
        thread::sleep(self.0);
        bail!("share dismissed")
    }
}

#[derive(Clone, Default)]
struct MemoryClipboard(Arc<Mutex<Option<String>>>);

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        *self.0.lock().expect("clipboard lock") = Some(text.to_string());
        Ok(())
    }
}

#[test]
fn share_runs_off_the_caller_thread() {
    let (tx, rx) = mpsc::channel();
    let clipboard = MemoryClipboard::default();

    let started = Instant::now();
    let join = spawn_share(
        "result".to_string(),
        Some(Box::new(SlowTarget(Duration::from_millis(800)))),
        Box::new(clipboard.clone()),
        tx,
    );
    assert!(started.elapsed() < Duration::from_millis(400));
    assert!(rx.try_recv().is_err());

    let delta = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("share outcome");
    assert!(matches!(delta, Delta::ShareFinished(ShareOutcome::Copied)));
    assert_eq!(
        clipboard.0.lock().expect("clipboard lock").as_deref(),
        Some("result")
    );
    join.join().expect("share thread");
}
