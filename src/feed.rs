use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::api::GameApi;
use crate::share::{Clipboard, ShareTarget, deliver_share};
use crate::state::{Delta, ProviderCommand};

/// Runs API calls off the UI thread. Commands are handled one at a time in
/// arrival order; the thread ends once every command sender is gone.
pub fn spawn_provider<A>(
    api: A,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()>
where
    A: GameApi + Send + 'static,
{
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            let delta = handle_command(&api, cmd);
            if tx.send(delta).is_err() {
                break;
            }
        }
    })
}

pub fn handle_command(api: &impl GameApi, cmd: ProviderCommand) -> Delta {
    match cmd {
        ProviderCommand::FetchGameState => match api.fetch_game_state() {
            Ok(data) => Delta::GameStateLoaded(data),
            Err(err) => Delta::GameStateFailed(format!("{err:#}")),
        },
        ProviderCommand::FetchPlayerNames => match api.fetch_player_names() {
            Ok(names) => Delta::PlayerNamesLoaded(names),
            Err(err) => Delta::PlayerNamesFailed(format!("{err:#}")),
        },
        ProviderCommand::SubmitGuess { guess, hint_level } => {
            match api.submit_guess(&guess, hint_level) {
                Ok(response) => Delta::GuessEvaluated {
                    guess,
                    hint_level,
                    response,
                },
                Err(err) => Delta::GuessFailed(format!("{err:#}")),
            }
        }
    }
}

/// Delivers a share on its own thread; a share command may wait on the user
/// for as long as it likes. The outcome comes back as `Delta::ShareFinished`.
pub fn spawn_share(
    text: String,
    mut target: Option<Box<dyn ShareTarget + Send>>,
    mut clipboard: Box<dyn Clipboard + Send>,
    tx: Sender<Delta>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let target = target
            .as_deref_mut()
            .map(|t| t as &mut dyn ShareTarget);
        let outcome = deliver_share(&text, target, &mut *clipboard);
        let _ = tx.send(Delta::ShareFinished(outcome));
    })
}
