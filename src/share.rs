use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, bail};
use copypasta::{ClipboardContext, ClipboardProvider};

use crate::game::GuessRecord;

pub const SHARE_TITLE: &str = "Football Player Guessing Game";
pub const MSG_COPIED: &str = "Result copied to clipboard!";
pub const MSG_COPY_FAILED: &str = "Could not copy result to clipboard";

const CORRECT_GLYPH: char = '🟩';
const WRONG_GLYPH: char = '🟥';

pub fn score_line(guesses: &[GuessRecord]) -> String {
    guesses
        .iter()
        .map(|g| if g.correct { CORRECT_GLYPH } else { WRONG_GLYPH })
        .collect()
}

pub fn share_text(date: &str, guesses: &[GuessRecord], countdown: &str) -> String {
    format!(
        "{SHARE_TITLE} {date}\n{}\nNext player in {countdown}!",
        score_line(guesses)
    )
}

/// Platform share capability. Absent or failing targets fall back to the clipboard.
pub trait ShareTarget {
    fn share(&mut self, title: &str, text: &str) -> Result<()>;
}

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    Copied,
    Failed(String),
}

impl ShareOutcome {
    /// A successful native share speaks for itself.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            ShareOutcome::Shared => None,
            ShareOutcome::Copied => Some(MSG_COPIED),
            ShareOutcome::Failed(_) => Some(MSG_COPY_FAILED),
        }
    }
}

pub fn deliver_share(
    text: &str,
    target: Option<&mut dyn ShareTarget>,
    clipboard: &mut dyn Clipboard,
) -> ShareOutcome {
    if let Some(target) = target
        && target.share(SHARE_TITLE, text).is_ok()
    {
        return ShareOutcome::Shared;
    }
    match clipboard.set_text(text) {
        Ok(()) => ShareOutcome::Copied,
        Err(err) => ShareOutcome::Failed(err.to_string()),
    }
}

/// Runs a user-configured command through the shell with the text on stdin.
pub struct CommandShare {
    command: String,
}

impl CommandShare {
    pub fn new(command: String) -> Self {
        Self { command }
    }
}

impl ShareTarget for CommandShare {
    fn share(&mut self, title: &str, text: &str) -> Result<()> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .env("SHARE_TITLE", title)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .context("spawn share command")?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .context("write share text")?;
        }
        let status = child.wait().context("wait for share command")?;
        if !status.success() {
            bail!("share command exited with {status}");
        }
        Ok(())
    }
}

pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        let mut ctx = ClipboardContext::new().map_err(|err| anyhow::anyhow!("{err}"))?;
        ctx.set_contents(text.to_string())
            .map_err(|err| anyhow::anyhow!("{err}"))
    }
}
