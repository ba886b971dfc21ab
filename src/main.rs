use std::io;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use daily_guess_terminal::api::HttpGameApi;
use daily_guess_terminal::autocomplete::{KeyOutcome, NavKey};
use daily_guess_terminal::clock::spawn_timers;
use daily_guess_terminal::config::Config;
use daily_guess_terminal::feed::{spawn_provider, spawn_share};
use daily_guess_terminal::game::{GamePhase, MAX_HINT_LEVEL};
use daily_guess_terminal::image_ref::describe_image;
use daily_guess_terminal::persist::GameStore;
use daily_guess_terminal::share::{CommandShare, ShareTarget, SystemClipboard};
use daily_guess_terminal::state::{AppState, Delta, ProviderCommand, apply_delta};

const MAX_SUGGESTION_ROWS: usize = 8;

#[derive(Debug, Clone, Copy, Default)]
struct HitAreas {
    input: Rect,
    suggestions: Option<Rect>,
    suggestion_start: usize,
}

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    delta_tx: mpsc::Sender<Delta>,
    share_command: Option<String>,
    hit: HitAreas,
}

impl App {
    fn new(
        config: &Config,
        cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
        delta_tx: mpsc::Sender<Delta>,
    ) -> Self {
        let state = match config.resolved_state_path() {
            Some(path) => AppState::with_store(GameStore::new(path)),
            None => {
                let mut state = AppState::new();
                state.push_log("[WARN] No cache directory, progress will not be saved");
                state
            }
        };
        Self {
            state,
            should_quit: false,
            cmd_tx,
            delta_tx,
            share_command: config.share_command.clone(),
            hit: HitAreas::default(),
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if self.state.help_overlay {
            if matches!(key.code, KeyCode::F(1) | KeyCode::Esc | KeyCode::Enter) {
                self.state.help_overlay = false;
            }
            return;
        }

        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => self.should_quit = true,
            KeyCode::Char('s') if ctrl => self.share(),
            KeyCode::Char('r') if ctrl => self.reload(),
            KeyCode::F(1) => self.state.help_overlay = true,
            KeyCode::Down => {
                self.state.autocomplete.on_key(NavKey::Down);
            }
            KeyCode::Up => {
                self.state.autocomplete.on_key(NavKey::Up);
            }
            KeyCode::Esc => {
                self.state.autocomplete.on_key(NavKey::Escape);
            }
            KeyCode::Enter => {
                if self.state.autocomplete.on_key(NavKey::Enter) == KeyOutcome::Ignored {
                    self.submit_guess();
                }
            }
            KeyCode::Backspace => {
                self.state.autocomplete.pop_char();
            }
            KeyCode::Char(ch) if !ctrl => {
                self.state.autocomplete.push_char(ch);
            }
            _ => {}
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent) {
        if !matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) {
            return;
        }
        let (col, row) = (mouse.column, mouse.row);
        if let Some(list) = self.hit.suggestions
            && hit(list, col, row)
        {
            // Clicks on the border select nothing.
            if let Some(offset) = suggestion_row(list, col, row) {
                let idx = self.hit.suggestion_start + offset;
                self.state.autocomplete.select_visible(idx);
            }
            return;
        }
        if hit(self.hit.input, col, row) {
            self.state.autocomplete.focus();
        } else {
            self.state.autocomplete.on_outside_interaction();
        }
    }

    fn submit_guess(&mut self) {
        let Some(cmd) = self.state.begin_guess() else {
            return;
        };
        if !self.send(cmd) {
            apply_delta(
                &mut self.state,
                Delta::GuessFailed("provider unavailable".to_string()),
            );
        }
    }

    fn reload(&mut self) {
        let cmd = self.state.begin_reload();
        if !self.send(cmd) {
            apply_delta(
                &mut self.state,
                Delta::GameStateFailed("provider unavailable".to_string()),
            );
            return;
        }
        if self.state.autocomplete.candidates().is_empty() {
            self.send(ProviderCommand::FetchPlayerNames);
        }
    }

    fn share(&mut self) {
        let Some(text) = self.state.begin_share() else {
            return;
        };
        let target = self
            .share_command
            .clone()
            .map(|cmd| Box::new(CommandShare::new(cmd)) as Box<dyn ShareTarget + Send>);
        spawn_share(text, target, Box::new(SystemClipboard), self.delta_tx.clone());
    }

    fn send(&mut self, cmd: ProviderCommand) -> bool {
        let Some(tx) = &self.cmd_tx else {
            return false;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Provider request failed");
            return false;
        }
        true
    }
}

fn hit(area: Rect, col: u16, row: u16) -> bool {
    col >= area.x && col < area.x + area.width && row >= area.y && row < area.y + area.height
}

/// Offset of the suggestion row under the pointer, inside the list borders.
fn suggestion_row(list: Rect, col: u16, row: u16) -> Option<usize> {
    let inner = Rect {
        x: list.x + 1,
        y: list.y + 1,
        width: list.width.saturating_sub(2),
        height: list.height.saturating_sub(2),
    };
    hit(inner, col, row).then(|| (row - inner.y) as usize)
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = Config::from_env();
    let api = match HttpGameApi::new(config.clone()) {
        Ok(api) => api,
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    };

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(api, tx.clone(), cmd_rx);

    let mut app = App::new(&config, Some(cmd_tx), tx.clone());
    app.reload();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut timers = spawn_timers(tx);
    let res = run_app(&mut terminal, &mut app, rx);
    let timers_res = timers.stop();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    if let Err(err) = timers_res {
        eprintln!("error: {err:#}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let poll_rate = Duration::from_millis(100);

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }
        if app.state.take_reload_request() {
            app.reload();
        }

        let mut hit = HitAreas::default();
        terminal.draw(|f| hit = ui(f, &app.state))?;
        app.hit = hit;

        if event::poll(poll_rate)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.on_key(key),
                Event::Mouse(mouse) => app.on_mouse(mouse),
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, state: &AppState) -> HitAreas {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(6),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(state))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let puzzle = Paragraph::new(puzzle_text(state))
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Player").borders(Borders::ALL));
    frame.render_widget(puzzle, chunks[1]);

    let message_style = if state.session.is_over() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let message = Paragraph::new(state.message.clone().unwrap_or_default())
        .style(message_style)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(message, chunks[2]);

    render_input(frame, chunks[3], state);
    render_guesses(frame, chunks[4], state);

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[5]);

    let footer = Paragraph::new(footer_text(state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[6]);

    let mut hit = HitAreas {
        input: chunks[3],
        suggestions: None,
        suggestion_start: 0,
    };
    if state.autocomplete.shows_suggestions()
        && let Some((area, start)) = render_suggestions(frame, chunks[3], state)
    {
        hit.suggestions = Some(area);
        hit.suggestion_start = start;
    }

    if state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
    hit
}

fn header_text(state: &AppState) -> String {
    let countdown = state.countdown_text();
    if countdown.is_empty() {
        "Guess the Football Player".to_string()
    } else {
        format!("Guess the Football Player | Next player in: {countdown}")
    }
}

fn puzzle_text(state: &AppState) -> String {
    let session = &state.session;
    match session.phase {
        GamePhase::Loading => return "Loading today's player...".to_string(),
        GamePhase::Unavailable => return "No puzzle loaded. Ctrl+R to retry.".to_string(),
        _ => {}
    }

    let mut lines = vec![
        describe_image(&session.current_image),
        format!("Hint level: {}/{}", session.hint_level(), MAX_HINT_LEVEL),
    ];
    if let Some(hint) = session.hint_text.as_deref() {
        lines.push(hint.to_string());
    }
    if session.is_over()
        && let Some(name) = session.player_name.as_deref()
    {
        lines.push(String::new());
        lines.push(format!("The player was: {name}"));
    }
    lines.join("\n")
}

fn render_input(frame: &mut Frame, area: Rect, state: &AppState) {
    let input = &state.autocomplete;
    let (text, style) = if input.query().is_empty() {
        (
            "Enter player's name".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (input.query().to_string(), Style::default())
    };
    let title = if state.guess_in_flight {
        "Guess (checking...)"
    } else {
        "Guess"
    };
    let block_style = if input.is_disabled() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };
    let paragraph = Paragraph::new(text)
        .style(style)
        .block(Block::default().title(title).borders(Borders::ALL).style(block_style));
    frame.render_widget(paragraph, area);
}

/// Draws the dropdown under the input. `None` when there is no room for a row.
fn render_suggestions(frame: &mut Frame, input: Rect, state: &AppState) -> Option<(Rect, usize)> {
    let matches = state.autocomplete.visible_matches();
    let rows = matches.len().min(MAX_SUGGESTION_ROWS);
    let below = frame.size().height.saturating_sub(input.y + input.height);
    let height = (rows as u16 + 2).min(below);
    let area = Rect {
        x: input.x,
        y: input.y + input.height,
        width: input.width,
        height,
    };
    if height <= 2 {
        return None;
    }

    let visible = (height - 2) as usize;
    let selected = state.autocomplete.highlighted().unwrap_or(0);
    let (start, end) = visible_range(selected, matches.len(), visible);
    let lines: Vec<Line> = (start..end)
        .map(|idx| {
            if Some(idx) == state.autocomplete.highlighted() {
                Line::styled(
                    format!("> {}", matches[idx]),
                    Style::default().fg(Color::White).bg(Color::DarkGray),
                )
            } else {
                Line::raw(format!("  {}", matches[idx]))
            }
        })
        .collect();

    frame.render_widget(Clear, area);
    let list = Paragraph::new(lines).block(
        Block::default()
            .title(format!("{} matches", matches.len()))
            .borders(Borders::ALL),
    );
    frame.render_widget(list, area);
    Some((area, start))
}

fn render_guesses(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut spans = Vec::new();
    for guess in &state.session.guesses {
        let color = if guess.correct { Color::Green } else { Color::Red };
        spans.push(Span::styled("  ", Style::default().bg(color)));
        spans.push(Span::raw(format!(" {}  ", guess.guess)));
    }
    if spans.is_empty() {
        spans.push(Span::styled(
            "No guesses yet",
            Style::default().fg(Color::DarkGray),
        ));
    }
    let paragraph = Paragraph::new(Line::from(spans))
        .block(Block::default().title("Guesses").borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn footer_text(state: &AppState) -> String {
    if state.session.is_over() {
        "Ctrl+S Share | Ctrl+R Reload | F1 How to play | Ctrl+Q Quit".to_string()
    } else {
        "Type to search | ↑/↓ Suggestions | Enter Pick/Guess | Esc Close | F1 How to play | Ctrl+Q Quit"
            .to_string()
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(70, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Objective",
        "  Guess the football player from the blurred image.",
        "  You have 5 attempts to identify the player.",
        "",
        "Hints (one per wrong guess)",
        "  Player's country, a less blurred image,",
        "  the player's current club, a clearer image.",
        "",
        "Daily challenge",
        "  A new player every day at midnight.",
        "",
        "Scoring",
        "  🟩 Correct guess   🟥 Incorrect guess",
        "  Ctrl+S shares your result once the game is over.",
        "",
        "F1 / Esc / Enter  Let's play!",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("How to Play").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
