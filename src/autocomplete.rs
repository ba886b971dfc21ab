//! Free-text player-name input with a live suggestion list.
//!
//! Matches are never stored: they are re-derived from the candidate list and
//! the current query on every read, so they cannot drift out of sync.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Down,
    Up,
    Enter,
    Escape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Nothing happened (disabled, or Enter without a highlighted option).
    Ignored,
    Moved,
    Committed(String),
    Dismissed,
}

#[derive(Debug, Clone, Default)]
pub struct Autocomplete {
    candidates: Vec<String>,
    query: String,
    open: bool,
    highlighted: Option<usize>,
    disabled: bool,
}

/// Case-insensitive substring filter, candidate order preserved.
/// An empty query matches everything.
pub fn filter_candidates<'a>(candidates: &'a [String], query: &str) -> Vec<&'a str> {
    if query.is_empty() {
        return candidates.iter().map(String::as_str).collect();
    }
    let needle = query.to_lowercase();
    candidates
        .iter()
        .filter(|c| c.to_lowercase().contains(&needle))
        .map(String::as_str)
        .collect()
}

impl Autocomplete {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_candidates(&mut self, candidates: Vec<String>) {
        self.candidates = candidates;
        self.highlighted = None;
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Disabling also closes the list.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        if disabled {
            self.close();
        }
    }

    pub fn visible_matches(&self) -> Vec<&str> {
        filter_candidates(&self.candidates, &self.query)
    }

    /// Whether the dropdown should actually be drawn.
    pub fn shows_suggestions(&self) -> bool {
        self.open && !self.disabled && !self.visible_matches().is_empty()
    }

    /// Returns false when the edit was rejected.
    pub fn on_text_change(&mut self, text: impl Into<String>) -> bool {
        if self.disabled {
            return false;
        }
        self.query = text.into();
        self.open = true;
        self.highlighted = None;
        true
    }

    pub fn push_char(&mut self, ch: char) -> bool {
        if self.disabled {
            return false;
        }
        let mut text = self.query.clone();
        text.push(ch);
        self.on_text_change(text)
    }

    pub fn pop_char(&mut self) -> bool {
        if self.disabled {
            return false;
        }
        let mut text = self.query.clone();
        text.pop();
        self.on_text_change(text)
    }

    pub fn focus(&mut self) {
        if !self.disabled {
            self.open = true;
        }
    }

    pub fn on_key(&mut self, key: NavKey) -> KeyOutcome {
        if self.disabled {
            return KeyOutcome::Ignored;
        }
        match key {
            NavKey::Down => {
                self.open = true;
                let len = self.visible_matches().len();
                if len > 0 {
                    self.highlighted = Some(match self.highlighted {
                        None => 0,
                        Some(idx) => (idx + 1).min(len - 1),
                    });
                }
                KeyOutcome::Moved
            }
            NavKey::Up => {
                // Never returns to "no highlight" once something is highlighted.
                if let Some(idx) = self.highlighted {
                    self.highlighted = Some(idx.saturating_sub(1));
                }
                KeyOutcome::Moved
            }
            NavKey::Enter => {
                let choice = self
                    .highlighted
                    .and_then(|idx| self.visible_matches().get(idx).map(|s| s.to_string()));
                match choice {
                    Some(option) => {
                        self.commit(&option);
                        KeyOutcome::Committed(option)
                    }
                    None => KeyOutcome::Ignored,
                }
            }
            NavKey::Escape => {
                self.close();
                KeyOutcome::Dismissed
            }
        }
    }

    /// Pointer interaction outside the control: close, keep the text.
    pub fn on_outside_interaction(&mut self) {
        self.close();
    }

    pub fn commit(&mut self, option: &str) {
        self.query = option.to_string();
        self.close();
    }

    /// Commits the suggestion shown at `index`, e.g. after a click.
    pub fn select_visible(&mut self, index: usize) -> Option<String> {
        if self.disabled {
            return None;
        }
        let option = self.visible_matches().get(index).map(|s| s.to_string())?;
        self.commit(&option);
        Some(option)
    }

    /// Empties the input after a guess went through.
    pub fn clear(&mut self) {
        self.query.clear();
        self.close();
    }

    fn close(&mut self) {
        self.open = false;
        self.highlighted = None;
    }
}
