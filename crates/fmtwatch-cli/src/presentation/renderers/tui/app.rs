use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fmtwatch_types::{EntryState, Message, Notice, Snapshot, SnapshotEntry};
use std::collections::VecDeque;

const MAX_FOOTER_NOTICES: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum KeyAction {
    Quit,
    SelectNext,
    SelectPrevious,
    Send(Message),
    Nothing,
}

#[derive(Debug, Default)]
pub(crate) struct AppState {
    pub snapshot: Snapshot,
    pub selected: usize,
    pub auto_format: bool,
    pub notices: VecDeque<Notice>,
}

impl AppState {
    pub fn new(auto_format: bool) -> Self {
        Self {
            auto_format,
            ..Self::default()
        }
    }

    /// Replace the snapshot, keeping the selection on the same path when it
    /// is still listed.
    pub fn update(&mut self, snapshot: Snapshot) {
        let selected_path = self.selected_entry().map(|entry| entry.path.clone());
        self.snapshot = snapshot;

        if let Some(path) = selected_path
            && let Some(index) = self.snapshot.entries.iter().position(|e| e.path == path)
        {
            self.selected = index;
        }
        self.clamp_selection();
    }

    pub fn push_notices(&mut self, notices: impl IntoIterator<Item = Notice>) {
        for notice in notices {
            self.notices.push_back(notice);
            if self.notices.len() > MAX_FOOTER_NOTICES {
                self.notices.pop_front();
            }
        }
    }

    pub fn selected_entry(&self) -> Option<&SnapshotEntry> {
        self.snapshot.entries.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.snapshot.entries.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn pending_count(&self) -> usize {
        self.snapshot.pending().count()
    }

    pub fn formatted_count(&self) -> usize {
        self.snapshot.formatted().count()
    }

    pub fn key_action(&self, key: KeyEvent) -> KeyAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
            KeyCode::Down | KeyCode::Char('j') => KeyAction::SelectNext,
            KeyCode::Up | KeyCode::Char('k') => KeyAction::SelectPrevious,
            KeyCode::Char('f') => KeyAction::Send(Message::FormatAll),
            KeyCode::Char('a') => KeyAction::Send(Message::AddAll),
            KeyCode::Char('o') => KeyAction::Send(Message::SetAutoFormat(!self.auto_format)),
            KeyCode::Enter => match self.selected_entry() {
                Some(entry) => match entry.state {
                    EntryState::Pending => KeyAction::Send(Message::FormatOne(entry.path.clone())),
                    EntryState::Formatted => KeyAction::Send(Message::TouchOne(entry.path.clone())),
                },
                None => KeyAction::Nothing,
            },
            _ => KeyAction::Nothing,
        }
    }

    /// Coming back to the terminal means editing is done for now.
    pub fn focus_action(&self) -> Option<Message> {
        self.auto_format.then_some(Message::FormatAll)
    }

    fn clamp_selection(&mut self) {
        let len = self.snapshot.entries.len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}
