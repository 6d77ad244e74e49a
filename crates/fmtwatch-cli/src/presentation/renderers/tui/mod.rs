//! Terminal dashboard. Runs on the thread that owns the [`Runtime`], so each
//! frame first lets the coordinator drain its inbox and then draws the
//! resulting snapshot.

mod app;
mod ui;

use anyhow::Result;
use crossterm::{
    event::{self, DisableFocusChange, EnableFocusChange, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use fmtwatch_runtime::{DrainOutcome, Runtime};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::time::Duration;

use app::{AppState, KeyAction};

const TICK_RATE: Duration = Duration::from_millis(100);

/// Restores the terminal however the loop exits.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableFocusChange) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            DisableFocusChange,
            LeaveAlternateScreen
        );
        let _ = self.terminal.show_cursor();
    }
}

pub struct TuiRenderer;

impl TuiRenderer {
    /// Runs until the user quits or the shutdown token is cancelled.
    pub fn run(runtime: &mut Runtime) -> Result<()> {
        let mut guard = TerminalGuard::enter()?;
        let mut app_state = AppState::new(runtime.coordinator().auto_format());

        loop {
            if runtime.tick() == DrainOutcome::ShouldExit {
                break;
            }
            app_state.push_notices(runtime.take_notices());
            app_state.auto_format = runtime.coordinator().auto_format();
            app_state.update(runtime.snapshot());

            let watch_set = runtime.coordinator().watch_set();
            guard
                .terminal
                .draw(|f| ui::draw(f, &app_state, watch_set))?;

            if !event::poll(TICK_RATE)? {
                continue;
            }
            let key = match event::read()? {
                Event::Key(key) => key,
                Event::FocusGained => {
                    if let Some(message) = app_state.focus_action() {
                        runtime.send(message);
                    }
                    continue;
                }
                _ => continue,
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match app_state.key_action(key) {
                KeyAction::Quit => {
                    runtime.shutdown_token().cancel();
                    break;
                }
                KeyAction::SelectNext => app_state.select_next(),
                KeyAction::SelectPrevious => app_state.select_previous(),
                KeyAction::Send(message) => runtime.send(message),
                KeyAction::Nothing => {}
            }
        }

        Ok(())
    }
}
