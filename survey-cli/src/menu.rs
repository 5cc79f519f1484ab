//! Single-key operator menu.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use survey_common::Interrupt;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub const MENU: &str = "
    Enter: log speed test
    g: retry acquiring GPS lock
    w: re-scan WiFi device
    x: shutdown scanner
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Collect,
    RetryFix,
    RefreshLink,
    Shutdown,
}

/// Map a key press to a menu action. Other keys are ignored.
pub fn action_for(key: &KeyEvent) -> Option<MenuAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match key.code {
        KeyCode::Enter => Some(MenuAction::Collect),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(MenuAction::Shutdown)
        }
        KeyCode::Char('g') => Some(MenuAction::RetryFix),
        KeyCode::Char('w') => Some(MenuAction::RefreshLink),
        KeyCode::Char('x') => Some(MenuAction::Shutdown),
        _ => None,
    }
}

/// Leaves raw mode when dropped, also on the error path.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            log::warn!("Failed to restore terminal: {}", e);
        }
    }
}

/// Print the menu and block until a key with an action is pressed or
/// `interrupt` is raised.
///
/// Ctrl-C does not raise SIGINT while the terminal is raw, so it is handled
/// here as a key.
pub fn prompt(interrupt: &Interrupt) -> io::Result<MenuAction> {
    print!("{}", MENU);
    io::stdout().flush()?;

    let _raw = RawMode::enable()?;
    loop {
        if interrupt.is_raised() {
            return Ok(MenuAction::Shutdown);
        }
        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if let Some(action) = action_for(&key) {
                return Ok(action);
            }
        }
    }
}
