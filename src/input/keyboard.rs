//! Keyboard input for terminal environments
//!
//! Terminals rarely report key releases, so a held horizontal key is assumed
//! released after a short timeout with no repeat.

use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;

use super::InputSource;
use crate::config::Variant;
use crate::error::EngineError;
use crate::sim::{Command, TickInput};

const DEFAULT_KEY_RELEASE_TIMEOUT: Duration = Duration::from_millis(150);

/// Map a key event to a command for the given variant
///
/// Space jumps in flappy and fires in the shooter.
pub fn map_key(key: KeyEvent, variant: Variant) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }
    match key.code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Command::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Command::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Command::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Command::Right),
        KeyCode::Char(' ') => match variant {
            Variant::Shooter => Some(Command::Fire),
            _ => Some(Command::Jump),
        },
        KeyCode::Char('f') | KeyCode::Char('F') => Some(Command::Fire),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(Command::Pause),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Command::Restart),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Command::Quit),
        _ => None,
    }
}

/// Non-blocking crossterm keyboard source
///
/// Holds raw mode for its lifetime.
pub struct KeyboardInput {
    variant: Variant,
    held: Option<(Command, Instant)>,
    release_timeout: Duration,
}

impl KeyboardInput {
    pub fn open(variant: Variant) -> Result<Self, EngineError> {
        terminal::enable_raw_mode()
            .map_err(|e| EngineError::InputUnavailable(format!("keyboard: {e}")))?;
        Ok(Self {
            variant,
            held: None,
            release_timeout: DEFAULT_KEY_RELEASE_TIMEOUT,
        })
    }

    pub fn with_release_timeout(mut self, timeout: Duration) -> Self {
        self.release_timeout = timeout;
        self
    }

    /// Continuous movement only matters where the player slides
    fn holds_keys(&self) -> bool {
        matches!(self.variant, Variant::Catch | Variant::Shooter)
    }

    fn handle_key(&mut self, key: KeyEvent, commands: &mut Vec<Command>) {
        let Some(command) = map_key(key, self.variant) else {
            return;
        };
        let horizontal = matches!(command, Command::Left | Command::Right);
        match key.kind {
            KeyEventKind::Release => {
                if self.held.is_some_and(|(held, _)| held == command) {
                    self.held = None;
                }
            }
            KeyEventKind::Press | KeyEventKind::Repeat => {
                if horizontal && self.holds_keys() {
                    self.held = Some((command, Instant::now()));
                }
                if !commands.contains(&command) {
                    commands.push(command);
                }
            }
        }
    }
}

impl InputSource for KeyboardInput {
    fn poll(&mut self) -> TickInput {
        let mut commands = Vec::new();
        loop {
            match event::poll(Duration::ZERO) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) => self.handle_key(key, &mut commands),
                    Ok(_) => {}
                    Err(e) => {
                        log::warn!("Keyboard read failed: {}", e);
                        break;
                    }
                },
                Ok(false) => break,
                Err(e) => {
                    log::warn!("Keyboard poll failed: {}", e);
                    break;
                }
            }
        }

        if let Some((command, since)) = self.held {
            if since.elapsed() > self.release_timeout {
                self.held = None;
            } else if !commands.contains(&command) {
                commands.push(command);
            }
        }

        TickInput {
            commands,
            signal: None,
        }
    }
}

impl Drop for KeyboardInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
