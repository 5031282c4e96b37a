use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::game::Action;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    GameAction(Action),
    Restart,
    Quit,
    None,
}

/// Keys understood while a saved policy is playing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackAction {
    TogglePause,
    Reset,
    /// Speed preset, 1 (slowest) to 4 (fastest)
    Speed(u8),
    Quit,
    None,
}

/// Maps keys to relative snake actions
///
/// Left/right always mean "turn relative to the snake", not screen directions.
pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        // Handle Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => {
                KeyAction::GameAction(Action::Forward)
            }
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => {
                KeyAction::GameAction(Action::TurnLeft)
            }
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => {
                KeyAction::GameAction(Action::TurnRight)
            }

            // Controls
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyAction::Quit,
            KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::Restart,

            _ => KeyAction::None,
        }
    }

    pub fn handle_playback_key(&self, key: KeyEvent) -> PlaybackAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return PlaybackAction::Quit;
        }

        match key.code {
            KeyCode::Char(' ') => PlaybackAction::TogglePause,
            KeyCode::Char('r') | KeyCode::Char('R') => PlaybackAction::Reset,
            KeyCode::Char(c @ '1'..='4') => PlaybackAction::Speed(c as u8 - b'0'),
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => PlaybackAction::Quit,
            _ => PlaybackAction::None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
