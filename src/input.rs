//! Key bindings: arrows, a/s/d + space, and vim-style.

use crate::game::Command;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    Pause,
    Restart,
    Quit,
    None,
}

impl Action {
    /// The game command this action drives, if any.
    pub fn command(self) -> Option<Command> {
        match self {
            Self::MoveLeft => Some(Command::MoveLeft),
            Self::MoveRight => Some(Command::MoveRight),
            Self::SoftDrop => Some(Command::SoftDrop),
            Self::Rotate => Some(Command::Rotate),
            _ => None,
        }
    }
}

/// Map key event to game action.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    if !(modifiers.is_empty() || modifiers == KeyModifiers::SHIFT) {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('p') => Action::Pause,
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Restart,
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('h') => Action::MoveLeft,
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('l') => Action::MoveRight,
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('j') => Action::SoftDrop,
        KeyCode::Up | KeyCode::Char(' ') | KeyCode::Char('k') | KeyCode::Char('i') => Action::Rotate,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_letter_bindings() {
        assert_eq!(key_to_action(key(KeyCode::Char('a'))), Action::MoveLeft);
        assert_eq!(key_to_action(key(KeyCode::Char('d'))), Action::MoveRight);
        assert_eq!(key_to_action(key(KeyCode::Char('s'))), Action::SoftDrop);
        assert_eq!(key_to_action(key(KeyCode::Char(' '))), Action::Rotate);
    }

    #[test]
    fn test_arrows_and_vim() {
        assert_eq!(key_to_action(key(KeyCode::Left)), Action::MoveLeft);
        assert_eq!(key_to_action(key(KeyCode::Char('l'))), Action::MoveRight);
        assert_eq!(key_to_action(key(KeyCode::Up)), Action::Rotate);
        assert_eq!(key_to_action(key(KeyCode::Char('j'))), Action::SoftDrop);
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(key_to_action(key(KeyCode::Esc)), Action::Quit);
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::ALT)),
            Action::None
        );
        assert_eq!(key_to_action(key(KeyCode::Char('x'))), Action::None);
        assert_eq!(Action::Pause.command(), None);
        assert_eq!(Action::Rotate.command(), Some(Command::Rotate));
    }
}
