//! Keybindings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::state::Viewport;

/// What the driver must do beyond viewport mutation.
#[derive(Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// Nothing further; the viewport absorbed the key (or it was unbound).
    None,
    /// Leave the main loop.
    Quit,
    /// Tear down the terminal and stop the process (Ctrl-Z).
    Suspend,
}

/// Applies a key to the viewport. `n` is the current process count.
pub fn handle_key(view: &mut Viewport, key: KeyEvent, n: usize) -> KeyAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('q') => KeyAction::Quit,
        KeyCode::Char('c') if ctrl => KeyAction::Quit,
        KeyCode::Char('z') if ctrl => KeyAction::Suspend,

        KeyCode::Char('d') if ctrl => {
            view.half_page_down(n);
            KeyAction::None
        }
        KeyCode::Char('u') if ctrl => {
            view.half_page_up();
            KeyAction::None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            view.move_down(n);
            KeyAction::None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view.move_up();
            KeyAction::None
        }
        KeyCode::Left => {
            view.scroll_left();
            KeyAction::None
        }
        KeyCode::Right => {
            view.scroll_right();
            KeyAction::None
        }
        KeyCode::Char('v') => {
            view.verbose = !view.verbose;
            KeyAction::None
        }
        _ => KeyAction::None,
    }
}
