use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::{App, Mode};

use super::*;

pub(super) fn handle_filter(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => {
            app.filter = None;
            app.filter_input.clear();
            app.mode = Mode::Navigate;
        }
        (_, KeyCode::Enter) => {
            let q = app.filter_input.trim().to_string();
            app.filter = if q.is_empty() { None } else { Some(q) };
            app.filter_input.clear();
            app.mode = Mode::Navigate;
            app.clamp_cursor();
        }
        (_, KeyCode::Backspace) => {
            app.filter_input.pop();
        }
        (mods, KeyCode::Char(c)) if !mods.contains(KeyModifiers::CONTROL) => {
            app.filter_input.push(c);
        }
        _ => {}
    }
}
