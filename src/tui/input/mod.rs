mod confirm;
mod edit;
mod filter;
mod mouse;
mod navigate;

use crossterm::event::{KeyCode, KeyEvent, MouseEvent};

use super::app::{App, Mode};
use super::drag;

// Import all submodule functions into this module's namespace
// so that submodules can access cross-module functions via `use super::*;`
#[allow(unused_imports)]
use confirm::*;
#[allow(unused_imports)]
use edit::*;
#[allow(unused_imports)]
use filter::*;
#[allow(unused_imports)]
use mouse::*;
#[allow(unused_imports)]
use navigate::*;

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // a live drag owns the keyboard: only escape does anything
    if app.drag.is_some() {
        if key.code == KeyCode::Esc {
            drag::cancel(app);
        }
        return;
    }
    match app.mode {
        Mode::Navigate => handle_navigate(app, key),
        Mode::Edit => handle_edit(app, key),
        Mode::Confirm => handle_confirm(app, key),
        Mode::Filter => handle_filter(app, key),
    }
}

/// Handle a mouse event (navigate mode only; other modes own the keyboard)
pub fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    mouse::handle_mouse_event(app, mouse);
}
