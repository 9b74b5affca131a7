use crate::app::{App, MenuItem, PAN_STEP, WINDOW_STEP_DAYS, ZOOM_IN, ZOOM_OUT};
use crate::state::messages::LoadRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    load_requests: &mpsc::Sender<LoadRequest>,
) {
    let mut guard = app.lock().await;

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Matches),
        (_, Char('2'), _) => guard.update_tab(MenuItem::Venues),
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Viewport
        (_, Char('k') | KeyCode::Up, _) => guard.pan(PAN_STEP, 0.0),
        (_, Char('j') | KeyCode::Down, _) => guard.pan(-PAN_STEP, 0.0),
        (_, Char('h') | KeyCode::Left, _) => guard.pan(0.0, -PAN_STEP),
        (_, Char('l') | KeyCode::Right, _) => guard.pan(0.0, PAN_STEP),
        (_, Char('+') | Char('='), _) => guard.zoom(ZOOM_IN),
        (_, Char('-'), _) => guard.zoom(ZOOM_OUT),

        // Date window and filters
        (_, Char(']'), _) => guard.shift_window(WINDOW_STEP_DAYS),
        (_, Char('['), _) => guard.shift_window(-WINDOW_STEP_DAYS),
        (_, Char('s'), _) => guard.toggle_spatial_filter(),

        // Match list
        (_, Char('J'), _) => guard.select_next(),
        (_, Char('K'), _) => guard.select_prev(),

        // Reload the match file
        (_, Char('r'), _) => {
            drop(guard);
            let _ = load_requests.send(LoadRequest::LoadMatches).await;
        }

        // Global
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }
}
