use crossterm::event::KeyEvent;
use serde_json::Value;

#[derive(Debug, Clone)]
pub enum LoadRequest {
    LoadMatches,
}

#[derive(Debug)]
pub enum LoadResponse {
    /// Raw records exactly as read; projection happens in the session.
    MatchesLoaded { raw: Value, source: String },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
}
