pub mod app_settings;
pub mod app_state;
pub mod loader;
pub mod messages;
