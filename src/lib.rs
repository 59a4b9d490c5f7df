pub mod app;
pub mod client;
pub mod clock;
pub mod config;
pub mod controller;
pub mod errors;
pub mod fallback;
pub mod format;
pub mod handlers;
pub mod models;
pub mod settings;
pub mod state;
pub mod stats;
pub mod tags;
pub mod ui;
pub mod widgets;

pub use app::router;
pub use config::Config;
pub use state::AppState;
