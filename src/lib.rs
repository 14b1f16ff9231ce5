// Library surface for the binary and for headless/integration tests.
pub mod alphabet;
pub mod app;
pub mod app_dirs;
pub mod celebration;
pub mod config;
pub mod difficulty;
pub mod error;
pub mod game;
pub mod haptics;
pub mod logging;
pub mod options;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod speech;
pub mod timer;
pub mod ui;

pub use app::{App, AppAction};
pub use difficulty::Difficulty;
pub use error::GameError;
pub use game::Game;
