use ratatui::{buffer::Buffer, layout::Rect};

use crate::app::App;
use crate::session::Phase;

/// A UI Screen boundary: one per game phase.
pub trait Screen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

/// Difficulty picker shown while no session exists
pub struct MenuScreen;

impl Screen for MenuScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        super::render_menu(app, area, buf);
    }
}

pub struct PlayingScreen;

impl Screen for PlayingScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        super::render_playing(app, area, buf);
    }
}

pub struct ComputingScreen;

impl Screen for ComputingScreen {
    fn render(&self, _app: &App, area: Rect, buf: &mut Buffer) {
        super::render_computing(area, buf);
    }
}

pub struct ResultScreen;

impl Screen for ResultScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        super::render_result(app, area, buf);
    }
}

/// Helper to construct the appropriate screen for the current phase
pub fn current_screen(phase: Phase) -> Box<dyn Screen> {
    match phase {
        Phase::Idle => Box::new(MenuScreen),
        Phase::Playing => Box::new(PlayingScreen),
        Phase::Computing => Box::new(ComputingScreen),
        Phase::Result => Box::new(ResultScreen),
    }
}
