use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};

use crate::celebration::ResultAnimation;
use crate::config::Config;
use crate::difficulty::Difficulty;
use crate::game::Game;
use crate::session::{AnswerOutcome, Phase};

const CORRECT_FEEDBACK: Duration = Duration::from_millis(500);
const WRONG_FEEDBACK: Duration = Duration::from_millis(1000);
const COMBO_PULSE: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackKind {
    Correct,
    Wrong,
}

/// Short-lived banner under the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub text: String,
    pub until: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Continue,
    Quit,
}

/// Presentation state around a [`Game`]: menu cursor, transient feedback and
/// the result reveal. Forwards intent to the game and renders nothing itself.
#[derive(Debug)]
pub struct App {
    pub game: Game,
    pub config: Config,
    pub menu_selection: Difficulty,
    pub feedback: Option<Feedback>,
    pub combo_pulse_until: Option<Instant>,
    pub result_animation: Option<ResultAnimation>,
    pub last_error: Option<String>,
    pub now: Instant,
}

impl App {
    pub fn new(game: Game, config: Config, now: Instant) -> Self {
        Self {
            menu_selection: config.difficulty,
            game,
            config,
            feedback: None,
            combo_pulse_until: None,
            result_animation: None,
            last_error: None,
            now,
        }
    }

    pub fn phase(&self) -> Phase {
        self.game.phase()
    }

    /// Settings worth keeping for the next run.
    pub fn to_config(&self) -> Config {
        Config {
            difficulty: self.menu_selection,
            sound_enabled: self.game.sound_enabled(),
            ..self.config.clone()
        }
    }

    pub fn start_game(&mut self, difficulty: Difficulty, now: Instant) {
        self.menu_selection = difficulty;
        self.clear_transients();
        if let Err(e) = self.game.start_game(difficulty, now) {
            log::error!("cannot start {difficulty}: {e}");
            self.last_error = Some(e.to_string());
        }
    }

    pub fn on_tick(&mut self, now: Instant) {
        self.now = now;
        let before = self.game.phase();
        self.game.on_tick(now);

        if before != Phase::Result && self.game.phase() == Phase::Result {
            if let Some(summary) = self.game.summary() {
                self.result_animation = Some(ResultAnimation::start(
                    now,
                    summary.stars,
                    summary.total_points,
                ));
            }
        }

        if self.feedback.as_ref().is_some_and(|f| now >= f.until) {
            self.feedback = None;
        }
        if self.combo_pulse_until.is_some_and(|until| now >= until) {
            self.combo_pulse_until = None;
        }
    }

    pub fn on_key(&mut self, key: KeyEvent, now: Instant) -> AppAction {
        self.now = now;
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return AppAction::Quit;
        }

        match self.game.phase() {
            Phase::Idle => return self.on_menu_key(key, now),
            Phase::Playing => self.on_playing_key(key, now),
            Phase::Computing => {}
            Phase::Result => self.on_result_key(key, now),
        }
        AppAction::Continue
    }

    fn on_menu_key(&mut self, key: KeyEvent, now: Instant) -> AppAction {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return AppAction::Quit,
            KeyCode::Up | KeyCode::Char('k') => self.menu_selection = self.menu_selection.previous(),
            KeyCode::Down | KeyCode::Char('j') => self.menu_selection = self.menu_selection.next(),
            KeyCode::Enter => self.start_game(self.menu_selection, now),
            KeyCode::Char('s') => self.game.toggle_sound(),
            KeyCode::Char(c) => {
                if let Some(d) = digit_index(c).and_then(|i| Difficulty::ALL.get(i).copied()) {
                    self.start_game(d, now);
                }
            }
            _ => {}
        }
        AppAction::Continue
    }

    fn on_playing_key(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Esc => self.game.end_game(now),
            KeyCode::Char(' ') | KeyCode::Char('r') => self.game.replay_current_letter_audio(),
            KeyCode::Char('s') => self.game.toggle_sound(),
            KeyCode::Char(c) => {
                if let Some(i) = digit_index(c) {
                    let outcome = self.game.select_option(i, now);
                    self.show_feedback(&outcome, now);
                }
            }
            _ => {}
        }
    }

    fn on_result_key(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Enter | KeyCode::Char('r') => {
                self.clear_transients();
                if let Err(e) = self.game.play_again(now) {
                    log::error!("cannot restart: {e}");
                    self.last_error = Some(e.to_string());
                }
            }
            KeyCode::Esc | KeyCode::Char('m') => {
                self.clear_transients();
                self.game.return_to_menu();
            }
            _ => {}
        }
    }

    fn show_feedback(&mut self, outcome: &AnswerOutcome, now: Instant) {
        match outcome {
            AnswerOutcome::Correct { points, combo, .. } => {
                self.feedback = Some(Feedback {
                    kind: FeedbackKind::Correct,
                    text: format!("✓ +{points} points!"),
                    until: now + CORRECT_FEEDBACK,
                });
                if *combo > 1 && combo % 5 == 0 {
                    self.combo_pulse_until = Some(now + COMBO_PULSE);
                }
            }
            AnswerOutcome::Incorrect { penalty_secs } => {
                let text = match penalty_secs {
                    0 => "✗ Wrong!".to_string(),
                    p => format!("✗ Wrong! +{p}s"),
                };
                self.feedback = Some(Feedback {
                    kind: FeedbackKind::Wrong,
                    text,
                    until: now + WRONG_FEEDBACK,
                });
            }
            AnswerOutcome::Ignored => {}
        }
    }

    fn clear_transients(&mut self) {
        self.feedback = None;
        self.combo_pulse_until = None;
        self.result_animation = None;
        self.last_error = None;
    }
}

/// Maps '1'..='9' to a zero-based index.
fn digit_index(c: char) -> Option<usize> {
    match c.to_digit(10) {
        Some(d) if d >= 1 => Some(d as usize - 1),
        _ => None,
    }
}
