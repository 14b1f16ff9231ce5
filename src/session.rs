use rand::Rng;
use std::sync::Arc;

use crate::alphabet::{Letter, LetterPool};
use crate::difficulty::{Difficulty, DifficultyConfig, SpeedRank};
use crate::error::GameError;
use crate::options::{generate_options, shuffled_order};
use crate::scoring;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// no difficulty chosen, no session exists
    Idle,
    Playing,
    /// game over, tally being prepared
    Computing,
    Result,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct {
        points: u32,
        combo: u32,
        finished: bool,
    },
    Incorrect {
        penalty_secs: u32,
    },
    /// late input after the session ended
    Ignored,
}

/// Immutable tally of a finished session, rendered by the result screen.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub difficulty: Difficulty,
    pub stars: u8,
    pub speed_rank: SpeedRank,
    pub accuracy: f64,
    pub score: usize,
    pub total_letters: usize,
    pub total_points: u32,
    pub max_combo: u32,
    pub wrong_count: u32,
    pub elapsed_seconds: u32,
    pub perfect: bool,
    pub new_record: bool,
}

/// One play-through. Created when a difficulty is chosen, mutated only by
/// answers and the one-second tick, replaced on restart.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub difficulty: Difficulty,
    pub order: Vec<Letter>,
    pub current_index: usize,
    pub score: usize,
    pub total_points: u32,
    pub elapsed_seconds: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub wrong_count: u32,
    pub current_options: Vec<Letter>,
    pub phase: Phase,
    pool: Arc<LetterPool>,
}

impl SessionState {
    pub fn start<R: Rng + ?Sized>(
        difficulty: Difficulty,
        pool: Arc<LetterPool>,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        let needed = difficulty.config().option_count;
        if pool.len() < needed {
            return Err(GameError::NotEnoughLetters {
                difficulty: difficulty.to_string(),
                needed,
                available: pool.len(),
            });
        }

        let order = shuffled_order(&pool, rng);
        let mut session = Self {
            difficulty,
            order,
            current_index: 0,
            score: 0,
            total_points: 0,
            elapsed_seconds: 0,
            combo: 0,
            max_combo: 0,
            wrong_count: 0,
            current_options: Vec::new(),
            phase: Phase::Playing,
            pool,
        };
        session.regenerate_options(rng);

        Ok(session)
    }

    pub fn config(&self) -> &'static DifficultyConfig {
        self.difficulty.config()
    }

    pub fn current_letter(&self) -> Option<&Letter> {
        self.order.get(self.current_index)
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn compute_points(&self, combo: u32) -> u32 {
        scoring::compute_points(combo, self.difficulty)
    }

    pub fn submit_answer<R: Rng + ?Sized>(&mut self, selected: &Letter, rng: &mut R) -> AnswerOutcome {
        if !self.is_playing() {
            return AnswerOutcome::Ignored;
        }
        let Some(expected) = self.current_letter() else {
            return AnswerOutcome::Ignored;
        };

        if selected.same_glyph(expected) {
            self.combo += 1;
            self.max_combo = self.max_combo.max(self.combo);
            self.score += 1;

            let points = self.compute_points(self.combo);
            self.total_points += points;

            self.current_index += 1;
            let finished = self.current_index >= self.order.len();
            if finished {
                self.current_options.clear();
                self.phase = Phase::Computing;
            } else {
                self.regenerate_options(rng);
            }

            AnswerOutcome::Correct {
                points,
                combo: self.combo,
                finished,
            }
        } else {
            self.combo = 0;
            self.wrong_count += 1;

            // may overshoot the limit; the next tick ends the session
            let penalty_secs = self.config().penalty_secs;
            self.elapsed_seconds += penalty_secs;

            AnswerOutcome::Incorrect { penalty_secs }
        }
    }

    /// One second of play. Returns true when this tick ended the session.
    pub fn tick(&mut self) -> bool {
        if !self.is_playing() {
            return false;
        }

        self.elapsed_seconds += 1;

        if self.difficulty.is_timed() && self.elapsed_seconds >= self.config().time_limit_secs {
            self.phase = Phase::Computing;
            return true;
        }
        false
    }

    /// Ends the session early, as when the player backs out mid-game.
    pub fn abandon(&mut self) {
        if self.is_playing() {
            self.phase = Phase::Computing;
        }
    }

    pub fn remaining_seconds(&self) -> Option<u32> {
        self.difficulty
            .is_timed()
            .then(|| self.config().time_limit_secs.saturating_sub(self.elapsed_seconds))
    }

    pub fn compute_stars(&self) -> u8 {
        let speed = scoring::speed_stars(self.elapsed_seconds, &self.config().speed);
        let accuracy = scoring::accuracy_stars(self.score, self.order.len());
        scoring::stars(speed, accuracy)
    }

    pub fn compute_speed_rank(&self) -> SpeedRank {
        scoring::speed_rank(self.elapsed_seconds, &self.config().speed)
    }

    pub fn accuracy(&self) -> f64 {
        scoring::accuracy_percent(self.score, self.order.len())
    }

    /// `Computing -> Result`. `previous_best` is the carry-over high score
    /// the record flag is measured against.
    pub fn finish(&mut self, previous_best: u32) -> SessionSummary {
        if self.phase == Phase::Computing {
            self.phase = Phase::Result;
        }

        SessionSummary {
            difficulty: self.difficulty,
            stars: self.compute_stars(),
            speed_rank: self.compute_speed_rank(),
            accuracy: self.accuracy(),
            score: self.score,
            total_letters: self.order.len(),
            total_points: self.total_points,
            max_combo: self.max_combo,
            wrong_count: self.wrong_count,
            elapsed_seconds: self.elapsed_seconds,
            perfect: self.wrong_count == 0,
            new_record: self.total_points > previous_best,
        }
    }

    fn regenerate_options<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let option_count = self.config().option_count;
        self.current_options = match self.order.get(self.current_index) {
            Some(target) => generate_options(target, &self.pool, option_count, rng),
            None => Vec::new(),
        };
    }
}
