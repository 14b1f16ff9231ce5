use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::alphabet::{Letter, LetterPool};
use crate::difficulty::Difficulty;
use crate::error::GameError;
use crate::haptics::{Haptics, NoHaptics, VibrationPattern};
use crate::session::{AnswerOutcome, Phase, SessionState, SessionSummary};
use crate::speech::Narrator;
use crate::timer::SecondTimer;

/// How long the "calculating results" screen stays up.
pub const COMPUTING_DELAY: Duration = Duration::from_millis(500);

/// Highest total points seen during this process. Lives only in memory; the
/// caller hands it in at construction and reads it back when done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct BestScore(pub u32);

impl BestScore {
    pub fn points(self) -> u32 {
        self.0
    }

    /// Returns true when `points` beat the previous best.
    pub fn record(&mut self, points: u32) -> bool {
        if points > self.0 {
            self.0 = points;
            true
        } else {
            false
        }
    }
}

/// Owns the session for the duration of the `Playing` state and drives the
/// timer, speech and haptics around it.
pub struct Game {
    pool: Arc<LetterPool>,
    rng: StdRng,
    session: Option<SessionState>,
    summary: Option<SessionSummary>,
    timer: SecondTimer,
    narrator: Narrator,
    haptics: Box<dyn Haptics>,
    haptics_enabled: bool,
    best: BestScore,
    computing_since: Option<Instant>,
}

impl Game {
    pub fn new(
        pool: Arc<LetterPool>,
        narrator: Narrator,
        haptics: Box<dyn Haptics>,
        best: BestScore,
        rng: StdRng,
    ) -> Self {
        Self {
            pool,
            rng,
            session: None,
            summary: None,
            timer: SecondTimer::default(),
            narrator,
            haptics,
            haptics_enabled: true,
            best,
            computing_since: None,
        }
    }

    /// Silent game over the built-in alphabet, seeded for reproducible tests.
    pub fn headless(seed: u64) -> Result<Self, GameError> {
        Ok(Self::new(
            Arc::new(LetterPool::builtin()?),
            Narrator::silent(),
            Box::new(NoHaptics),
            BestScore::default(),
            StdRng::seed_from_u64(seed),
        ))
    }

    pub fn set_haptics_enabled(&mut self, enabled: bool) {
        self.haptics_enabled = enabled;
    }

    pub fn phase(&self) -> Phase {
        self.session.as_ref().map_or(Phase::Idle, |s| s.phase)
    }

    pub fn session(&self) -> Option<&SessionState> {
        self.session.as_ref()
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn best_score(&self) -> BestScore {
        self.best
    }

    pub fn pool(&self) -> &LetterPool {
        &self.pool
    }

    pub fn sound_enabled(&self) -> bool {
        self.narrator.is_enabled()
    }

    pub fn is_speaking(&self) -> bool {
        self.narrator.is_speaking()
    }

    pub fn timer_armed(&self) -> bool {
        self.timer.is_armed()
    }

    /// `Idle|Result -> Playing` with a fresh session.
    pub fn start_game(&mut self, difficulty: Difficulty, now: Instant) -> Result<(), GameError> {
        self.timer.disarm();
        let session = SessionState::start(difficulty, self.pool.clone(), &mut self.rng)?;

        log::info!(
            "starting {difficulty} session with {} letters",
            session.order.len()
        );

        self.summary = None;
        self.computing_since = None;
        self.session = Some(session);
        self.timer.arm(now);
        self.announce_current();
        Ok(())
    }

    pub fn play_again(&mut self, now: Instant) -> Result<(), GameError> {
        let Some(difficulty) = self.session.as_ref().map(|s| s.difficulty) else {
            return Ok(());
        };
        self.start_game(difficulty, now)
    }

    /// `Result -> Idle`; also abandons a running game.
    pub fn return_to_menu(&mut self) {
        self.timer.disarm();
        self.narrator.stop();
        self.session = None;
        self.summary = None;
        self.computing_since = None;
    }

    pub fn submit_answer(&mut self, selected: &Letter, now: Instant) -> AnswerOutcome {
        let Some(session) = self.session.as_mut() else {
            return AnswerOutcome::Ignored;
        };

        let outcome = session.submit_answer(selected, &mut self.rng);
        match &outcome {
            AnswerOutcome::Correct { finished, .. } => {
                self.feedback_vibration(VibrationPattern::CORRECT);
                if *finished {
                    self.enter_computing(now);
                } else {
                    self.announce_current();
                }
            }
            AnswerOutcome::Incorrect { penalty_secs } => {
                log::debug!("wrong answer, {penalty_secs}s penalty");
                self.feedback_vibration(VibrationPattern::WRONG);
            }
            AnswerOutcome::Ignored => {}
        }
        outcome
    }

    /// Answers with the option at `index` on the current grid.
    pub fn select_option(&mut self, index: usize, now: Instant) -> AnswerOutcome {
        let selected = self
            .session
            .as_ref()
            .filter(|s| s.is_playing())
            .and_then(|s| s.current_options.get(index))
            .cloned();

        match selected {
            Some(letter) => self.submit_answer(&letter, now),
            None => AnswerOutcome::Ignored,
        }
    }

    /// Ends a running game early, as the back action does.
    pub fn end_game(&mut self, now: Instant) {
        if let Some(session) = self.session.as_mut() {
            if session.is_playing() {
                session.abandon();
                self.enter_computing(now);
            }
        }
    }

    pub fn toggle_sound(&mut self) {
        let enabled = !self.narrator.is_enabled();
        self.narrator.set_enabled(enabled);
        log::info!("sound {}", if enabled { "on" } else { "off" });
    }

    pub fn replay_current_letter_audio(&mut self) {
        let letter = self
            .session
            .as_ref()
            .filter(|s| s.is_playing())
            .and_then(|s| s.current_letter())
            .cloned();

        if let Some(letter) = letter {
            self.narrator.replay(&letter);
        }
    }

    /// Advances timers and collaborators. Call from every event-loop tick.
    pub fn on_tick(&mut self, now: Instant) {
        self.narrator.poll();

        for _ in 0..self.timer.poll(now) {
            if !self.timer.is_armed() {
                break;
            }
            let Some(session) = self.session.as_mut() else {
                self.timer.disarm();
                break;
            };
            if session.tick() {
                log::info!("time is up after {}s", session.elapsed_seconds);
                self.enter_computing(now);
            }
        }

        if let Some(since) = self.computing_since {
            if now.duration_since(since) >= COMPUTING_DELAY {
                self.show_result();
            }
        }
    }

    fn enter_computing(&mut self, now: Instant) {
        self.timer.disarm();
        self.computing_since = Some(now);
        self.narrator.announce_completion();
        self.feedback_vibration(VibrationPattern::COMPLETE);
    }

    fn show_result(&mut self) {
        self.computing_since = None;
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let summary = session.finish(self.best.points());
        self.best.record(summary.total_points);

        log::info!(
            "{} session finished: {} points, {}/{} correct, {} stars, {}s",
            summary.difficulty,
            summary.total_points,
            summary.score,
            summary.total_letters,
            summary.stars,
            summary.elapsed_seconds
        );

        if self.haptics_enabled {
            self.haptics
                .vibrate(VibrationPattern::for_stars(summary.stars));
        }
        self.summary = Some(summary);
    }

    fn announce_current(&mut self) {
        let letter = self.session.as_ref().and_then(|s| s.current_letter()).cloned();
        if let Some(letter) = letter {
            self.narrator.announce(&letter);
        }
    }

    /// Answer feedback follows the sound toggle.
    fn feedback_vibration(&mut self, pattern: VibrationPattern) {
        if self.haptics_enabled && self.narrator.is_enabled() {
            self.haptics.vibrate(pattern);
        }
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("phase", &self.phase())
            .field("best", &self.best)
            .field("narrator", &self.narrator)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::{Arc as StdArc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingHaptics(StdArc<Mutex<Vec<VibrationPattern>>>);

    impl Haptics for RecordingHaptics {
        fn vibrate(&mut self, pattern: VibrationPattern) {
            self.0.lock().unwrap().push(pattern);
        }
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn answer_correct(game: &mut Game, now: Instant) -> AnswerOutcome {
        let letter = game.session().unwrap().current_letter().cloned().unwrap();
        game.submit_answer(&letter, now)
    }

    fn answer_wrong(game: &mut Game, now: Instant) -> AnswerOutcome {
        let session = game.session().unwrap();
        let current = session.current_letter().unwrap();
        let wrong = session
            .current_options
            .iter()
            .find(|o| !o.same_glyph(current))
            .cloned()
            .unwrap();
        game.submit_answer(&wrong, now)
    }

    #[test]
    fn test_idle_until_started() {
        let game = Game::headless(1).unwrap();
        assert_eq!(game.phase(), Phase::Idle);
        assert!(game.session().is_none());
        assert!(!game.timer_armed());
    }

    #[test]
    fn test_start_game_arms_timer() {
        let mut game = Game::headless(1).unwrap();
        let t0 = Instant::now();
        game.start_game(Difficulty::Medium, t0).unwrap();

        assert_eq!(game.phase(), Phase::Playing);
        assert!(game.timer_armed());

        game.on_tick(t0 + secs(3));
        assert_eq!(game.session().unwrap().elapsed_seconds, 3);
    }

    #[test]
    fn test_timeout_goes_through_computing_to_result() {
        let mut game = Game::headless(2).unwrap();
        let t0 = Instant::now();
        game.start_game(Difficulty::Expert, t0).unwrap();
        answer_correct(&mut game, t0);

        let timeout = t0 + secs(45);
        game.on_tick(timeout);
        assert_eq!(game.phase(), Phase::Computing);
        assert!(!game.timer_armed());

        game.on_tick(timeout + Duration::from_millis(100));
        assert_eq!(game.phase(), Phase::Computing);

        game.on_tick(timeout + COMPUTING_DELAY);
        assert_eq!(game.phase(), Phase::Result);

        let summary = game.summary().unwrap();
        assert_eq!(summary.elapsed_seconds, 45);
        assert_eq!(summary.score, 1);
        assert!(summary.new_record);
        assert_eq!(game.best_score(), BestScore(250));
    }

    #[test]
    fn test_stalled_loop_does_not_tick_past_timeout() {
        let mut game = Game::headless(3).unwrap();
        let t0 = Instant::now();
        game.start_game(Difficulty::Hard, t0).unwrap();

        game.on_tick(t0 + secs(300));
        assert_eq!(game.session().unwrap().elapsed_seconds, 60);
    }

    #[test]
    fn test_stale_timer_cannot_touch_new_session() {
        let mut game = Game::headless(4).unwrap();
        let t0 = Instant::now();
        game.start_game(Difficulty::Hard, t0).unwrap();
        game.on_tick(t0 + secs(10));
        game.return_to_menu();
        assert!(!game.timer_armed());

        let t1 = t0 + secs(20);
        game.start_game(Difficulty::Hard, t1).unwrap();
        assert_eq!(game.session().unwrap().elapsed_seconds, 0);

        game.on_tick(t1 + Duration::from_millis(900));
        assert_eq!(game.session().unwrap().elapsed_seconds, 0);
        game.on_tick(t1 + secs(1));
        assert_eq!(game.session().unwrap().elapsed_seconds, 1);
    }

    #[test]
    fn test_play_again_keeps_difficulty_and_best() {
        let mut game = Game::headless(5).unwrap();
        let t0 = Instant::now();
        game.start_game(Difficulty::Medium, t0).unwrap();
        answer_correct(&mut game, t0);
        game.end_game(t0);
        game.on_tick(t0 + COMPUTING_DELAY);
        assert_eq!(game.phase(), Phase::Result);
        assert_eq!(game.best_score(), BestScore(150));

        game.play_again(t0 + secs(2)).unwrap();
        assert_eq!(game.phase(), Phase::Playing);
        let session = game.session().unwrap();
        assert_eq!(session.difficulty, Difficulty::Medium);
        assert_eq!(session.total_points, 0);
        assert!(game.summary().is_none());
        assert_eq!(game.best_score(), BestScore(150));
    }

    #[test]
    fn test_lower_score_is_not_a_record() {
        let mut game = Game::headless(6).unwrap();
        let t0 = Instant::now();
        game.start_game(Difficulty::Easy, t0).unwrap();
        answer_correct(&mut game, t0);
        answer_correct(&mut game, t0);
        game.end_game(t0);
        game.on_tick(t0 + COMPUTING_DELAY);
        assert!(game.summary().unwrap().new_record);

        game.play_again(t0 + secs(1)).unwrap();
        answer_correct(&mut game, t0 + secs(1));
        game.end_game(t0 + secs(1));
        game.on_tick(t0 + secs(2));

        assert!(!game.summary().unwrap().new_record);
        assert_eq!(game.best_score(), BestScore(220));
    }

    #[test]
    fn test_return_to_menu_clears_session() {
        let mut game = Game::headless(7).unwrap();
        let t0 = Instant::now();
        game.start_game(Difficulty::Easy, t0).unwrap();
        game.return_to_menu();

        assert_eq!(game.phase(), Phase::Idle);
        assert_matches!(game.select_option(0, t0), AnswerOutcome::Ignored);
        game.replay_current_letter_audio();
    }

    #[test]
    fn test_select_option_out_of_range() {
        let mut game = Game::headless(8).unwrap();
        let t0 = Instant::now();
        game.start_game(Difficulty::Easy, t0).unwrap();
        assert_matches!(game.select_option(4, t0), AnswerOutcome::Ignored);
        assert_matches!(
            game.select_option(0, t0),
            AnswerOutcome::Correct { .. } | AnswerOutcome::Incorrect { .. }
        );
    }

    #[test]
    fn test_haptics_follow_sound_toggle() {
        let recorder = RecordingHaptics::default();
        let mut game = Game::new(
            Arc::new(LetterPool::builtin().unwrap()),
            Narrator::new(
                Box::<crate::speech::SilentSpeech>::default(),
                Default::default(),
                true,
            ),
            Box::new(recorder.clone()),
            BestScore::default(),
            StdRng::seed_from_u64(9),
        );
        let t0 = Instant::now();
        game.start_game(Difficulty::Medium, t0).unwrap();

        answer_correct(&mut game, t0);
        answer_wrong(&mut game, t0);
        game.toggle_sound();
        assert!(!game.sound_enabled());
        answer_correct(&mut game, t0);

        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec![VibrationPattern::CORRECT, VibrationPattern::WRONG]
        );

        game.end_game(t0);
        game.on_tick(t0 + COMPUTING_DELAY);
        let patterns = recorder.0.lock().unwrap();
        assert_eq!(patterns.len(), 3);
    }

    #[test]
    fn test_wrong_answer_penalty_added_on_top_of_ticks() {
        let mut game = Game::headless(10).unwrap();
        let t0 = Instant::now();
        game.start_game(Difficulty::Hard, t0).unwrap();

        game.on_tick(t0 + secs(2));
        answer_wrong(&mut game, t0 + secs(2));
        game.on_tick(t0 + secs(4));

        assert_eq!(game.session().unwrap().elapsed_seconds, 4 + 5);
    }
}
