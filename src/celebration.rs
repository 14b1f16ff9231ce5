use rand::seq::SliceRandom;
use rand::Rng;
use std::time::{Duration, Instant};

const FADE_MS: u64 = 300;
const STAR_DELAY_MS: u64 = 200;
const STAR_GROW_MS: u64 = 400;
const COUNT_UP_MS: u64 = 800;
const SPARKLE_COUNT: usize = 24;

/// A twinkling glyph scattered around the result card on a three-star run.
#[derive(Debug, Clone)]
pub struct Sparkle {
    /// position as a fraction of the render area
    pub x: f64,
    pub y: f64,
    pub symbol: char,
    pub color_index: usize,
    pub phase_ms: u64,
}

/// What the result screen should show at a given moment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealFrame {
    /// card fade-in, 0.0..=1.0
    pub opacity: f64,
    /// growth of each star, 0.0..=1.0
    pub star_scale: [f64; 3],
    pub shown_points: u32,
    pub done: bool,
}

/// Staged reveal of the result card: fade in, stars one after another, then
/// the total counting up.
#[derive(Debug, Clone)]
pub struct ResultAnimation {
    started_at: Instant,
    stars: u8,
    total_points: u32,
    pub sparkles: Vec<Sparkle>,
}

impl ResultAnimation {
    pub fn start(now: Instant, stars: u8, total_points: u32) -> Self {
        let sparkles = if stars >= 3 {
            scatter_sparkles(&mut rand::thread_rng())
        } else {
            Vec::new()
        };

        Self {
            started_at: now,
            stars: stars.clamp(1, 3),
            total_points,
            sparkles,
        }
    }

    /// Total length of the reveal for this star count.
    pub fn duration(&self) -> Duration {
        let mut ms = FADE_MS + STAR_DELAY_MS + STAR_GROW_MS;
        ms += (self.stars as u64 - 1) * (STAR_DELAY_MS + STAR_GROW_MS);
        Duration::from_millis(ms + COUNT_UP_MS)
    }

    pub fn frame(&self, now: Instant) -> RevealFrame {
        let t = now.saturating_duration_since(self.started_at).as_millis() as u64;

        let opacity = progress(t, 0, FADE_MS);

        let mut star_scale = [0.0; 3];
        let mut cursor = FADE_MS;
        for (i, scale) in star_scale.iter_mut().enumerate() {
            if i >= self.stars as usize {
                break;
            }
            cursor += STAR_DELAY_MS;
            *scale = progress(t, cursor, STAR_GROW_MS);
            cursor += STAR_GROW_MS;
        }

        let count = progress(t, cursor, COUNT_UP_MS);
        let shown_points = (self.total_points as f64 * count).round() as u32;

        RevealFrame {
            opacity,
            star_scale,
            shown_points,
            done: t >= self.duration().as_millis() as u64,
        }
    }

    /// Sparkles visible at `now`; each blinks on a 600ms cycle.
    pub fn visible_sparkles(&self, now: Instant) -> impl Iterator<Item = &Sparkle> {
        let t = now.saturating_duration_since(self.started_at).as_millis() as u64;
        self.sparkles
            .iter()
            .filter(move |s| (t + s.phase_ms) % 600 < 400)
    }
}

fn progress(t: u64, start: u64, len: u64) -> f64 {
    if t <= start {
        0.0
    } else {
        ((t - start) as f64 / len as f64).min(1.0)
    }
}

fn scatter_sparkles<R: Rng>(rng: &mut R) -> Vec<Sparkle> {
    (0..SPARKLE_COUNT)
        .map(|_| Sparkle {
            x: rng.gen_range(0.05..0.95),
            y: rng.gen_range(0.05..0.95),
            symbol: *['✦', '✧', '*', '+', '·'].choose(rng).unwrap_or(&'*'),
            color_index: rng.gen_range(0..5),
            phase_ms: rng.gen_range(0..600),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(anim: &ResultAnimation, ms: u64) -> RevealFrame {
        anim.frame(anim.started_at + Duration::from_millis(ms))
    }

    #[test]
    fn test_starts_invisible() {
        let anim = ResultAnimation::start(Instant::now(), 3, 1000);
        let frame = at(&anim, 0);

        assert_eq!(frame.opacity, 0.0);
        assert_eq!(frame.star_scale, [0.0; 3]);
        assert_eq!(frame.shown_points, 0);
        assert!(!frame.done);
    }

    #[test]
    fn test_stars_appear_in_order() {
        let anim = ResultAnimation::start(Instant::now(), 3, 1000);

        // fade 300 + delay 200 + half of the first star
        let frame = at(&anim, 700);
        assert_eq!(frame.opacity, 1.0);
        assert_eq!(frame.star_scale[0], 0.5);
        assert_eq!(frame.star_scale[1], 0.0);

        let frame = at(&anim, 1500);
        assert_eq!(frame.star_scale[0], 1.0);
        assert_eq!(frame.star_scale[1], 1.0);
        assert_eq!(frame.star_scale[2], 0.0);
    }

    #[test]
    fn test_unearned_stars_stay_empty() {
        let anim = ResultAnimation::start(Instant::now(), 1, 500);
        let frame = at(&anim, 10_000);

        assert_eq!(frame.star_scale, [1.0, 0.0, 0.0]);
        assert_eq!(frame.shown_points, 500);
        assert!(frame.done);
    }

    #[test]
    fn test_count_up() {
        let anim = ResultAnimation::start(Instant::now(), 1, 800);
        // count starts at 300 + 200 + 400 = 900
        assert_eq!(at(&anim, 900).shown_points, 0);
        assert_eq!(at(&anim, 1300).shown_points, 400);
        assert_eq!(at(&anim, 1700).shown_points, 800);
    }

    #[test]
    fn test_duration_depends_on_stars() {
        let now = Instant::now();
        assert_eq!(
            ResultAnimation::start(now, 1, 0).duration(),
            Duration::from_millis(1700)
        );
        assert_eq!(
            ResultAnimation::start(now, 3, 0).duration(),
            Duration::from_millis(2900)
        );
    }

    #[test]
    fn test_sparkles_only_for_three_stars() {
        let now = Instant::now();
        assert!(ResultAnimation::start(now, 2, 0).sparkles.is_empty());

        let anim = ResultAnimation::start(now, 3, 0);
        assert_eq!(anim.sparkles.len(), SPARKLE_COUNT);
        assert!(anim.sparkles.iter().all(|s| (0.0..1.0).contains(&s.x)));
        assert!(anim.visible_sparkles(now).count() <= SPARKLE_COUNT);
    }
}
