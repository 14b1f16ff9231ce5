use crate::difficulty::{Difficulty, SpeedRank, SpeedThresholds};

const BASE_POINTS: u32 = 100;
const COMBO_BONUS: u32 = 10;

/// Points awarded for a correct answer that brought the combo to `combo`.
pub fn compute_points(combo: u32, difficulty: Difficulty) -> u32 {
    let mut points = BASE_POINTS;
    if combo > 1 {
        points += combo * COMBO_BONUS;
    }

    points * difficulty.multiplier_halves() / 2
}

pub fn speed_rank(elapsed_secs: u32, thresholds: &SpeedThresholds) -> SpeedRank {
    if elapsed_secs <= thresholds.gold {
        SpeedRank::Gold
    } else if elapsed_secs <= thresholds.silver {
        SpeedRank::Silver
    } else if elapsed_secs <= thresholds.bronze {
        SpeedRank::Bronze
    } else {
        SpeedRank::None
    }
}

pub fn speed_stars(elapsed_secs: u32, thresholds: &SpeedThresholds) -> u8 {
    match speed_rank(elapsed_secs, thresholds) {
        SpeedRank::Gold => 3,
        SpeedRank::Silver => 2,
        SpeedRank::Bronze => 1,
        SpeedRank::None => 0,
    }
}

/// Accuracy stars for `correct` out of `total` (total > 0). Compared as
/// integers so 9/10 lands on the 90% boundary exactly.
pub fn accuracy_stars(correct: usize, total: usize) -> u8 {
    if correct >= total {
        3
    } else if correct * 10 >= total * 9 {
        2
    } else if correct * 4 >= total * 3 {
        1
    } else {
        0
    }
}

/// Average of speed and accuracy stars, rounded half up, never below one.
pub fn stars(speed: u8, accuracy: u8) -> u8 {
    ((speed + accuracy + 1) / 2).max(1)
}

pub fn accuracy_percent(correct: usize, total: usize) -> f64 {
    match total {
        0 => 0.0,
        t => correct as f64 / t as f64 * 100.0,
    }
}
