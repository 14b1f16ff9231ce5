use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::GameError;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    ValueEnum,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
    Expert,
}

/// Upper bounds, in seconds, for each speed rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedThresholds {
    pub gold: u32,
    pub silver: u32,
    pub bronze: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyConfig {
    pub label: &'static str,
    pub option_count: usize,
    /// 0 means untimed
    pub time_limit_secs: u32,
    pub penalty_secs: u32,
    pub speed: SpeedThresholds,
}

const EASY: DifficultyConfig = DifficultyConfig {
    label: "Easy",
    option_count: 4,
    time_limit_secs: 0,
    penalty_secs: 0,
    speed: SpeedThresholds {
        gold: 120,
        silver: 180,
        bronze: 240,
    },
};

const MEDIUM: DifficultyConfig = DifficultyConfig {
    label: "Medium",
    option_count: 6,
    time_limit_secs: 90,
    penalty_secs: 3,
    speed: SpeedThresholds {
        gold: 60,
        silver: 75,
        bronze: 90,
    },
};

const HARD: DifficultyConfig = DifficultyConfig {
    label: "Hard",
    option_count: 8,
    time_limit_secs: 60,
    penalty_secs: 5,
    speed: SpeedThresholds {
        gold: 40,
        silver: 50,
        bronze: 60,
    },
};

const EXPERT: DifficultyConfig = DifficultyConfig {
    label: "Expert",
    option_count: 8,
    time_limit_secs: 45,
    penalty_secs: 10,
    speed: SpeedThresholds {
        gold: 30,
        silver: 38,
        bronze: 45,
    },
};

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    pub fn config(self) -> &'static DifficultyConfig {
        match self {
            Difficulty::Easy => &EASY,
            Difficulty::Medium => &MEDIUM,
            Difficulty::Hard => &HARD,
            Difficulty::Expert => &EXPERT,
        }
    }

    /// Point multiplier expressed in halves (1x = 2, 1.5x = 3, ...), so that
    /// flooring stays exact in integer arithmetic.
    pub fn multiplier_halves(self) -> u32 {
        match self {
            Difficulty::Easy => 2,
            Difficulty::Medium => 3,
            Difficulty::Hard => 4,
            Difficulty::Expert => 5,
        }
    }

    pub fn multiplier(self) -> f64 {
        self.multiplier_halves() as f64 / 2.0
    }

    pub fn is_timed(self) -> bool {
        self.config().time_limit_secs > 0
    }

    /// Position in the menu, 0-based.
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|d| *d == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GameError::UnknownDifficulty(s.to_string()))
    }
}

/// Classification of total elapsed time against a tier's thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SpeedRank {
    Gold,
    Silver,
    Bronze,
    None,
}

impl SpeedRank {
    pub fn icon(self) -> &'static str {
        match self {
            SpeedRank::Gold => "🥇",
            SpeedRank::Silver => "🥈",
            SpeedRank::Bronze => "🥉",
            SpeedRank::None => "",
        }
    }
}
