use std::io::{self, Write};

/// Alternating wait/vibrate durations in milliseconds, starting with a
/// vibration when there is a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VibrationPattern(pub &'static [u32]);

impl VibrationPattern {
    pub const CORRECT: Self = Self(&[50]);
    pub const WRONG: Self = Self(&[0, 100, 50, 100]);
    pub const COMPLETE: Self = Self(&[0, 100, 100, 100, 100, 100]);
    pub const TWO_STARS: Self = Self(&[0, 100, 100, 100]);
    pub const ONE_STAR: Self = Self(&[100]);

    pub fn for_stars(stars: u8) -> Self {
        match stars {
            3.. => Self::COMPLETE,
            2 => Self::TWO_STARS,
            _ => Self::ONE_STAR,
        }
    }

    /// Number of vibration pulses in the pattern.
    pub fn pulses(&self) -> usize {
        match self.0 {
            [_] => 1,
            many => many.iter().skip(1).step_by(2).filter(|ms| **ms > 0).count(),
        }
    }
}

/// Fire-and-forget haptic feedback.
pub trait Haptics: Send {
    fn vibrate(&mut self, pattern: VibrationPattern);
}

#[derive(Debug, Default)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn vibrate(&mut self, _pattern: VibrationPattern) {}
}

/// Terminals cannot vibrate; ring the bell once instead.
#[derive(Debug, Default)]
pub struct TerminalBell;

impl Haptics for TerminalBell {
    fn vibrate(&mut self, pattern: VibrationPattern) {
        if pattern.pulses() == 0 {
            return;
        }
        let mut out = io::stdout();
        if let Err(e) = out.write_all(b"\x07").and_then(|_| out.flush()) {
            log::trace!("terminal bell failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_pulses() {
        assert_eq!(VibrationPattern::CORRECT.pulses(), 1);
        assert_eq!(VibrationPattern::ONE_STAR.pulses(), 1);
        assert_eq!(VibrationPattern::WRONG.pulses(), 2);
        assert_eq!(VibrationPattern::TWO_STARS.pulses(), 2);
        assert_eq!(VibrationPattern::COMPLETE.pulses(), 3);
    }

    #[test]
    fn test_for_stars() {
        assert_eq!(VibrationPattern::for_stars(3), VibrationPattern::COMPLETE);
        assert_eq!(VibrationPattern::for_stars(2), VibrationPattern::TWO_STARS);
        assert_eq!(VibrationPattern::for_stars(1), VibrationPattern::ONE_STAR);
    }
}
