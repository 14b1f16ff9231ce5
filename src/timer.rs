use std::time::{Duration, Instant};

/// Cancellable periodic callback, polled from the event loop.
///
/// Ticks are only delivered while armed. Disarming drops every pending tick,
/// and re-arming starts a fresh period, so a tick scheduled for one session
/// can never leak into the next.
#[derive(Debug, Clone)]
pub struct SecondTimer {
    period: Duration,
    next_due: Option<Instant>,
}

impl SecondTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    pub fn arm(&mut self, now: Instant) {
        self.next_due = Some(now + self.period);
    }

    pub fn disarm(&mut self) {
        self.next_due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Number of whole periods that came due since the last poll. Zero when
    /// disarmed.
    pub fn poll(&mut self, now: Instant) -> u32 {
        let Some(mut due) = self.next_due else {
            return 0;
        };

        let mut fired = 0;
        while due <= now {
            fired += 1;
            due += self.period;
        }
        self.next_due = Some(due);
        fired
    }
}

impl Default for SecondTimer {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
