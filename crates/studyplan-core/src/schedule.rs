use std::time::{Duration, Instant};

/// Fixed-period deadline polled by a single-threaded event loop.
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    period: Duration,
    next: Instant,
}

impl Interval {
    pub fn new(period: Duration, now: Instant) -> Self {
        let period = period.max(Duration::from_millis(1));
        Self {
            period,
            next: now + period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// True at most once per elapsed period. Missed periods are skipped
    /// rather than replayed.
    pub fn fire(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        while self.next <= now {
            self.next += self.period;
        }
        true
    }

    pub fn until_next(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }
}

/// Time to wait before the earliest of `intervals` is due.
pub fn next_wakeup(intervals: &[&Interval], now: Instant) -> Duration {
    intervals
        .iter()
        .map(|interval| interval.until_next(now))
        .min()
        .unwrap_or(Duration::from_secs(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_period() {
        let start = Instant::now();
        let mut tick = Interval::new(Duration::from_secs(60), start);

        assert!(!tick.fire(start + Duration::from_secs(59)));
        assert!(tick.fire(start + Duration::from_secs(60)));
        assert!(!tick.fire(start + Duration::from_secs(61)));
        assert!(tick.fire(start + Duration::from_secs(125)));
        assert_eq!(tick.until_next(start + Duration::from_secs(125)), Duration::from_secs(55));
    }

    #[test]
    fn wakeup_follows_earliest_interval() {
        let start = Instant::now();
        let clock = Interval::new(Duration::from_secs(1), start);
        let due = Interval::new(Duration::from_secs(60), start);
        assert_eq!(next_wakeup(&[&clock, &due], start), Duration::from_secs(1));
    }
}
