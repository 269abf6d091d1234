use std::time::{Duration, Instant};

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Fixed-rate pacer for one loop.
///
/// Each iteration is bracketed by [`Pacer::begin`] and [`Pacer::finish`]. The
/// residual returned by `finish` is both the time the loop should sleep and the
/// elapsed value reported to the next callback.
///
/// The elapsed value is "time left over from the previous iteration", not a
/// measured delta since the last callback. Callers that need real delta-time
/// should measure it themselves.
#[derive(Debug, Clone)]
pub struct Pacer {
    period: Duration,
    residual: Duration,
    iterations: u64,
}

impl Pacer {
    /// Creates a pacer for `rate` iterations per second.
    ///
    /// The period is truncated to whole nanoseconds. A rate of zero is treated
    /// as one (settings validation rejects zero before a loop is built).
    pub fn from_rate(rate: u32) -> Self {
        let rate = u64::from(rate.max(1));
        Self::with_period(Duration::from_nanos(NANOS_PER_SEC / rate))
    }

    pub fn with_period(period: Duration) -> Self {
        Self {
            period,
            residual: Duration::ZERO,
            iterations: 0,
        }
    }

    /// Target duration of one iteration.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Residual of the previous iteration; zero before the first one finishes.
    pub fn elapsed(&self) -> Duration {
        self.residual
    }

    /// Number of completed iterations.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Marks the start of an iteration.
    pub fn begin(&self) -> Instant {
        Instant::now()
    }

    /// Closes the iteration started at `started` and returns the residual.
    pub fn finish(&mut self, started: Instant) -> Duration {
        self.finish_after(started.elapsed())
    }

    /// Closes an iteration whose work took `spent`.
    pub fn finish_after(&mut self, spent: Duration) -> Duration {
        self.residual = residual(self.period, spent);
        self.iterations = self.iterations.wrapping_add(1);
        self.residual
    }

    /// Clears the carried residual, e.g. after a long suspension.
    pub fn reset(&mut self) {
        self.residual = Duration::ZERO;
    }
}

/// `period - spent`, floored at zero.
pub fn residual(period: Duration, spent: Duration) -> Duration {
    period.saturating_sub(spent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_is_inverse_of_rate() {
        assert_eq!(Pacer::from_rate(100).period(), Duration::from_millis(10));
        assert_eq!(Pacer::from_rate(1).period(), Duration::from_secs(1));
        // 1e9 / 60 truncated
        assert_eq!(Pacer::from_rate(60).period(), Duration::from_nanos(16_666_666));
    }

    #[test]
    fn zero_rate_is_clamped() {
        assert_eq!(Pacer::from_rate(0).period(), Duration::from_secs(1));
    }

    #[test]
    fn first_elapsed_is_zero() {
        let p = Pacer::from_rate(50);
        assert_eq!(p.elapsed(), Duration::ZERO);
        assert_eq!(p.iterations(), 0);
    }

    #[test]
    fn residual_carries_to_next_iteration() {
        let mut p = Pacer::from_rate(100);
        let r = p.finish_after(Duration::from_millis(3));
        assert_eq!(r, Duration::from_millis(7));
        assert_eq!(p.elapsed(), Duration::from_millis(7));
        assert_eq!(p.iterations(), 1);
    }

    #[test]
    fn overrun_floors_at_zero() {
        let mut p = Pacer::from_rate(100);
        assert_eq!(p.finish_after(Duration::from_millis(25)), Duration::ZERO);
        assert_eq!(p.elapsed(), Duration::ZERO);
    }

    #[test]
    fn reset_clears_residual_only() {
        let mut p = Pacer::from_rate(100);
        p.finish_after(Duration::from_millis(1));
        p.reset();
        assert_eq!(p.elapsed(), Duration::ZERO);
        assert_eq!(p.iterations(), 1);
    }

    #[test]
    fn finish_measures_wall_time() {
        let mut p = Pacer::with_period(Duration::from_secs(10));
        let started = p.begin();
        let r = p.finish(started);
        assert!(r <= Duration::from_secs(10));
        assert!(r > Duration::from_secs(9));
    }
}
