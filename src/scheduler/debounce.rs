use std::time::{Duration, Instant};

/// Trailing-edge debouncer.
///
/// Each [`trigger`](Debouncer::trigger) replaces the pending request with a
/// new generation due `delay` after the call. [`poll`](Debouncer::poll)
/// fires at most once per burst, for the last generation, once the quiet
/// window has elapsed. Time is passed in so callers (and tests) control it.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    generation: u64,
    pending: Option<Pending>,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    generation: u64,
    due: Instant,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm (or re-arm) the timer; returns the generation of the new request.
    pub fn trigger(&mut self, now: Instant) -> u64 {
        self.generation += 1;
        self.pending = Some(Pending {
            generation: self.generation,
            due: now + self.delay,
        });
        self.generation
    }

    /// Drop the pending request, if any. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending request becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.due)
    }

    /// Fire the pending request if its quiet window has passed.
    pub fn poll(&mut self, now: Instant) -> Option<u64> {
        match self.pending {
            Some(p) if now >= p.due => {
                self.pending = None;
                Some(p.generation)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(200);

    #[test]
    fn burst_fires_once_for_the_last_trigger() {
        let start = Instant::now();
        let mut d = Debouncer::new(DELAY);
        let mut last = 0;
        for i in 0..20 {
            let now = start + Duration::from_millis(i * 5);
            last = d.trigger(now);
            assert_eq!(d.poll(now), None);
        }
        let end = start + Duration::from_millis(95);
        assert_eq!(d.poll(end + DELAY - Duration::from_millis(1)), None);
        assert_eq!(d.poll(end + DELAY), Some(last));
        assert_eq!(d.poll(end + DELAY * 10), None);
    }

    #[test]
    fn steady_stream_fires_after_it_stops() {
        let start = Instant::now();
        let mut d = Debouncer::new(DELAY);
        let mut now = start;
        for _ in 0..100 {
            d.trigger(now);
            now += DELAY / 2;
            assert_eq!(d.poll(now), None);
        }
        assert!(d.poll(now + DELAY).is_some());
    }

    #[test]
    fn cancel_discards_pending() {
        let start = Instant::now();
        let mut d = Debouncer::new(DELAY);
        d.trigger(start);
        assert!(d.is_pending());
        assert!(d.cancel());
        assert!(!d.cancel());
        assert!(!d.is_pending());
        assert_eq!(d.deadline(), None);
        assert_eq!(d.poll(start + DELAY), None);
    }
}
