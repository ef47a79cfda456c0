use std::time::{Duration, Instant};

/// One-shot timer owned by the component that armed it. Cancelling (or
/// dropping the owner) before the deadline means the deferred work never runs.
#[derive(Debug, Default)]
pub struct Delay {
    deadline: Option<Instant>,
}

impl Delay {
    pub fn start(&mut self, now: Instant, duration: Duration) {
        self.deadline = Some(now + duration);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true exactly once, on the first poll at or past the deadline.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_at_deadline() {
        let t0 = Instant::now();
        let mut delay = Delay::default();
        assert!(!delay.poll(t0));

        delay.start(t0, Duration::from_millis(100));
        assert!(delay.is_pending());
        assert!(!delay.poll(t0 + Duration::from_millis(99)));
        assert!(delay.poll(t0 + Duration::from_millis(100)));
        assert!(!delay.is_pending());
        assert!(!delay.poll(t0 + Duration::from_millis(200)));
    }

    #[test]
    fn cancel_suppresses_firing() {
        let t0 = Instant::now();
        let mut delay = Delay::default();
        delay.start(t0, Duration::from_millis(100));
        delay.cancel();
        assert!(!delay.is_pending());
        assert!(!delay.poll(t0 + Duration::from_secs(1)));
    }

    #[test]
    fn restart_rearms_the_deadline() {
        let t0 = Instant::now();
        let mut delay = Delay::default();
        delay.start(t0, Duration::from_millis(100));
        assert!(delay.poll(t0 + Duration::from_millis(100)));

        delay.start(t0 + Duration::from_millis(100), Duration::from_millis(500));
        assert!(!delay.poll(t0 + Duration::from_millis(400)));
        assert!(delay.poll(t0 + Duration::from_millis(600)));
    }
}
