use std::time::{Duration, Instant};

/// A single-shot timer which is pushed back every time it is armed again.
/// It rings once `delay` has elapsed since the last `arm`, and stays silent
/// after `disarm` until armed again.
#[derive(Clone, Debug)]
pub struct DebounceTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl DebounceTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn ringing(&self, now: &Instant) -> bool {
        match self.deadline {
            Some(deadline) => *now >= deadline,
            None => false,
        }
    }

    /// Returns true and disarms if the timer is ringing.
    pub fn take_ringing(&mut self, now: &Instant) -> bool {
        if self.ringing(now) {
            self.deadline = None;
            return true;
        }
        false
    }
}
