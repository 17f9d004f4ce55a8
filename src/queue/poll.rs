use std::time::{Duration, Instant};

/// Periodic refresh of the seek position.
///
/// Only armed while a session is playing; `cancel` disarms it so a tick can
/// never reach a paused or released session.
#[derive(Debug, Clone)]
pub struct SeekPoll {
    interval: Duration,
    next_due: Option<Instant>,
}

impl SeekPoll {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            next_due: None,
        }
    }

    /// Arm (or re-arm) the poll starting from `now`.
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    /// Return true when a refresh is due at `now` and schedule the next one.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(at) if now >= at => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}
