use std::time::{Duration, Instant};

// InactivityTimer ends an idle desk session. It is polled rather than scheduled: the
// desk ticks it and runs the session end when it reports having fired. A fired timer
// stays disarmed until the next activity.
#[derive(Debug, Clone, Default)]
pub(crate) struct InactivityTimer {
    period: Option<Duration>,
    deadline: Option<Instant>,
}

impl InactivityTimer {
    // None switches the timer off
    pub(crate) fn configure(&mut self, period: Option<Duration>, now: Instant) {
        self.period = period;
        self.deadline = period.map(|p| now + p);
    }

    pub(crate) fn touch(&mut self, now: Instant) {
        self.deadline = self.period.map(|p| now + p);
    }

    // true exactly once per armed deadline
    pub(crate) fn fired(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }
}
