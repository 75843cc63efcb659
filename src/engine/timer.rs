//! Interval timers on a virtual clock.
//!
//! Timer-driven canvases register here. Nothing runs on its own: the host
//! loop (or a test) calls [`TimerQueue::pop_due`] repeatedly after moving the
//! clock forward, and runs each returned callback with no borrow held, so a
//! callback may start or cancel timers (a refresh does both).

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Identifies one started timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(pub(crate) u64);

pub type TimerCallback = Rc<dyn Fn()>;

struct Timer {
    id: TimerId,
    period: Duration,
    next_due: Duration,
    callback: TimerCallback,
}

pub struct TimerQueue {
    now: Duration,
    timers: Vec<Timer>,
    next_id: u64,
    min_period: Duration,
}

impl TimerQueue {
    /// Periods shorter than `min_period` are clamped up to it.
    pub fn new(min_period: Duration) -> Self {
        Self {
            now: Duration::ZERO,
            timers: Vec::new(),
            next_id: 0,
            min_period: min_period.max(Duration::from_nanos(1)),
        }
    }

    /// Time elapsed on the virtual clock.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Start a repeating timer; first fire is one period from now.
    pub fn start(&mut self, period: Duration, callback: TimerCallback) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let period = period.max(self.min_period);
        self.timers.push(Timer {
            id,
            period,
            next_due: self.now + period,
            callback,
        });
        id
    }

    /// Returns false if the timer was already cancelled (or never existed).
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.id != id);
        before != self.timers.len()
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.iter().any(|timer| timer.id == id)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Take the earliest timer due at or before `until`.
    ///
    /// Moves the clock to that timer's due time and schedules its next fire.
    /// Ties go to the timer started first.
    pub fn pop_due(&mut self, until: Duration) -> Option<TimerCallback> {
        let timer = self
            .timers
            .iter_mut()
            .filter(|timer| timer.next_due <= until)
            .min_by_key(|timer| (timer.next_due, timer.id.0))?;

        self.now = self.now.max(timer.next_due);
        timer.next_due += timer.period;
        Some(timer.callback.clone())
    }

    /// Move the clock to `until` once nothing more is due.
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}

impl fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerQueue")
            .field("now", &self.now)
            .field("active", &self.timers.len())
            .finish()
    }
}
