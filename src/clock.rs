use std::time::Duration;

use tracing::trace;

/// Phase deadlines the clock can deliver back to the game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClockEvent {
    CountdownTick,
    DisplayElapsed,
    FeedbackElapsed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// A timer that reached its deadline
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FiredTimer {
    pub id: TimerId,
    pub event: ClockEvent,
    /// Session the timer was scheduled for
    pub session_id: u64,
    pub due: Duration,
}

#[derive(Clone, Copy, Debug)]
struct Scheduled {
    id: TimerId,
    due: Duration,
    event: ClockEvent,
    session_id: u64,
}

/// Cooperative scheduler on a virtual timeline.
///
/// Nothing runs on its own: the owner moves time forward and pulls due
/// timers out one at a time with [`TrialClock::pop_due`], handling each to
/// completion before asking for the next. Cancelling drops every pending
/// timer at once; fired timers carry their session id so a stale one can be
/// told apart.
#[derive(Debug, Default)]
pub struct TrialClock {
    now: Duration,
    next_id: u64,
    pending: Vec<Scheduled>,
}

impl TrialClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed on this clock
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule(&mut self, after: Duration, event: ClockEvent, session_id: u64) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let due = self.now + after;
        self.pending.push(Scheduled {
            id,
            due,
            event,
            session_id,
        });
        trace!(?id, ?event, session_id, ?due, "timer scheduled");
        id
    }

    /// Drop every pending timer, returning how many were dropped
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        if dropped > 0 {
            trace!(dropped, "timers cancelled");
        }
        dropped
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Remaining time until a timer for `event` fires, if one is pending
    pub fn remaining(&self, event: ClockEvent) -> Option<Duration> {
        self.pending
            .iter()
            .filter(|t| t.event == event)
            .map(|t| t.due.saturating_sub(self.now))
            .min()
    }

    /// Remove and return the earliest timer due at or before `until`.
    ///
    /// The clock moves to that timer's deadline, so anything the caller
    /// schedules while handling it is measured from the right instant.
    /// Timers with equal deadlines fire in the order they were scheduled.
    pub fn pop_due(&mut self, until: Duration) -> Option<FiredTimer> {
        let (pos, _) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| (t.due, t.id))?;

        let timer = self.pending.remove(pos);
        self.now = self.now.max(timer.due);
        trace!(id = ?timer.id, event = ?timer.event, "timer fired");
        Some(FiredTimer {
            id: timer.id,
            event: timer.event,
            session_id: timer.session_id,
            due: timer.due,
        })
    }

    /// Move the clock to `until` once every due timer has been popped
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}
