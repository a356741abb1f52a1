//! Single slot tick scheduler.
//!
//! The game loop never sleeps inside a tick. It asks the timer to fire after
//! a delay and then polls it with the current instant; at most one tick is
//! outstanding at any time.

use std::time::{Duration, Instant};

/// Identifies one scheduled tick. Handles from before a `cancel` never
/// compare equal to ones issued after it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TickHandle {
    generation: u64,
}

#[derive(Debug, Default)]
pub struct TickTimer {
    generation: u64,
    pending: Option<(TickHandle, Instant)>,
}

impl TickTimer {
    pub fn new() -> Self {
        TickTimer::default()
    }

    /// Replaces any pending tick.
    pub fn schedule(&mut self, delay: Duration, now: Instant) -> TickHandle {
        self.generation += 1;
        let handle = TickHandle { generation: self.generation };
        self.pending = Some((handle, now + delay));
        handle
    }

    pub fn cancel(&mut self) {
        if self.pending.take().is_some() {
            self.generation += 1;
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn due_at(&self) -> Option<Instant> {
        self.pending.map(|(_, due)| due)
    }

    /// Takes the pending tick if it is due by `now`.
    pub fn poll(&mut self, now: Instant) -> Option<TickHandle> {
        match self.pending {
            Some((handle, due)) if due <= now => {
                self.pending = None;
                Some(handle)
            }
            _ => None,
        }
    }

    pub fn is_current(&self, handle: TickHandle) -> bool {
        handle.generation == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(100);

    #[test]
    fn fires_once_when_due() {
        let start = Instant::now();
        let mut timer = TickTimer::new();
        let handle = timer.schedule(TICK, start);

        assert_eq!(timer.poll(start + Duration::from_millis(99)), None);
        assert_eq!(timer.poll(start + TICK), Some(handle));
        assert_eq!(timer.poll(start + TICK * 2), None);
        assert!(!timer.is_pending());
    }

    #[test]
    fn cancel_drops_pending_tick() {
        let start = Instant::now();
        let mut timer = TickTimer::new();
        let stale = timer.schedule(TICK, start);

        timer.cancel();
        assert!(!timer.is_pending());
        assert_eq!(timer.poll(start + TICK), None);
        assert!(!timer.is_current(stale));

        let fresh = timer.schedule(Duration::ZERO, start);
        assert_ne!(stale, fresh);
        assert!(timer.is_current(fresh));
    }

    #[test]
    fn reschedule_replaces_pending() {
        let start = Instant::now();
        let mut timer = TickTimer::new();
        let first = timer.schedule(TICK, start);
        let second = timer.schedule(TICK * 3, start);

        assert!(!timer.is_current(first));
        assert_eq!(timer.poll(start + TICK), None);
        assert_eq!(timer.due_at(), Some(start + TICK * 3));
        assert_eq!(timer.poll(start + TICK * 3), Some(second));
    }
}
