use std::time::Instant;

/// Identifies one pending firing. Ids are never reused, so a stale handle
/// can't cancel a newer timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    Tick,
    ElapsedSecond,
}

#[derive(Debug)]
struct PendingTimer {
    handle: TimerHandle,
    due: Instant,
    task: TimerTask,
}

/// Poll-driven timer queue. Nothing fires on its own: the owner calls
/// `pop_due` with the current instant, typically once per UI frame.
#[derive(Debug, Default)]
pub struct Scheduler {
    pending: Vec<PendingTimer>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler::default()
    }

    pub fn schedule(&mut self, due: Instant, task: TimerTask) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.pending.push(PendingTimer { handle, due, task });
        handle
    }

    /// Returns false when the timer already fired or was cancelled before.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|timer| timer.handle != handle);
        self.pending.len() != before
    }

    /// Remove and return the earliest timer due at or before `now`.
    /// Timers due at the same instant come out in scheduling order.
    pub fn pop_due(&mut self, now: Instant) -> Option<(TimerHandle, Instant, TimerTask)> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due <= now)
            .min_by_key(|(_, timer)| (timer.due, timer.handle.0))
            .map(|(index, _)| index)?;

        let timer = self.pending.remove(index);
        Some((timer.handle, timer.due, timer.task))
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.pending.iter().map(|timer| timer.due).min()
    }

    pub fn due_of(&self, handle: TimerHandle) -> Option<Instant> {
        self.pending
            .iter()
            .find(|timer| timer.handle == handle)
            .map(|timer| timer.due)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn pending_of(&self, task: TimerTask) -> usize {
        self.pending.iter().filter(|timer| timer.task == task).count()
    }
}
