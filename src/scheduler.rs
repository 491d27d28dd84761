//! Cooperative periodic task table
//!
//! Everything runs on one thread. The screen polls the scheduler with the
//! current time, runs whatever is due, then sleeps until [`Scheduler::next_due`].

use alloc::vec::Vec;

use embassy_time::{Duration, Instant};

use crate::ui::core::WidgetId;

/// Periodic work driven by the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Read the touch panel and advance the router
    SampleTouch,
    /// Redraw a clock widget
    Refresh(WidgetId),
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    task: Task,
    period: Duration,
    next_due: Instant,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    entries: Vec<Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` every `period`, first at `first_due`. Replaces an existing
    /// schedule for the same task.
    pub fn schedule(&mut self, task: Task, period: Duration, first_due: Instant) {
        let entry = Entry {
            task,
            period,
            next_due: first_due,
        };
        match self.entries.iter_mut().find(|e| e.task == task) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Stop running `task`. Returns whether it was scheduled.
    pub fn cancel(&mut self, task: Task) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.task != task);
        self.entries.len() != before
    }

    pub fn contains(&self, task: Task) -> bool {
        self.entries.iter().any(|e| e.task == task)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest due time of any task.
    pub fn next_due(&self) -> Option<Instant> {
        self.entries.iter().map(|e| e.next_due).min()
    }

    /// Tasks due at `now`, in scheduling order, each at most once.
    ///
    /// A task that fell more than one period behind skips the missed runs
    /// and is next due one period after `now`.
    pub fn pop_due(&mut self, now: Instant) -> Vec<Task> {
        let mut due = Vec::new();
        for entry in self.entries.iter_mut().filter(|e| e.next_due <= now) {
            due.push(entry.task);
            entry.next_due += entry.period;
            if entry.next_due <= now {
                entry.next_due = now + entry.period;
            }
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    #[test]
    fn test_tasks_run_once_per_poll() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Task::SampleTouch, Duration::from_millis(50), at(0));
        assert_eq!(scheduler.next_due(), Some(at(0)));

        assert_eq!(scheduler.pop_due(at(0)), [Task::SampleTouch]);
        assert!(scheduler.pop_due(at(0)).is_empty());
        assert_eq!(scheduler.next_due(), Some(at(50)));

        // Far behind: one run, then rescheduled from now.
        assert_eq!(scheduler.pop_due(at(500)), [Task::SampleTouch]);
        assert_eq!(scheduler.next_due(), Some(at(550)));
    }

    #[test]
    fn test_reschedule_and_cancel() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Task::SampleTouch, Duration::from_millis(50), at(0));
        scheduler.schedule(Task::SampleTouch, Duration::from_millis(20), at(10));
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.next_due(), Some(at(10)));

        assert!(scheduler.cancel(Task::SampleTouch));
        assert!(!scheduler.cancel(Task::SampleTouch));
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.next_due(), None);
    }
}
