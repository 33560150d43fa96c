//! Page-owned timer queue
//!
//! Deferred work (fade-outs, flash resets, the refresh cycle) is queued here
//! and fired by `Page::advance` in deadline order; equal deadlines fire in
//! the order they were scheduled.

use std::collections::BTreeMap;

use tokio::time::Instant;

use crate::dom::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerTask {
    /// Hide the cookie notice after its fade-out
    CookieFadeComplete,
    /// Periodic indicator highlight cycle
    IndicatorRefresh,
    /// Clear an indicator's highlight
    FlashReset { node: NodeId },
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    entries: BTreeMap<(Instant, u64), TimerTask>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, deadline: Instant, task: TimerTask) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert((deadline, seq), task);
    }

    /// Remove the earliest task due at or before `now`
    pub fn pop_due(&mut self, now: Instant) -> Option<(Instant, TimerTask)> {
        let (&(deadline, seq), _) = self.entries.iter().next()?;
        if deadline > now {
            return None;
        }
        self.entries
            .remove(&(deadline, seq))
            .map(|task| (deadline, task))
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.keys().next().map(|(deadline, _)| *deadline)
    }

    pub fn contains(&self, task: &TimerTask) -> bool {
        self.entries.values().any(|t| t == task)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_fires_in_deadline_then_schedule_order() {
        let mut queue = TimerQueue::new();
        let start = Instant::now();
        queue.schedule(start + Duration::from_millis(300), TimerTask::IndicatorRefresh);
        queue.schedule(start + Duration::from_millis(100), TimerTask::CookieFadeComplete);
        let same = start + Duration::from_millis(300);
        let first = NodeId::from_index(1);
        queue.schedule(same, TimerTask::FlashReset { node: first });

        let later = start + Duration::from_secs(1);
        assert_eq!(queue.pop_due(later).map(|(_, t)| t), Some(TimerTask::CookieFadeComplete));
        assert_eq!(queue.pop_due(later).map(|(_, t)| t), Some(TimerTask::IndicatorRefresh));
        assert_eq!(
            queue.pop_due(later).map(|(_, t)| t),
            Some(TimerTask::FlashReset { node: first })
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_not_due_yet() {
        let mut queue = TimerQueue::new();
        let start = Instant::now();
        queue.schedule(start + Duration::from_millis(500), TimerTask::CookieFadeComplete);
        assert!(queue.pop_due(start + Duration::from_millis(499)).is_none());
        assert_eq!(queue.next_deadline(), Some(start + Duration::from_millis(500)));
    }
}
