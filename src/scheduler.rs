//! Timers on the simulation clock
//!
//! The clock only moves when the simulation ticks, so a paused or slow host
//! never fires a backlog of stale timers and tests can step time exactly.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Timer<E> {
    id: TimerId,
    due: f64,
    interval: Option<f64>,
    event: E,
}

#[derive(Debug)]
pub struct Scheduler<E> {
    now: f64,
    next_id: u64,
    timers: Vec<Timer<E>>,
}

impl<E: Clone> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            next_id: 0,
            timers: Vec::new(),
        }
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Fires `event` once, `delay` seconds from now.
    pub fn once(&mut self, delay: f32, event: E) -> TimerId {
        self.insert(delay as f64, None, event)
    }

    /// Fires `event` every `interval` seconds, first after one interval.
    pub fn every(&mut self, interval: f32, event: E) -> TimerId {
        let interval = interval as f64;
        self.insert(interval, Some(interval), event)
    }

    fn insert(&mut self, delay: f64, interval: Option<f64>, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            due: self.now + delay.max(0.0),
            interval,
            event,
        });
        id
    }

    /// Returns whether the timer was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.id != id);
        self.timers.len() != before
    }

    /// Moves the clock forward and returns the events that came due, in
    /// due order. A repeating timer fires once per elapsed interval.
    pub fn advance(&mut self, dt: f32) -> Vec<E> {
        self.now += dt as f64;

        let mut fired: Vec<(f64, u64, E)> = Vec::new();
        let now = self.now;
        self.timers.retain_mut(|timer| {
            while timer.due <= now {
                fired.push((timer.due, timer.id.0, timer.event.clone()));
                match timer.interval {
                    Some(interval) if interval > 0.0 => timer.due += interval,
                    _ => return false,
                }
            }
            true
        });

        fired.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        fired.into_iter().map(|(_, _, event)| event).collect()
    }
}

impl<E: Clone> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_fires_once() {
        let mut scheduler = Scheduler::new();
        scheduler.once(0.5, "boom");

        assert!(scheduler.advance(0.4).is_empty());
        assert_eq!(scheduler.advance(0.1), vec!["boom"]);
        assert!(scheduler.advance(10.0).is_empty());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn repeating_fires_per_interval() {
        let mut scheduler = Scheduler::new();
        scheduler.every(1.5, 'a');

        assert!(scheduler.advance(1.0).is_empty());
        assert_eq!(scheduler.advance(0.5), vec!['a']);
        assert_eq!(scheduler.advance(3.0), vec!['a', 'a']);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn events_come_out_in_due_order() {
        let mut scheduler = Scheduler::new();
        scheduler.once(0.3, 3);
        scheduler.once(0.1, 1);
        scheduler.once(0.2, 2);
        assert_eq!(scheduler.advance(1.0), vec![1, 2, 3]);
    }

    #[test]
    fn cancel_removes_only_that_timer() {
        let mut scheduler = Scheduler::new();
        let repeating = scheduler.every(1.0, "tick");
        scheduler.once(0.5, "later");

        assert!(scheduler.cancel(repeating));
        assert!(!scheduler.cancel(repeating));
        assert_eq!(scheduler.advance(2.0), vec!["later"]);
    }
}
