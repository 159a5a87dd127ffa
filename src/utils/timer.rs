//! Sample accurate periodic events.

// -------------------------------------------------------------------------------------------------

/// Counts samples and fires every `interval` samples.
///
/// Feed it the length of each rendered block. Multiple events may fire within a single block,
/// see [`Self::tick_block`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalTimer {
    interval: usize,
    counter: usize,
}

impl IntervalTimer {
    /// Create a new timer. Intervals are clamped to at least one sample.
    pub fn new(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
            counter: 0,
        }
    }

    pub fn interval(&self) -> usize {
        self.interval
    }

    /// Change the interval. Applies to the next event. Clamped to at least one sample.
    ///
    /// When more samples than the new interval already passed since the last event, the next
    /// event fires right at the start of the next `tick`.
    pub fn set_interval(&mut self, interval: usize) {
        self.interval = interval.max(1);
    }

    /// Advance the timer by `samples`.
    ///
    /// Returns `None` when the timer did not fire. Else returns the number of samples which are
    /// left *after* the event, and restarts counting from the event. Pass the returned value to
    /// the next `tick` call to find further events in the same block.
    pub fn tick(&mut self, samples: usize) -> Option<usize> {
        self.counter += samples;
        if self.counter <= self.interval {
            return None;
        }
        // overdue events fire at the start of this tick
        let remaining = (self.counter - self.interval).min(samples);
        self.counter = 0;
        Some(remaining)
    }

    /// Advance the timer by a block of `block_len` samples and call `event` with the block
    /// offset of every event in this block. `event` may change the timer's interval.
    pub fn tick_block<F: FnMut(&mut Self, usize)>(&mut self, block_len: usize, mut event: F) {
        let mut samples = block_len;
        while let Some(remaining) = self.tick(samples) {
            event(self, block_len - remaining);
            samples = remaining;
        }
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick() {
        let mut timer = IntervalTimer::new(20);
        assert_eq!(timer.tick(10), None);
        assert_eq!(timer.tick(10), None);
        assert_eq!(timer.tick(10), Some(10));
        assert_eq!(timer.tick(10), None);
        assert_eq!(timer.tick(15), Some(5));

        assert_eq!(IntervalTimer::new(0).interval(), 1);
    }

    #[test]
    fn events_in_blocks() {
        let mut timer = IntervalTimer::new(20);
        let mut offsets = Vec::new();
        for block in 0..4 {
            timer.tick_block(32, |_, offset| offsets.push(block * 32 + offset));
        }
        assert_eq!(offsets, vec![20, 40, 60, 80, 100, 120]);
    }

    #[test]
    fn interval_changes_in_events() {
        let mut timer = IntervalTimer::new(4);
        let mut offsets = Vec::new();
        timer.tick_block(32, |timer, offset| {
            offsets.push(offset);
            timer.set_interval(timer.interval() * 2);
        });
        assert_eq!(offsets, vec![4, 12, 28]);
        assert_eq!(timer.interval(), 32);
    }

    #[test]
    fn interval_shrinks_between_blocks() {
        let mut timer = IntervalTimer::new(100);
        let mut offsets = Vec::new();
        timer.tick_block(64, |_, offset| offsets.push(offset));
        assert!(offsets.is_empty());

        // 64 samples passed already: the overdue event fires at the block start
        timer.set_interval(10);
        timer.tick_block(64, |_, offset| offsets.push(offset));
        assert_eq!(offsets, vec![0, 10, 20, 30, 40, 50, 60]);

        offsets.clear();
        timer.tick_block(64, |_, offset| offsets.push(offset));
        assert_eq!(offsets, vec![6, 16, 26, 36, 46, 56]);
    }
}
