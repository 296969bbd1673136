//! Wait budget and its decomposition into polling slices

use std::time::Duration;

/// Total time the caller is willing to wait (None = indefinitely)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeBudget {
    total: Option<Duration>,
}

impl TimeBudget {
    pub fn new(total: Option<Duration>) -> Self {
        Self { total }
    }

    /// Budget that never runs out
    pub fn unbounded() -> Self {
        Self { total: None }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Some(Duration::from_millis(ms)))
    }

    pub fn total(&self) -> Option<Duration> {
        self.total
    }

    /// Break the budget into slices no longer than `max_slice`.
    ///
    /// A bounded budget yields full slices followed by one shorter remainder
    /// (skipped when zero), summing exactly to the total. An unbounded budget
    /// yields `max_slice` forever. `max_slice` must be non-zero.
    pub fn slices(&self, max_slice: Duration) -> Slices {
        Slices {
            remaining: self.total,
            max_slice,
        }
    }
}

/// Ordered slice durations for one budget; clone to restart
#[derive(Debug, Clone)]
pub struct Slices {
    remaining: Option<Duration>,
    max_slice: Duration,
}

impl Iterator for Slices {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        match self.remaining {
            None => Some(self.max_slice),
            Some(remaining) if remaining.is_zero() || self.max_slice.is_zero() => None,
            Some(remaining) => {
                let slice = remaining.min(self.max_slice);
                self.remaining = Some(remaining - slice);
                Some(slice)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining {
            None => (usize::MAX, None),
            Some(_) if self.max_slice.is_zero() => (0, Some(0)),
            Some(remaining) => {
                let max = self.max_slice.as_nanos();
                let count = remaining.as_nanos().div_ceil(max);
                let count = usize::try_from(count).unwrap_or(usize::MAX);
                (count, Some(count))
            }
        }
    }
}
