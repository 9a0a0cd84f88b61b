//! Upload version tracking.
//!
//! Materials bump their [`ChangeTracker`] on every property write, so a
//! caller can tell whether anything was re-uploaded between two frames.

/// Monotonic write counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeTracker {
    version: u64,
}

impl ChangeTracker {
    #[must_use]
    pub fn new() -> Self {
        Self { version: 0 }
    }

    /// Marks as modified, increments version by 1
    pub fn changed(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether a write happened after `seen` was sampled.
    #[inline]
    #[must_use]
    pub fn changed_since(&self, seen: u64) -> bool {
        self.version != seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changed_since_tracks_writes() {
        let mut tracker = ChangeTracker::new();
        let seen = tracker.version();
        assert!(!tracker.changed_since(seen));
        tracker.changed();
        assert!(tracker.changed_since(seen));
        assert_eq!(tracker.version(), 1);
    }
}
