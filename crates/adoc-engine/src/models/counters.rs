use std::fmt;

/// Section numbering state, one slot per section level (0–5).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionCounters {
    nums: [u32; 6],
    curr: usize,
}

impl SectionCounters {
    pub const MAX_LEVEL: usize = 5;

    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the counter at `level` and resets all deeper levels.
    ///
    /// A jump of more than one level below the current one is clamped to
    /// `curr + 1`, so `== A` followed by `==== B` numbers `B` as `1.1.`.
    pub fn set(&mut self, level: usize) -> &Self {
        let level = level.min(self.curr + 1).min(Self::MAX_LEVEL);
        self.nums[level] += 1;
        for n in &mut self.nums[level + 1..] {
            *n = 0;
        }
        self.curr = level;
        self
    }

    pub fn level(&self) -> usize {
        self.curr
    }

    pub fn get(&self, level: usize) -> u32 {
        self.nums.get(level).copied().unwrap_or(0)
    }
}

impl fmt::Display for SectionCounters {
    /// Prints `1.2.` style numbers for levels 1..=curr.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for n in &self.nums[1..=self.curr] {
            write!(f, "{n}.")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_sections() {
        let mut c = SectionCounters::new();
        assert_eq!(c.set(1).to_string(), "1.");
        assert_eq!(c.set(2).to_string(), "1.1.");
        assert_eq!(c.set(2).to_string(), "1.2.");
        assert_eq!(c.set(3).to_string(), "1.2.1.");
        assert_eq!(c.set(1).to_string(), "2.");
        assert_eq!(c.set(2).to_string(), "2.1.");
    }

    #[test]
    fn skipped_level_is_clamped() {
        let mut c = SectionCounters::new();
        c.set(1);
        assert_eq!(c.set(3).to_string(), "1.1.");
        assert_eq!(c.level(), 2);
    }

    #[test]
    fn deeper_slots_reset() {
        let mut c = SectionCounters::new();
        c.set(1);
        c.set(2);
        c.set(3);
        c.set(2);
        assert_eq!(c.get(3), 0);
        assert_eq!(c.get(2), 2);
    }

    #[test]
    fn monotonic_at_set_level() {
        let mut c = SectionCounters::new();
        let levels = [1, 2, 2, 3, 3, 2, 1, 2, 3, 4, 5, 5, 1];
        for &l in &levels {
            assert!(l <= c.level() + 1);
            let before = c.get(l);
            c.set(l);
            assert_eq!(c.get(l), before + 1);
            for d in l + 1..=SectionCounters::MAX_LEVEL {
                assert_eq!(c.get(d), 0);
            }
        }
    }
}
