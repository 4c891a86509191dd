//! Set of completed subtest path fingerprints.

use rustc_hash::FxHashSet;

/// Fingerprints of subtest paths that have already run to completion for
/// the current test. Membership only grows until [`VisitedPaths::clear`]
/// is called at the start of the next test.
#[derive(Debug, Default)]
pub struct VisitedPaths {
    hashes: FxHashSet<u64>,
}

impl VisitedPaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a fingerprint. Returns `false` if it was already present.
    pub fn mark(&mut self, fingerprint: u64) -> bool {
        self.hashes.insert(fingerprint)
    }

    pub fn contains(&self, fingerprint: u64) -> bool {
        self.hashes.contains(&fingerprint)
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    pub fn clear(&mut self) {
        self.hashes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_is_idempotent() {
        let mut set = VisitedPaths::new();
        assert!(set.mark(42));
        assert!(!set.mark(42));
        assert_eq!(set.len(), 1);
        assert!(set.contains(42));
        assert!(!set.contains(7));
    }

    #[test]
    fn test_holds_many_entries() {
        let mut set = VisitedPaths::new();
        for i in 1..=1000u64 {
            set.mark(i.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        }
        assert_eq!(set.len(), 1000);
        for i in 1..=1000u64 {
            assert!(set.contains(i.wrapping_mul(0x9e37_79b9_7f4a_7c15)));
        }
        set.clear();
        assert!(set.is_empty());
    }
}
