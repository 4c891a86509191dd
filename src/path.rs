//! The ordered tag stack that tracks the active subtest path.

use crate::tag::Tag;

/// Avalanche mixer adapted from the MurmurHash3 finaliser.
fn mix(mut a: u64) -> u64 {
    a ^= a >> 33;
    a = a.wrapping_mul(0xff51_afd7_ed55_8ccd);
    a ^= a >> 33;
    a = a.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    a ^= a >> 33;
    a
}

/// Contribution of one tag at one stack position to a path fingerprint.
fn entry_hash(tag: &'static Tag, depth: usize) -> u64 {
    mix(tag.identity().wrapping_add(depth as u64))
}

/// The path from a test's root down to the currently active subtest.
///
/// The fingerprint is maintained incrementally: every entry contributes
/// `mix(identity + depth)` and contributions are XORed, so a push followed
/// by a pop restores the previous value exactly. An empty path hashes to 0.
#[derive(Debug, Default)]
pub struct TagStack {
    tags: Vec<&'static Tag>,
    fingerprint: u64,
}

impl TagStack {
    pub fn new() -> Self {
        Self::with_capacity(8)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tags: Vec::with_capacity(capacity),
            fingerprint: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn clear(&mut self) {
        self.tags.clear();
        self.fingerprint = 0;
    }

    pub fn push(&mut self, tag: &'static Tag) {
        self.fingerprint ^= entry_hash(tag, self.tags.len());
        self.tags.push(tag);
    }

    pub fn pop(&mut self) -> Option<&'static Tag> {
        let tag = self.tags.pop()?;
        self.fingerprint ^= entry_hash(tag, self.tags.len());
        Some(tag)
    }

    /// 64-bit fingerprint of the current path.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub fn as_slice(&self) -> &[&'static Tag] {
        &self.tags
    }
}
