//! # Trellis: Process-wide Test Registry
//!
//! Tests declared with [`crate::test!`] are collected at link time into a
//! distributed slice, so no code has to run before `main` and no
//! registration order exists to depend on. The registry proper is created
//! lazily on first touch, seeded from that slice, and can be extended at
//! runtime with [`register`].
//!
//! ## Registry Invariant
//! The registry is append-only. Its order is unspecified (it depends on the
//! linker and on runtime call order); the runner imposes the deterministic
//! `(file, line)` order before anything executes.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use linkme::distributed_slice;
use once_cell::sync::Lazy;

use crate::errors::Outcome;
use crate::session::Session;
use crate::tag::Tag;

/// Entry point of a test body.
pub type TestFn = fn(&mut Session) -> Outcome;

/// A registered test: where it was declared and how to run it.
#[derive(Clone, Copy)]
pub struct Test {
    pub tag: &'static Tag,
    pub entry: TestFn,
}

impl Test {
    pub const fn new(entry: TestFn, tag: &'static Tag) -> Self {
        Self { tag, entry }
    }
}

impl fmt::Debug for Test {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Test").field("tag", &self.tag).finish()
    }
}

/// Tests declared in any crate linked into the binary.
#[doc(hidden)]
#[distributed_slice]
pub static TESTS: [Test] = [..];

static REGISTRY: Lazy<Mutex<Vec<Test>>> = Lazy::new(|| Mutex::new(TESTS.to_vec()));

/// Appends a test to the process-wide registry.
///
/// Safe to call at any point, including before anything else has touched
/// the registry.
pub fn register(entry: TestFn, tag: &'static Tag) {
    REGISTRY
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(Test::new(entry, tag));
}

/// Snapshot of every registered test, in registration order.
pub fn registered() -> Vec<Test> {
    REGISTRY
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Sorts tests by declaring file, then line.
pub fn sort_tests(tests: &mut [Test]) {
    tests.sort_by(|a, b| {
        a.tag
            .file
            .cmp(b.tag.file)
            .then(a.tag.line.cmp(&b.tag.line))
    });
}
