//! Subtest traversal across repeated invocations of one test body.
//!
//! A test body is re-run from the top until every leaf of its subtest tree
//! has been executed once. Nothing parses the tree up front; it is uncovered
//! one branch per invocation using three pieces of state:
//!
//! - the live path of entered subtests (reset every invocation),
//! - the frontier depth: once a new subtest is entered at depth `d`, any
//!   subtest met at a depth below `d + 1` during the same invocation is
//!   deferred, which forces the invocation to finish one branch only,
//! - the set of completed leaf paths (reset once per test), which makes
//!   already-finished branches skip on later invocations.
//!
//! A subtest is marked complete on exit only when nothing below it was
//! deferred during the invocation, so a parent is revisited until all of
//! its children are done. The number of invocations therefore equals the
//! number of leaf paths (or one, for a body without subtests).

use tracing::trace;

use crate::path::TagStack;
use crate::tag::Tag;
use crate::visited::VisitedPaths;

#[derive(Debug, Default)]
pub struct Traversal {
    path: TagStack,
    visited: VisitedPaths,
    frontier: usize,
    should_repeat: bool,
    entered: bool,
}

impl Traversal {
    pub fn new() -> Self {
        Self {
            path: TagStack::new(),
            ..Self::default()
        }
    }

    /// Forgets every completed path. Called once per test.
    pub fn begin_test(&mut self) {
        self.visited.clear();
        self.begin_invocation();
    }

    /// Resets per-invocation state before the body is called again.
    pub fn begin_invocation(&mut self) {
        self.path.clear();
        self.frontier = 0;
        self.should_repeat = false;
        self.entered = false;
    }

    /// Decides whether the subtest declared by `tag` runs in this invocation.
    ///
    /// Returns `true` when the body should execute; the caller must then
    /// call [`Traversal::exit`] once the body completes.
    pub fn enter(&mut self, tag: &'static Tag) -> bool {
        let depth = self.path.len();
        if depth < self.frontier {
            trace!(subtest = tag.desc, depth, "deferring subtest to a later invocation");
            self.should_repeat = true;
            return false;
        }

        self.path.push(tag);
        if self.visited.contains(self.path.fingerprint()) {
            trace!(subtest = tag.desc, depth, "skipping completed subtest");
            self.path.pop();
            return false;
        }

        trace!(subtest = tag.desc, depth, "entering subtest");
        self.frontier = depth + 1;
        self.entered = true;
        true
    }

    /// Leaves the innermost subtest, marking its path complete if no
    /// deeper work was deferred during this invocation.
    pub fn exit(&mut self) {
        if !self.entered {
            return;
        }
        if !self.should_repeat {
            let fingerprint = self.path.fingerprint();
            trace!(depth = self.path.len(), fingerprint, "marking subtest path complete");
            self.visited.mark(fingerprint);
        }
        self.path.pop();
    }

    /// Whether the body must be invoked again to reach unexplored leaves.
    pub fn should_repeat(&self) -> bool {
        self.should_repeat
    }

    /// The subtests enclosing the point of execution, outermost first.
    pub fn path(&self) -> &[&'static Tag] {
        self.path.as_slice()
    }

    /// Number of leaf paths completed so far in the current test.
    pub fn completed_paths(&self) -> usize {
        self.visited.len()
    }
}
