//! Trellis: a self-registering unit-test framework with nested subtests.
//!
//! Tests are declared with [`test!`] anywhere in a binary and collected at
//! link time. Within a test, [`subtest!`] sections form a tree; the runner
//! invokes the test body once per leaf of that tree, re-executing the shared
//! prefix each time, so setup written above a subtest runs fresh for every
//! leaf beneath it.

pub use crate::errors::{Abort, Outcome, RunError};
pub use crate::registry::{register, registered, Test, TestFn};
pub use crate::runner::{run, RunOptions, RunSummary, Runner, TestRecord};
pub use crate::session::{Counters, Session};
pub use crate::tag::Tag;

pub mod abort;
pub mod assert;
pub mod capture;
pub mod cli;
pub mod errors;
pub mod path;
pub mod registry;
pub mod runner;
pub mod session;
pub mod tag;
pub mod traversal;
pub mod visited;

mod macros;

#[doc(hidden)]
pub mod __private {
    pub use crate::registry::TESTS;
    pub use linkme::{self, distributed_slice};
}
