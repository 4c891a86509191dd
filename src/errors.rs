//! Error types for the Trellis runner.
//!
//! Only malformed invocations are fatal to a run; they are represented by
//! [`RunError`], which carries `miette` diagnostic codes and help so the CLI
//! can render them the same way as any other diagnostic. Failing tests are
//! never errors: they are counted and reported, and the run continues.
//!
//! [`Abort`] is the one control-flow value of the engine. A required
//! assertion that fails returns it, and the declaration macros propagate it
//! with `?` back to the runner's per-test checkpoint.

use miette::Diagnostic;
use thiserror::Error;

/// Signals that the current test invocation must stop immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Abort;

/// Result of one invocation of a test body.
pub type Outcome = Result<(), Abort>;

/// Fatal problems that stop a run before any test executes.
#[derive(Error, Diagnostic, Debug)]
pub enum RunError {
    #[error("Invalid number of partitions {count}, value should be between 1 and {tests}")]
    #[diagnostic(
        code(trellis::partition::count),
        help("pass a partition count no larger than the number of selected tests")
    )]
    PartitionCount { count: usize, tests: usize },

    #[error("Invalid current partition {index}, value should be between 1 and {count} inclusive")]
    #[diagnostic(
        code(trellis::partition::index),
        help("partitions are numbered from 1")
    )]
    PartitionIndex { index: usize, count: usize },

    #[error("No tests found")]
    #[diagnostic(
        code(trellis::registry::empty),
        help("declare tests with `trellis::test!` or relax the tag filter")
    )]
    NoTests,

    #[error("Failed to redirect stdout")]
    #[diagnostic(
        code(trellis::capture::redirect),
        help("run with `--output` to leave stdout untouched")
    )]
    Capture(#[source] std::io::Error),
}
