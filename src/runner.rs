//! The orchestrator: selects, orders and partitions tests, then drives each
//! one through as many invocations as its subtest tree needs.

use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};

use termcolor::ColorChoice;
use tracing::{debug, warn};

use crate::abort::{install_abort_handler, remove_abort_handler, take_abort_event};
use crate::capture;
use crate::cli::output::Reporter;
use crate::errors::RunError;
use crate::registry::{self, sort_tests, Test};
use crate::session::{Counters, Session};
use crate::tag::Tag;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Options for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Number of independent runner processes sharing the suite.
    pub partition_count: usize,
    /// Which partition this process runs, counted from 1.
    pub partition_index: usize,
    /// Print a line for every passing test.
    pub show_passed: bool,
    /// Hide test output unless it belongs to a failure.
    pub suppress_output: bool,
    /// Stop after the first failing test.
    pub stop_after_failure: bool,
    /// Keep only tests whose description contains one of these strings.
    pub tag_filter: Vec<String>,
    pub color: ColorChoice,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            partition_count: 1,
            partition_index: 1,
            show_passed: false,
            suppress_output: true,
            stop_after_failure: false,
            tag_filter: Vec::new(),
            color: ColorChoice::Auto,
        }
    }
}

// ============================================================================
// PLANNING
// ============================================================================

/// The tests a run will execute, after filtering, sorting and slicing.
#[derive(Debug)]
pub struct Plan {
    /// Tests in this partition, in execution order.
    pub tests: Vec<Test>,
    /// Number of tests that survived the filter.
    pub total: usize,
    /// Zero-based positions of `tests` within the sorted selection.
    pub range: Range<usize>,
}

/// Whether `tag` passes the description filter. An empty filter keeps all.
pub fn matches_filter(tag: &Tag, filter: &[String]) -> bool {
    filter.is_empty() || filter.iter().any(|f| tag.desc.contains(f.as_str()))
}

/// Contiguous slice of `total` sorted tests belonging to `index` of `count`.
///
/// Partitions are filled in order with `ceil(total / count)` tests each, so
/// trailing partitions may hold fewer, or none at all.
pub fn partition_range(total: usize, count: usize, index: usize) -> Result<Range<usize>, RunError> {
    if total == 0 {
        return Err(RunError::NoTests);
    }
    if count < 1 || count > total {
        return Err(RunError::PartitionCount { count, tests: total });
    }
    if index < 1 || index > count {
        return Err(RunError::PartitionIndex { index, count });
    }
    let size = total.div_ceil(count);
    let start = (size * (index - 1)).min(total);
    let end = (start + size).min(total);
    Ok(start..end)
}

/// Filters, validates, sorts and partitions `tests`.
pub fn plan(mut tests: Vec<Test>, options: &RunOptions) -> Result<Plan, RunError> {
    tests.retain(|t| matches_filter(t.tag, &options.tag_filter));
    let total = tests.len();
    let range = partition_range(total, options.partition_count, options.partition_index)?;

    sort_tests(&mut tests);
    let tests = tests[range.clone()].to_vec();
    debug!(total, start = range.start, end = range.end, "planned run");
    Ok(Plan { tests, total, range })
}

// ============================================================================
// EXECUTION
// ============================================================================

/// What happened to one executed test.
#[derive(Debug, Clone)]
pub struct TestRecord {
    pub tag: &'static Tag,
    /// Calls made to the test body.
    pub invocations: usize,
    pub failed: bool,
}

/// Totals and per-test records of a finished run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub counters: Counters,
    pub records: Vec<TestRecord>,
}

impl RunSummary {
    /// Process exit status: the number of failed tests.
    pub fn exit_code(&self) -> i32 {
        i32::try_from(self.counters.tests_failed).unwrap_or(i32::MAX)
    }
}

/// Drives a plan through a session.
pub struct Runner {
    options: RunOptions,
    session: Option<Session>,
}

impl Runner {
    pub fn new(options: RunOptions) -> Self {
        Self {
            options,
            session: None,
        }
    }

    /// Runs with a caller-provided session instead of the console.
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn run(self, tests: Vec<Test>) -> Result<RunSummary, RunError> {
        let plan = plan(tests, &self.options)?;
        let mut session = match self.session {
            Some(session) => session,
            None => {
                let capture =
                    capture::for_run(self.options.suppress_output).map_err(RunError::Capture)?;
                Session::new(Reporter::stdout(self.options.color), capture)
            }
        };
        execute(&plan, &self.options, &mut session)
    }
}

/// Runs every registered test with `options`.
pub fn run(options: RunOptions) -> Result<RunSummary, RunError> {
    Runner::new(options).run(registry::registered())
}

fn execute(plan: &Plan, options: &RunOptions, session: &mut Session) -> Result<RunSummary, RunError> {
    // Fail before the header if stdout cannot be redirected at all.
    session.enable_capture().map_err(RunError::Capture)?;
    session.disable_capture();

    let partition = (options.partition_count > 1).then(|| {
        (
            options.partition_index,
            plan.range.start,
            plan.range.end.saturating_sub(1),
        )
    });
    if let Err(e) = session
        .reporter()
        .header(plan.tests.len(), plan.total, partition)
    {
        warn!(error = %e, "failed to write run header");
    }

    let mut records = Vec::with_capacity(plan.tests.len());
    for test in &plan.tests {
        let record = run_test(session, test, options.show_passed);
        let failed = record.failed;
        records.push(record);
        if failed && options.stop_after_failure {
            debug!(test = test.tag.desc, "stopping after first failure");
            break;
        }
    }

    session.disable_capture();
    let counters = session.counters();
    if let Err(e) = session.reporter().summary(&counters) {
        warn!(error = %e, "failed to write summary");
    }
    Ok(RunSummary { counters, records })
}

/// Runs one test to completion: every leaf path, or until it aborts.
fn run_test(session: &mut Session, test: &Test, show_passed: bool) -> TestRecord {
    session.begin_test(test.tag);

    install_abort_handler();
    let caught = panic::catch_unwind(AssertUnwindSafe(|| {
        loop {
            session.begin_invocation();
            if (test.entry)(session).is_err() || !session.should_repeat() {
                break;
            }
        }
    }));
    remove_abort_handler();

    if let Err(payload) = caught {
        session.report_abort(take_abort_event(), payload.as_ref());
    }

    let invocations = session.invocations();
    let failed = session.finish_test(show_passed);
    debug!(test = test.tag.desc, invocations, failed, "finished test");
    TestRecord {
        tag: test.tag,
        invocations,
        failed,
    }
}
