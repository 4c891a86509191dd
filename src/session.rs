//! The explicit context handed to every test body.
//!
//! A [`Session`] bundles all state of a run: counters, the subtest
//! traversal, the output capture and the reporter. The runner owns it and
//! lends it to each invocation as `&mut Session`; the declaration macros
//! call into it for subtests and assertions.

use std::any::Any;
use std::fmt::Debug;

use tracing::warn;

use crate::abort::{payload_message, AbortEvent};
use crate::assert::{
    self, render_bool, render_relation, render_str, Case, Relation, Rendered, Severity, Site,
    StrOperand,
};
use crate::capture::{OutputCapture, Passthrough};
use crate::cli::output::{FailureReport, Reporter};
use crate::errors::{Abort, Outcome};
use crate::tag::Tag;
use crate::traversal::Traversal;

/// Process-wide totals for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub tests_ran: usize,
    pub tests_failed: usize,
    pub asserts: usize,
    pub asserts_failed: usize,
}

impl Counters {
    pub fn tests_passed(&self) -> usize {
        self.tests_ran - self.tests_failed
    }

    pub fn asserts_passed(&self) -> usize {
        self.asserts - self.asserts_failed
    }
}

pub struct Session {
    traversal: Traversal,
    counters: Counters,
    current: Option<&'static Tag>,
    current_failed: bool,
    invocations: usize,
    capture: Box<dyn OutputCapture>,
    reporter: Reporter,
}

impl Session {
    pub fn new(reporter: Reporter, capture: Box<dyn OutputCapture>) -> Self {
        Self {
            traversal: Traversal::new(),
            counters: Counters::default(),
            current: None,
            current_failed: false,
            invocations: 0,
            capture,
            reporter,
        }
    }

    /// Session that reports to `reporter` and leaves stdout alone.
    pub fn uncaptured(reporter: Reporter) -> Self {
        Self::new(reporter, Box::new(Passthrough))
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// The test currently executing.
    pub fn current_test(&self) -> Option<&'static Tag> {
        self.current
    }

    pub fn current_test_failed(&self) -> bool {
        self.current_failed
    }

    /// The subtests enclosing the point of execution, outermost first.
    pub fn current_path(&self) -> &[&'static Tag] {
        self.traversal.path()
    }

    /// Invocations of the current test body so far.
    pub fn invocations(&self) -> usize {
        self.invocations
    }

    // ========================================================================
    // SUBTESTS
    // ========================================================================

    /// Returns whether the subtest declared by `tag` runs now.
    pub fn enter_subtest(&mut self, tag: &'static Tag) -> bool {
        self.traversal.enter(tag)
    }

    /// Closes the subtest most recently entered.
    pub fn exit_subtest(&mut self) {
        self.traversal.exit();
    }

    // ========================================================================
    // ASSERTIONS
    // ========================================================================

    /// Asserts that `value` equals `expected`.
    pub fn assert_bool(&mut self, site: Site<'_>, value: bool, expected: bool, expr: &str) -> Outcome {
        self.counters.asserts += 1;
        if value == expected {
            return Ok(());
        }
        self.fail(site, "", render_bool(expr, value, expected))
    }

    /// Asserts `lhs == rhs` or `lhs != rhs`.
    pub fn assert_equality<L, R>(
        &mut self,
        site: Site<'_>,
        relation: Relation,
        lhs: &L,
        lhs_expr: &str,
        rhs: &R,
        rhs_expr: &str,
    ) -> Outcome
    where
        L: PartialEq<R> + Debug + ?Sized,
        R: Debug + ?Sized,
    {
        self.counters.asserts += 1;
        let holds = match relation {
            Relation::Ne => lhs != rhs,
            _ => lhs == rhs,
        };
        if holds {
            return Ok(());
        }
        self.fail(site, "", render_relation(relation, lhs, lhs_expr, rhs, rhs_expr))
    }

    /// Asserts an ordering relation between two operands.
    pub fn assert_ordering<L, R>(
        &mut self,
        site: Site<'_>,
        relation: Relation,
        lhs: &L,
        lhs_expr: &str,
        rhs: &R,
        rhs_expr: &str,
    ) -> Outcome
    where
        L: PartialOrd<R> + Debug + ?Sized,
        R: Debug + ?Sized,
    {
        self.counters.asserts += 1;
        if relation.holds(lhs, rhs) {
            return Ok(());
        }
        self.fail(site, "", render_relation(relation, lhs, lhs_expr, rhs, rhs_expr))
    }

    /// Asserts string equality (or inequality, when `expect_equal` is false).
    #[allow(clippy::too_many_arguments)]
    pub fn assert_str<L, R>(
        &mut self,
        site: Site<'_>,
        lhs: &L,
        lhs_expr: &str,
        rhs: &R,
        rhs_expr: &str,
        expect_equal: bool,
        case: Case,
    ) -> Outcome
    where
        L: StrOperand + ?Sized,
        R: StrOperand + ?Sized,
    {
        self.counters.asserts += 1;
        let (lhs, rhs) = (lhs.as_operand(), rhs.as_operand());
        if assert::str_equal(lhs, rhs, case) == expect_equal {
            return Ok(());
        }
        let rendered = render_str(lhs, lhs_expr, rhs, rhs_expr, expect_equal);
        self.fail(site, case.qualifier(), rendered)
    }

    fn fail(&mut self, site: Site<'_>, qualifier: &str, rendered: Rendered) -> Outcome {
        self.record_failure();
        let report_capture = self.suspend_capture();
        let report = FailureReport {
            severity: site.severity,
            qualifier,
            message: site.message,
            expression: Some(rendered.expression),
            evaluated: rendered.evaluated,
            file: site.file,
            line: site.line,
            test: self.current,
            path: self.traversal.path(),
            captured: &report_capture,
        };
        if let Err(e) = self.reporter.failure(&report) {
            warn!(error = %e, "failed to write assertion report");
        }

        match site.severity {
            Severity::Check => {
                self.resume_capture();
                Ok(())
            }
            Severity::Require => Err(Abort),
        }
    }

    fn record_failure(&mut self) {
        self.current_failed = true;
        self.counters.asserts_failed += 1;
    }

    /// Restores the console and drains what the test printed so far.
    fn suspend_capture(&mut self) -> String {
        if let Err(e) = self.capture.disable() {
            warn!(error = %e, "failed to restore stdout");
        }
        let captured = self.capture.captured().unwrap_or_else(|e| {
            warn!(error = %e, "failed to read captured output");
            String::new()
        });
        if let Err(e) = self.capture.clear() {
            warn!(error = %e, "failed to clear captured output");
        }
        captured
    }

    fn resume_capture(&mut self) {
        if let Err(e) = self.capture.enable() {
            warn!(error = %e, "failed to redirect stdout");
        }
    }

    // ========================================================================
    // RUNNER HOOKS
    // ========================================================================

    pub(crate) fn begin_test(&mut self, tag: &'static Tag) {
        self.current = Some(tag);
        self.current_failed = false;
        self.invocations = 0;
        self.traversal.begin_test();
        self.resume_capture();
    }

    pub(crate) fn begin_invocation(&mut self) {
        self.invocations += 1;
        self.traversal.begin_invocation();
    }

    pub(crate) fn should_repeat(&self) -> bool {
        self.traversal.should_repeat()
    }

    /// Reports a panic caught at the per-test checkpoint as a required failure.
    pub(crate) fn report_abort(&mut self, event: Option<AbortEvent>, payload: &(dyn Any + Send)) {
        self.counters.asserts += 1;
        self.record_failure();
        let captured = self.suspend_capture();

        let (message, file, line) = match &event {
            Some(event) => (event.message.clone(), event.file.as_deref(), event.line),
            None => (payload_message(payload), None, None),
        };
        let fallback = self.current;
        let report = FailureReport {
            severity: Severity::Require,
            qualifier: "",
            message: Some("assertion failed via panic"),
            expression: None,
            evaluated: message,
            file: file.or(fallback.map(|t| t.file)).unwrap_or("<unknown>"),
            line: line.or(fallback.map(|t| t.line)).unwrap_or(0),
            test: self.current,
            path: self.traversal.path(),
            captured: &captured,
        };
        if let Err(e) = self.reporter.failure(&report) {
            warn!(error = %e, "failed to write panic report");
        }
    }

    /// Closes out the current test and returns whether it failed.
    pub(crate) fn finish_test(&mut self, show_passed: bool) -> bool {
        self.counters.tests_ran += 1;
        let failed = self.current_failed;
        if failed {
            self.counters.tests_failed += 1;
        } else if show_passed {
            if let Some(tag) = self.current {
                self.suspend_capture();
                if let Err(e) = self.reporter.passed(tag) {
                    warn!(error = %e, "failed to write passed line");
                }
                self.resume_capture();
            }
        }
        if let Err(e) = self.capture.clear() {
            warn!(error = %e, "failed to clear captured output");
        }
        failed
    }

    pub(crate) fn enable_capture(&mut self) -> std::io::Result<()> {
        self.capture.enable()
    }

    pub(crate) fn disable_capture(&mut self) {
        if let Err(e) = self.capture.disable() {
            warn!(error = %e, "failed to restore stdout");
        }
    }

    pub(crate) fn reporter(&mut self) -> &mut Reporter {
        &mut self.reporter
    }
}
