//! Handles all user-facing output of a run.
//!
//! Everything the runner prints goes through [`Reporter`]: the run header,
//! failure reports, passed-test lines and the final summary. The reporter
//! writes to any `termcolor` sink so that the console and an in-memory
//! [`SharedBuffer`] (used by tests and embedders) render identically.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::assert::Severity;
use crate::session::Counters;
use crate::tag::{file_name, Tag};

pub const SEPARATOR: &str = "============================================================\n";

// ============================================================================
// OUTPUT SINKS: SharedBuffer and console selection
// ============================================================================

/// SharedBuffer: collects report text in memory; clones share the buffer.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl WriteColor for SharedBuffer {
    fn supports_color(&self) -> bool {
        false
    }

    fn set_color(&mut self, _spec: &ColorSpec) -> io::Result<()> {
        Ok(())
    }

    fn reset(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Resolves `Auto` to plain output when stdout is not a terminal.
pub fn resolve_color(choice: ColorChoice) -> ColorChoice {
    match choice {
        ColorChoice::Auto if !atty::is(atty::Stream::Stdout) => ColorChoice::Never,
        other => other,
    }
}

// ============================================================================
// REPORTS
// ============================================================================

/// Everything printed for one failed assertion.
#[derive(Debug)]
pub struct FailureReport<'a> {
    pub severity: Severity,
    /// Extra words after the severity, e.g. " (case insensitive)".
    pub qualifier: &'a str,
    pub message: Option<&'a str>,
    /// The source expressions and operator; absent for panics.
    pub expression: Option<String>,
    /// The evaluated operands and operator.
    pub evaluated: String,
    pub file: &'a str,
    pub line: u32,
    pub test: Option<&'static Tag>,
    pub path: &'a [&'static Tag],
    pub captured: &'a str,
}

/// Writes run reports to a colour-capable sink.
pub struct Reporter {
    out: Box<dyn WriteColor>,
}

impl Reporter {
    pub fn new(out: Box<dyn WriteColor>) -> Self {
        Self { out }
    }

    /// Reporter on the process's stdout.
    pub fn stdout(color: ColorChoice) -> Self {
        Self::new(Box::new(StandardStream::stdout(resolve_color(color))))
    }

    /// Reporter writing into `buffer`.
    pub fn buffered(buffer: &SharedBuffer) -> Self {
        Self::new(Box::new(buffer.clone()))
    }

    pub fn header(
        &mut self,
        selected: usize,
        total: usize,
        partition: Option<(usize, usize, usize)>,
    ) -> io::Result<()> {
        let plural = if total > 1 { "s" } else { "" };
        writeln!(self.out, "Running {selected} out of {total} test{plural}")?;
        if let Some((index, first, last)) = partition {
            writeln!(self.out, "(Partition {index}: tests {first} to {last})")?;
        }
        write!(self.out, "{SEPARATOR}")?;
        self.out.flush()
    }

    pub fn failure(&mut self, report: &FailureReport<'_>) -> io::Result<()> {
        self.out
            .set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
        write!(self.out, "{}{} failed:", report.severity, report.qualifier)?;
        if let Some(message) = report.message {
            write!(self.out, " {message}")?;
        }
        self.out.reset()?;
        writeln!(self.out)?;

        if let Some(expression) = &report.expression {
            writeln!(self.out, "    {expression}")?;
        }
        writeln!(self.out, "==> {}", report.evaluated)?;
        writeln!(self.out, "At {}:{}", file_name(report.file), report.line)?;

        if let Some(test) = report.test {
            writeln!(self.out, "  In: {test}")?;
        }
        for (depth, subtest) in report.path.iter().enumerate() {
            let indent = (depth + 2) * 2;
            writeln!(self.out, "{:indent$}Under: {subtest}", "")?;
        }

        if !report.captured.is_empty() {
            writeln!(self.out, "Captured output:\n{}", report.captured)?;
        }
        write!(self.out, "{SEPARATOR}")?;
        self.out.flush()
    }

    pub fn passed(&mut self, test: &Tag) -> io::Result<()> {
        self.out
            .set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(self.out, "Passed: {test}")?;
        self.out.reset()?;
        writeln!(self.out)?;
        write!(self.out, "{SEPARATOR}")?;
        self.out.flush()
    }

    pub fn summary(&mut self, counters: &Counters) -> io::Result<()> {
        self.summary_line(
            "tests:  ",
            counters.tests_ran,
            counters.tests_passed(),
            counters.tests_failed,
        )?;
        self.summary_line(
            "asserts:",
            counters.asserts,
            counters.asserts_passed(),
            counters.asserts_failed,
        )?;
        self.out.flush()
    }

    fn summary_line(
        &mut self,
        label: &str,
        total: usize,
        passed: usize,
        failed: usize,
    ) -> io::Result<()> {
        write!(self.out, "{label} {total:5} total | ")?;
        self.out
            .set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(self.out, "{passed:5} passed")?;
        self.out.reset()?;
        write!(self.out, " | ")?;
        self.out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
        write!(self.out, "{failed:5} failed")?;
        self.out.reset()?;
        writeln!(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    static TEST: Tag = Tag::new("widget", "tests/widget.rs", 3);
    static OUTER: Tag = Tag::new("outer", "tests/widget.rs", 5);
    static INNER: Tag = Tag::new("inner", "tests/widget.rs", 6);

    #[test]
    fn test_failure_layout() {
        let buffer = SharedBuffer::new();
        let mut reporter = Reporter::buffered(&buffer);
        let path = [&OUTER, &INNER];
        reporter
            .failure(&FailureReport {
                severity: Severity::Check,
                qualifier: "",
                message: Some("sizes"),
                expression: Some("1 <= 0".to_string()),
                evaluated: "1 <= 0".to_string(),
                file: "/home/ci/tests/widget.rs",
                line: 7,
                test: Some(&TEST),
                path: &path,
                captured: "hello",
            })
            .unwrap();

        let expected = format!(
            "Check failed: sizes\n\
             \x20   1 <= 0\n\
             ==> 1 <= 0\n\
             At widget.rs:7\n\
             \x20 In: widget (widget.rs:3)\n\
             \x20   Under: outer (widget.rs:5)\n\
             \x20     Under: inner (widget.rs:6)\n\
             Captured output:\n\
             hello\n\
             {SEPARATOR}"
        );
        assert_eq!(buffer.contents(), expected);
    }

    #[test]
    fn test_header_mentions_partition() {
        let buffer = SharedBuffer::new();
        let mut reporter = Reporter::buffered(&buffer);
        reporter.header(3, 7, Some((2, 3, 5))).unwrap();
        assert_eq!(
            buffer.contents(),
            format!("Running 3 out of 7 tests\n(Partition 2: tests 3 to 5)\n{SEPARATOR}")
        );
    }

    #[test]
    fn test_header_singular() {
        let buffer = SharedBuffer::new();
        let mut reporter = Reporter::buffered(&buffer);
        reporter.header(1, 1, None).unwrap();
        assert_eq!(buffer.contents(), format!("Running 1 out of 1 test\n{SEPARATOR}"));
    }

    #[test]
    fn test_summary_columns() {
        let buffer = SharedBuffer::new();
        let mut reporter = Reporter::buffered(&buffer);
        let counters = Counters {
            tests_ran: 3,
            tests_failed: 1,
            asserts: 12,
            asserts_failed: 2,
        };
        reporter.summary(&counters).unwrap();
        assert_eq!(
            buffer.contents(),
            "tests:       3 total |     2 passed |     1 failed\n\
             asserts:    12 total |    10 passed |     2 failed\n"
        );
    }

    #[test]
    fn test_passed_line() {
        let buffer = SharedBuffer::new();
        let mut reporter = Reporter::buffered(&buffer);
        reporter.passed(&TEST).unwrap();
        assert_eq!(buffer.contents(), format!("Passed: widget (widget.rs:3)\n{SEPARATOR}"));
    }
}
