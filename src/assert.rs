//! Assertion predicates and the text shown when they fail.
//!
//! The functions here are pure: they decide pass/fail and build the two
//! report lines (source expression and evaluated values). Counting,
//! capture handling and unwinding live in [`crate::session::Session`].

use std::fmt::{self, Debug};

/// How a failed assertion affects the rest of the test body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Record the failure and keep going.
    Check,
    /// Record the failure and abandon the current invocation.
    Require,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Check => f.write_str("Check"),
            Severity::Require => f.write_str("Require"),
        }
    }
}

/// Relational operator of a two-operand assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Relation {
    pub fn symbol(self) -> &'static str {
        match self {
            Relation::Eq => "==",
            Relation::Ne => "!=",
            Relation::Lt => "<",
            Relation::Le => "<=",
            Relation::Gt => ">",
            Relation::Ge => ">=",
        }
    }

    /// Evaluates an ordering relation. `Eq`/`Ne` use `PartialEq`.
    pub fn holds<L, R>(self, lhs: &L, rhs: &R) -> bool
    where
        L: PartialOrd<R> + ?Sized,
        R: ?Sized,
    {
        match self {
            Relation::Eq => lhs == rhs,
            Relation::Ne => lhs != rhs,
            Relation::Lt => lhs < rhs,
            Relation::Le => lhs <= rhs,
            Relation::Gt => lhs > rhs,
            Relation::Ge => lhs >= rhs,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Case handling for string comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Sensitive,
    Insensitive,
}

impl Case {
    /// Words appended to the severity in a failure header.
    pub fn qualifier(self) -> &'static str {
        match self {
            Case::Sensitive => "",
            Case::Insensitive => " (case insensitive)",
        }
    }
}

/// Where an assertion was written and how severe it is.
#[derive(Debug, Clone, Copy)]
pub struct Site<'a> {
    pub severity: Severity,
    pub message: Option<&'a str>,
    pub file: &'static str,
    pub line: u32,
}

/// The two lines describing a failed assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub expression: String,
    pub evaluated: String,
}

/// An operand of a string assertion; `None` stands for an absent string.
pub trait StrOperand {
    fn as_operand(&self) -> Option<&str>;
}

impl StrOperand for str {
    fn as_operand(&self) -> Option<&str> {
        Some(self)
    }
}

impl StrOperand for String {
    fn as_operand(&self) -> Option<&str> {
        Some(self)
    }
}

impl<T: AsRef<str>> StrOperand for Option<T> {
    fn as_operand(&self) -> Option<&str> {
        self.as_ref().map(AsRef::as_ref)
    }
}

impl<T: StrOperand + ?Sized> StrOperand for &T {
    fn as_operand(&self) -> Option<&str> {
        (**self).as_operand()
    }
}

/// Renders a failed truthiness check.
pub fn render_bool(expr: &str, value: bool, expected: bool) -> Rendered {
    Rendered {
        expression: format!("{expr} == {expected}"),
        evaluated: format!("{value} == {expected}"),
    }
}

/// Renders a failed relational check with `Debug` operands.
pub fn render_relation<L, R>(
    relation: Relation,
    lhs: &L,
    lhs_expr: &str,
    rhs: &R,
    rhs_expr: &str,
) -> Rendered
where
    L: Debug + ?Sized,
    R: Debug + ?Sized,
{
    Rendered {
        expression: format!("{lhs_expr} {relation} {rhs_expr}"),
        evaluated: format!("{lhs:?} {relation} {rhs:?}"),
    }
}

/// Compares two possibly-absent strings.
///
/// Absent operands compare equal only to each other.
pub fn str_equal(lhs: Option<&str>, rhs: Option<&str>, case: Case) -> bool {
    match (lhs, rhs) {
        (Some(l), Some(r)) => match case {
            Case::Sensitive => l == r,
            Case::Insensitive => l.eq_ignore_ascii_case(r),
        },
        (None, None) => true,
        _ => false,
    }
}

const NULL: &str = "[null]";

fn quoted(value: Option<&str>) -> String {
    match value {
        Some(s) => format!("\"{s}\""),
        None => NULL.to_string(),
    }
}

/// Renders a failed string comparison.
///
/// The left side of whichever line is shorter is padded so that both
/// operators line up in the same column.
pub fn render_str(
    lhs: Option<&str>,
    lhs_expr: &str,
    rhs: Option<&str>,
    rhs_expr: &str,
    expect_equal: bool,
) -> Rendered {
    let op = if expect_equal { "==" } else { "!=" };
    let lhs_value = quoted(lhs);
    let rhs_value = quoted(rhs);

    let expr_width = lhs_expr.chars().count();
    let value_width = lhs_value.chars().count();
    let width = expr_width.max(value_width);

    Rendered {
        expression: format!("{lhs_expr:<width$} {op} {rhs_expr}"),
        evaluated: format!("{lhs_value:<width$} {op} {rhs_value}"),
    }
}
