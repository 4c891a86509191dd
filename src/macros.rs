//! # Declaration and Assertion Macros
//!
//! The user-facing surface of Trellis. `test!` declares a test and registers
//! it at link time, `subtest!` opens a nested section, and the `check_*` /
//! `require_*` families assert inside either.
//!
//! Every assertion takes the session handle first and an optional message
//! last. `check` variants record a failure and fall through; `require`
//! variants record it and return early from the test body with `?`, so they
//! may only appear directly inside a `test!` body (closures inside the body
//! do not return `Outcome`).
//!
//! With the `enable` feature off, `test!` still compiles its body but does
//! not register it, `subtest!` drops its body, and every assertion expands
//! to nothing.

// ============================================================================
// DECLARATION
// ============================================================================

/// Declares a test and registers it with the process-wide registry.
///
/// The body sees the session as `$t`. Its location in the source becomes the
/// test's tag, which fixes its place in the run order.
#[macro_export]
macro_rules! test {
    ($name:ident, $desc:expr, |$t:ident| $body:block) => {
        #[allow(dead_code, unreachable_code, unused_variables)]
        fn $name($t: &mut $crate::Session) -> $crate::Outcome {
            $body
            ::core::result::Result::Ok(())
        }

        $crate::__enabled! {
            const _: () = {
                #[$crate::__private::distributed_slice($crate::__private::TESTS)]
                #[linkme(crate = $crate::__private::linkme)]
                static ENTRY: $crate::Test = $crate::Test::new($name, {
                    static TAG: $crate::Tag =
                        $crate::Tag::new($desc, ::core::file!(), ::core::line!());
                    &TAG
                });
            };
        }
    };
}

/// Runs `$body` as a subtest of the enclosing test or subtest.
///
/// A body whose sibling has already run in this invocation is skipped and
/// picked up by a later invocation.
#[macro_export]
macro_rules! subtest {
    ($t:expr, $desc:expr, $body:block) => {{
        $crate::__enabled! {
            static TAG: $crate::Tag = $crate::Tag::new($desc, ::core::file!(), ::core::line!());
            if $t.enter_subtest(&TAG) {
                $body
                $t.exit_subtest();
            }
        }
    }};
}

/// Generates a `main` that runs every registered test from the command line.
#[macro_export]
macro_rules! test_main {
    () => {
        fn main() {
            ::std::process::exit($crate::cli::main())
        }
    };
}

// ============================================================================
// INTERNAL BUILDING BLOCKS
// ============================================================================

#[cfg(feature = "enable")]
#[doc(hidden)]
#[macro_export]
macro_rules! __enabled {
    ($($code:tt)*) => {
        $($code)*
    };
}

#[cfg(not(feature = "enable"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __enabled {
    ($($code:tt)*) => {};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __site {
    (@message) => {
        ::core::option::Option::None
    };
    (@message $msg:expr) => {
        ::core::option::Option::Some(::core::convert::AsRef::<str>::as_ref(&$msg))
    };
    ($severity:ident $(, $msg:expr)?) => {
        $crate::assert::Site {
            severity: $crate::assert::Severity::$severity,
            message: $crate::__site!(@message $($msg)?),
            file: ::core::file!(),
            line: ::core::line!(),
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __truth {
    ($severity:ident, $expected:expr, $t:expr, $cond:expr $(, $msg:expr)?) => {
        $t.assert_bool(
            $crate::__site!($severity $(, $msg)?),
            $cond,
            $expected,
            ::core::stringify!($cond),
        )
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __relation {
    ($method:ident, $severity:ident, $rel:ident, $t:expr, $lhs:expr, $rhs:expr $(, $msg:expr)?) => {
        $t.$method(
            $crate::__site!($severity $(, $msg)?),
            $crate::assert::Relation::$rel,
            &$lhs,
            ::core::stringify!($lhs),
            &$rhs,
            ::core::stringify!($rhs),
        )
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __strings {
    ($severity:ident, $equal:expr, $case:ident, $t:expr, $lhs:expr, $rhs:expr $(, $msg:expr)?) => {
        $t.assert_str(
            $crate::__site!($severity $(, $msg)?),
            &$lhs,
            ::core::stringify!($lhs),
            &$rhs,
            ::core::stringify!($rhs),
            $equal,
            $crate::assert::Case::$case,
        )
    };
}

// ============================================================================
// TRUTHINESS
// ============================================================================

#[macro_export]
macro_rules! check {
    ($t:expr, $cond:expr $(, $msg:expr)? $(,)?) => {{
        $crate::__enabled! { let _ = $crate::__truth!(Check, true, $t, $cond $(, $msg)?); }
    }};
}

#[macro_export]
macro_rules! require {
    ($t:expr, $cond:expr $(, $msg:expr)? $(,)?) => {{
        $crate::__enabled! { $crate::__truth!(Require, true, $t, $cond $(, $msg)?)?; }
    }};
}

#[macro_export]
macro_rules! check_false {
    ($t:expr, $cond:expr $(, $msg:expr)? $(,)?) => {{
        $crate::__enabled! { let _ = $crate::__truth!(Check, false, $t, $cond $(, $msg)?); }
    }};
}

#[macro_export]
macro_rules! require_false {
    ($t:expr, $cond:expr $(, $msg:expr)? $(,)?) => {{
        $crate::__enabled! { $crate::__truth!(Require, false, $t, $cond $(, $msg)?)?; }
    }};
}

// ============================================================================
// RELATIONS
// ============================================================================

#[macro_export]
macro_rules! check_eq {
    ($t:expr, $lhs:expr, $rhs:expr $(, $msg:expr)? $(,)?) => {{
        $crate::__enabled! { let _ = $crate::__relation!(assert_equality, Check, Eq, $t, $lhs, $rhs $(, $msg)?); }
    }};
}

#[macro_export]
macro_rules! require_eq {
    ($t:expr, $lhs:expr, $rhs:expr $(, $msg:expr)? $(,)?) => {{
        $crate::__enabled! { $crate::__relation!(assert_equality, Require, Eq, $t, $lhs, $rhs $(, $msg)?)?; }
    }};
}

#[macro_export]
macro_rules! check_ne {
    ($t:expr, $lhs:expr, $rhs:expr $(, $msg:expr)? $(,)?) => {{
        $crate::__enabled! { let _ = $crate::__relation!(assert_equality, Check, Ne, $t, $lhs, $rhs $(, $msg)?); }
    }};
}

#[macro_export]
macro_rules! require_ne {
    ($t:expr, $lhs:expr, $rhs:expr $(, $msg:expr)? $(,)?) => {{
        $crate::__enabled! { $crate::__relation!(assert_equality, Require, Ne, $t, $lhs, $rhs $(, $msg)?)?; }
    }};
}

#[macro_export]
macro_rules! check_lt {
    ($t:expr, $lhs:expr, $rhs:expr $(, $msg:expr)? $(,)?) => {{
        $crate::__enabled! { let _ = $crate::__relation!(assert_ordering, Check, Lt, $t, $lhs, $rhs $(, $msg)?); }
    }};
}

#[macro_export]
macro_rules! require_lt {
    ($t:expr, $lhs:expr, $rhs:expr $(, $msg:expr)? $(,)?) => {{
        $crate::__enabled! { $crate::__relation!(assert_ordering, Require, Lt, $t, $lhs, $rhs $(, $msg)?)?; }
    }};
}

#[macro_export]
macro_rules! check_le {
    ($t:expr, $lhs:expr, $rhs:expr $(, $msg:expr)? $(,)?) => {{
        $crate::__enabled! { let _ = $crate::__relation!(assert_ordering, Check, Le, $t, $lhs, $rhs $(, $msg)?); }
    }};
}

#[macro_export]
macro_rules! require_le {
    ($t:expr, $lhs:expr, $rhs:expr $(, $msg:expr)? $(,)?) => {{
        $crate::__enabled! { $crate::__relation!(assert_ordering, Require, Le, $t, $lhs, $rhs $(, $msg)?)?; }
    }};
}

#[macro_export]
macro_rules! check_gt {
    ($t:expr, $lhs:expr, $rhs:expr $(, $msg:expr)? $(,)?) => {{
        $crate::__enabled! { let _ = $crate::__relation!(assert_ordering, Check, Gt, $t, $lhs, $rhs $(, $msg)?); }
    }};
}

#[macro_export]
macro_rules! require_gt {
    ($t:expr, $lhs:expr, $rhs:expr $(, $msg:expr)? $(,)?) => {{
        $crate::__enabled! { $crate::__relation!(assert_ordering, Require, Gt, $t, $lhs, $rhs $(, $msg)?)?; }
    }};
}

#[macro_export]
macro_rules! check_ge {
    ($t:expr, $lhs:expr, $rhs:expr $(, $msg:expr)? $(,)?) => {{
        $crate::__enabled! { let _ = $crate::__relation!(assert_ordering, Check, Ge, $t, $lhs, $rhs $(, $msg)?); }
    }};
}

#[macro_export]
macro_rules! require_ge {
    ($t:expr, $lhs:expr, $rhs:expr $(, $msg:expr)? $(,)?) => {{
        $crate::__enabled! { $crate::__relation!(assert_ordering, Require, Ge, $t, $lhs, $rhs $(, $msg)?)?; }
    }};
}

// ============================================================================
// STRINGS
// ============================================================================
//
// Operands may be `&str`, `String` or `Option` of either; `None` is printed
// as `[null]` and equals only another `None`.

#[macro_export]
macro_rules! check_str_eq {
    ($t:expr, $lhs:expr, $rhs:expr $(, $msg:expr)? $(,)?) => {{
        $crate::__enabled! { let _ = $crate::__strings!(Check, true, Sensitive, $t, $lhs, $rhs $(, $msg)?); }
    }};
}

#[macro_export]
macro_rules! require_str_eq {
    ($t:expr, $lhs:expr, $rhs:expr $(, $msg:expr)? $(,)?) => {{
        $crate::__enabled! { $crate::__strings!(Require, true, Sensitive, $t, $lhs, $rhs $(, $msg)?)?; }
    }};
}

#[macro_export]
macro_rules! check_str_ne {
    ($t:expr, $lhs:expr, $rhs:expr $(, $msg:expr)? $(,)?) => {{
        $crate::__enabled! { let _ = $crate::__strings!(Check, false, Sensitive, $t, $lhs, $rhs $(, $msg)?); }
    }};
}

#[macro_export]
macro_rules! require_str_ne {
    ($t:expr, $lhs:expr, $rhs:expr $(, $msg:expr)? $(,)?) => {{
        $crate::__enabled! { $crate::__strings!(Require, false, Sensitive, $t, $lhs, $rhs $(, $msg)?)?; }
    }};
}

#[macro_export]
macro_rules! check_str_icase_eq {
    ($t:expr, $lhs:expr, $rhs:expr $(, $msg:expr)? $(,)?) => {{
        $crate::__enabled! { let _ = $crate::__strings!(Check, true, Insensitive, $t, $lhs, $rhs $(, $msg)?); }
    }};
}

#[macro_export]
macro_rules! require_str_icase_eq {
    ($t:expr, $lhs:expr, $rhs:expr $(, $msg:expr)? $(,)?) => {{
        $crate::__enabled! { $crate::__strings!(Require, true, Insensitive, $t, $lhs, $rhs $(, $msg)?)?; }
    }};
}

#[macro_export]
macro_rules! check_str_icase_ne {
    ($t:expr, $lhs:expr, $rhs:expr $(, $msg:expr)? $(,)?) => {{
        $crate::__enabled! { let _ = $crate::__strings!(Check, false, Insensitive, $t, $lhs, $rhs $(, $msg)?); }
    }};
}

#[macro_export]
macro_rules! require_str_icase_ne {
    ($t:expr, $lhs:expr, $rhs:expr $(, $msg:expr)? $(,)?) => {{
        $crate::__enabled! { $crate::__strings!(Require, false, Insensitive, $t, $lhs, $rhs $(, $msg)?)?; }
    }};
}
