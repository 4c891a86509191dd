// Behaviour of the macros when the `enable` feature is turned off.
// Run with `--no-default-features`.
#![cfg(not(feature = "enable"))]

use trellis::cli::output::{Reporter, SharedBuffer};
use trellis::{check, check_eq, check_str_eq, registered, require, require_ne, subtest, Counters, Session};

trellis::test!(compiled_out, "[disabled] compiled out", |t| {
    check!(t, false, "never evaluated");
    check_eq!(t, 1, 2);
    check_str_eq!(t, "a", "b");
    require!(t, false);
    require_ne!(t, 3, 3);
    subtest!(t, "[disabled] nested", {
        panic!("subtest bodies are compiled out");
    });
});

#[test]
fn test_nothing_is_registered() {
    let tests = registered();
    assert!(tests.iter().all(|t| t.tag.desc != "[disabled] compiled out"));
    assert!(tests.is_empty());
}

#[test]
fn test_assertions_do_not_report() {
    let buffer = SharedBuffer::new();
    let mut session = Session::uncaptured(Reporter::buffered(&buffer));
    assert!(compiled_out(&mut session).is_ok());
    assert_eq!(session.counters(), Counters::default());
    assert_eq!(buffer.contents(), "");
}
