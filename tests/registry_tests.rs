// Link-time registration through the declaration macros.
#![cfg(feature = "enable")]

use trellis::cli::output::{Reporter, SharedBuffer};
use trellis::{
    check_eq, check_str_icase_eq, register, registered, require, subtest, Outcome, RunOptions,
    Runner, Session, Tag,
};

// `trellis::test` is spelled out: importing it would shadow the `#[test]` attribute.
trellis::test!(declared_by_macro, "[registry] declared by macro", |t| {
    let mut seen = Vec::new();
    subtest!(t, "left", {
        seen.push("left");
    });
    subtest!(t, "right", {
        seen.push("right");
    });
    check_eq!(t, seen.len(), 1);
});

trellis::test!(second_declaration, "[registry] second declaration", |t| {
    require!(t, true);
    check_str_icase_eq!(t, "Registry", "REGISTRY", "names compare without case");
});

static RUNTIME: Tag = Tag::new("[registry] added at runtime", "registry_tests.rs", 1);

fn added_at_runtime(_: &mut Session) -> Outcome {
    Ok(())
}

#[test]
fn test_macro_declarations_are_registered() {
    let tests = registered();
    let names: Vec<_> = tests.iter().map(|t| t.tag.desc).collect();
    assert!(names.contains(&"[registry] declared by macro"));
    assert!(names.contains(&"[registry] second declaration"));

    let declared = tests
        .iter()
        .find(|t| t.tag.desc == "[registry] declared by macro")
        .unwrap();
    assert_eq!(declared.tag.file_name(), "registry_tests.rs");
    assert!(declared.tag.line > 0);
}

#[test]
fn test_runtime_registration_is_visible() {
    register(added_at_runtime, &RUNTIME);
    assert!(registered()
        .iter()
        .any(|t| std::ptr::eq(t.tag, &RUNTIME)));
}

#[test]
fn test_registered_tests_run() {
    let buffer = SharedBuffer::new();
    let options = RunOptions {
        tag_filter: vec!["[registry] d".to_string(), "[registry] s".to_string()],
        show_passed: true,
        ..RunOptions::default()
    };
    let summary = Runner::new(options)
        .with_session(Session::uncaptured(Reporter::buffered(&buffer)))
        .run(registered())
        .unwrap();

    assert_eq!(summary.counters.tests_ran, 2);
    assert_eq!(summary.exit_code(), 0);
    assert_eq!(summary.records[0].tag.desc, "[registry] declared by macro");
    assert_eq!(summary.records[0].invocations, 2);
    assert_eq!(summary.counters.asserts, 2 + 2);

    let text = buffer.contents();
    assert!(text.contains("Passed: [registry] declared by macro (registry_tests.rs:"));
    assert!(text.contains("Passed: [registry] second declaration (registry_tests.rs:"));
}
