//! A sample suite showing every kind of outcome Trellis reports.
//!
//! Several tests here fail on purpose. Use `--tag` to pick a group, e.g.
//! `trellis_demo --tag "[encoding]" --all`.

use trellis::{
    check, check_eq, check_false, check_ge, check_gt, check_le, check_lt, check_ne,
    check_str_eq, check_str_icase_eq, check_str_icase_ne, check_str_ne, require, require_eq,
    require_str_eq, subtest, test, test_main,
};

// ============================================================================
// CODE UNDER TEST
// ============================================================================

/// Encodes one scalar value as UTF-8, appending to `out`.
fn utf8_encode(code_point: u32, out: &mut Vec<u8>) {
    match code_point {
        0..=0x7f => out.push(code_point as u8),
        0x80..=0x7ff => {
            out.push(0xc0 | (code_point >> 6) as u8);
            out.push(0x80 | (code_point & 0x3f) as u8);
        }
        0x800..=0xffff => {
            out.push(0xe0 | (code_point >> 12) as u8);
            out.push(0x80 | ((code_point >> 6) & 0x3f) as u8);
            out.push(0x80 | (code_point & 0x3f) as u8);
        }
        _ => {
            out.push(0xf0 | (code_point >> 18) as u8);
            out.push(0x80 | ((code_point >> 12) & 0x3f) as u8);
            out.push(0x80 | ((code_point >> 6) & 0x3f) as u8);
            out.push(0x80 | (code_point & 0x3f) as u8);
        }
    }
}

/// Decodes the scalar value at the front of `bytes`, advancing past it.
/// Returns 0 once the input is exhausted.
fn utf8_decode(bytes: &mut &[u8]) -> u32 {
    let Some((&lead, rest)) = bytes.split_first() else {
        return 0;
    };
    let (extra, mask) = match lead.leading_ones() {
        0 => (0, 0x7f),
        n => (n as usize - 1, 0x7fu8.checked_shr(n).unwrap_or(0)),
    };
    let mut value = u32::from(lead & mask);
    let (tail, rest) = rest.split_at(extra.min(rest.len()));
    for &b in tail {
        value = (value << 6) | u32::from(b & 0x3f);
    }
    *bytes = rest;
    value
}

// ============================================================================
// BASIC
// ============================================================================

test!(arithmetic, "[basic] arithmetic", |t| {
    check_eq!(t, 2 + 2, 4);
    check_lt!(t, 1, 2);
    check!(t, [1, 2, 3].contains(&2));
});

test!(comparisons, "[basic] comparisons", |t| {
    check!(t, 1 == 1);
    check!(t, 1 == 0);

    check_false!(t, 1 == 0);
    check_false!(t, 1 == 1);

    check_eq!(t, 0, 0);
    check_eq!(t, 0, 1);
    check_ne!(t, 0, 1);
    check_ne!(t, 1, 1);

    check_lt!(t, 0, 1);
    check_lt!(t, 1, 1);
    check_le!(t, 1, 1);
    check_le!(t, 1, 0);

    check_ge!(t, 1, 0);
    check_ge!(t, 0, 1);
    check_gt!(t, 1, 0);
    check_gt!(t, 1, 1, "equal values are not greater");
});

test!(require_stops, "[basic] require stops the test", |t| {
    require!(t, true);
    println!("reached before the failure");
    require!(t, 1 + 1 == 3, "arithmetic is broken");
    println!("never printed");
});

// ============================================================================
// SUBTESTS
// ============================================================================

test!(stack_behavior, "[subtests] stack behavior", |t| {
    println!("begin");
    subtest!(t, "1", {
        println!("1");
        subtest!(t, "1.1", {
            println!("1.1");
        });
    });
    subtest!(t, "2", {
        println!("2");
        subtest!(t, "2.1", {
            println!("2.1");
        });
        subtest!(t, "2.2", {
            println!("2.2");
            subtest!(t, "2.2.1", {
                println!("2.2.1");
                subtest!(t, "2.2.1.1", {
                    println!("2.2.1.1");
                });
                subtest!(t, "2.2.1.2", {
                    println!("2.2.1.2");
                });
            });
        });
        subtest!(t, "2.3", {
            println!("2.3");
        });
        subtest!(t, "2.4", {
            println!("2.4");
        });
    });
    println!();
});

test!(failures_bubble_up, "[subtests] failures bubble up", |t| {
    subtest!(t, "a", {
        require!(t, true);
    });
    subtest!(t, "b", {
        require!(t, false, "b always fails");
    });
    subtest!(t, "c", {
        require!(t, false, "c is never reached");
    });
});

// ============================================================================
// PANICS
// ============================================================================

test!(std_assert, "[panic] std assert is caught", |t| {
    check!(t, true);
    assert_eq!(1 + 1, 3, "std assertions unwind");
});

test!(after_panic, "[panic] later tests still run", |t| {
    require_eq!(t, 1, 2);
});

// ============================================================================
// STRINGS
// ============================================================================

test!(strings, "[strings] comparisons", |t| {
    let name = String::from("trellis");
    let missing: Option<&str> = None;

    check_str_eq!(t, name, "trellis");
    check_str_eq!(t, name, "Trellis");
    check_str_icase_eq!(t, name, "TRELLIS");
    check_str_icase_ne!(t, name, "TRELLIS", "case is ignored");
    check_str_ne!(t, missing, "anything");
    check_str_eq!(t, missing, "anything");
});

// ============================================================================
// ENCODING
// ============================================================================

test!(utf8_round_trip, "[encoding] UTF-8 <-> UTF-32", |t| {
    // Setup above the subtests runs again for each of them.
    let cases: [(&str, &[u32]); 3] = [
        ("abCD12!@", &[0x61, 0x62, 0x43, 0x44, 0x31, 0x32, 0x21, 0x40]),
        ("\u{3ba}\u{3cc}\u{3c3}\u{3bc}\u{3b5}", &[954, 972, 963, 956, 949]),
        ("\u{1F60E}\u{1F638}", &[128526, 128568]),
    ];
    require_eq!(t, cases.len(), 3, "unexpected number of test cases");

    subtest!(t, "encode UTF-32 to UTF-8", {
        for (utf8, utf32) in cases {
            let mut buf = Vec::new();
            for &cp in utf32 {
                utf8_encode(cp, &mut buf);
            }
            let encoded = String::from_utf8_lossy(&buf).into_owned();
            require_str_eq!(t, encoded, utf8);
        }
    });

    subtest!(t, "decode UTF-8 to UTF-32", {
        for (utf8, utf32) in cases {
            let mut bytes = utf8.as_bytes();
            for &cp in utf32 {
                check_eq!(t, utf8_decode(&mut bytes), cp);
            }
            check_eq!(t, utf8_decode(&mut bytes), 0u32);
        }
    });
});

test_main!();
