// Stdout capture against the real fd 1. Kept to a single test so that nothing
// else in this binary writes to stdout while it is redirected.
#![cfg(unix)]

use std::io::{self, Write};

use trellis::capture::{OutputCapture, StdoutRedirect, CAPTURE_LIMIT};

const MIB: usize = 1 << 20;

fn stdout_identity() -> (u64, u64) {
    let mut stat: libc::stat = unsafe { std::mem::zeroed() };
    assert_eq!(unsafe { libc::fstat(libc::STDOUT_FILENO, &mut stat) }, 0);
    (stat.st_dev as u64, stat.st_ino as u64)
}

#[test]
fn test_chatty_test_output_stays_bounded() {
    let mut capture = StdoutRedirect::new();
    capture.enable().unwrap();
    let chunk = vec![b'x'; MIB];
    for _ in 0..8 {
        io::stdout().write_all(&chunk).unwrap();
    }
    capture.disable().unwrap();

    assert_eq!(capture.stored(), CAPTURE_LIMIT);
    assert_eq!(capture.dropped(), 8 * MIB - CAPTURE_LIMIT);
    let text = capture.captured().unwrap();
    assert_eq!(text.len(), CAPTURE_LIMIT);
    assert!(text.bytes().all(|b| b == b'x'));

    // Clearing and reading while enabled sees exactly what was written since.
    capture.clear().unwrap();
    capture.enable().unwrap();
    io::stdout().write_all(b"left over").unwrap();
    capture.clear().unwrap();
    io::stdout().write_all(b"fresh\n").unwrap();
    let text = capture.captured().unwrap();
    assert!(capture.is_enabled());
    capture.disable().unwrap();

    assert_eq!(text, "fresh\n");
    assert_eq!(capture.stored(), "fresh\n".len());

    // Dropping a redirect that is still enabled puts the real stdout back.
    let console = stdout_identity();
    let mut scoped = StdoutRedirect::new();
    scoped.enable().unwrap();
    assert_ne!(stdout_identity(), console);
    drop(scoped);
    assert_eq!(stdout_identity(), console);
}
