//! Interception of panics raised while a test body runs.
//!
//! A panic is the abort of a Rust test: `assert!`, `unwrap` or an explicit
//! `panic!` deep inside the code under test. The runner arms the handler
//! before each test and catches the unwind at its checkpoint; the handler
//! records where the panic came from and keeps the default hook from
//! printing over the report.
//!
//! The process has a single panic hook, so the handler is installed once
//! and dispatches per thread: only the thread that armed it is intercepted,
//! and the first interception disarms it.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::panic;
use std::sync::Once;

/// What the handler saw when a panic fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbortEvent {
    pub message: String,
    pub file: Option<String>,
    pub line: Option<u32>,
}

static HOOK: Once = Once::new();

thread_local! {
    static ARMED: Cell<bool> = const { Cell::new(false) };
    static LAST_EVENT: RefCell<Option<AbortEvent>> = const { RefCell::new(None) };
}

/// Arms interception for panics on the calling thread.
pub fn install_abort_handler() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !ARMED.with(|armed| armed.replace(false)) {
                previous(info);
                return;
            }
            let event = AbortEvent {
                message: payload_message(info.payload()),
                file: info.location().map(|l| l.file().to_string()),
                line: info.location().map(|l| l.line()),
            };
            LAST_EVENT.with(|slot| *slot.borrow_mut() = Some(event));
        }));
    });
    LAST_EVENT.with(|slot| slot.borrow_mut().take());
    ARMED.with(|armed| armed.set(true));
}

/// Disarms interception on the calling thread.
pub fn remove_abort_handler() {
    ARMED.with(|armed| armed.set(false));
}

/// Takes the event recorded by the most recent interception, if any.
pub fn take_abort_event() -> Option<AbortEvent> {
    LAST_EVENT.with(|slot| slot.borrow_mut().take())
}

/// Best-effort text of a panic payload.
pub fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intercepts_armed_panic() {
        install_abort_handler();
        let result = panic::catch_unwind(|| panic!("boom {}", 7));
        remove_abort_handler();

        assert!(result.is_err());
        let event = take_abort_event().expect("panic should be recorded");
        assert_eq!(event.message, "boom 7");
        assert_eq!(event.file.as_deref(), Some(file!()));
        assert!(event.line.is_some());
    }

    #[test]
    fn test_disarms_after_first_panic() {
        install_abort_handler();
        let _ = panic::catch_unwind(|| panic!("first"));
        assert_eq!(take_abort_event().map(|e| e.message), Some("first".to_string()));

        let _ = panic::catch_unwind(|| panic!("second"));
        remove_abort_handler();
        assert!(take_abort_event().is_none());
    }

    #[test]
    fn test_payload_message_variants() {
        let text: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(payload_message(text.as_ref()), "static");
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(payload_message(owned.as_ref()), "owned");
        let other: Box<dyn Any + Send> = Box::new(3u8);
        assert_eq!(payload_message(other.as_ref()), "Box<dyn Any>");
    }
}
