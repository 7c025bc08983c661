//! Records failures that reach the unhandled-failure hook.

use std::sync::{Arc, Mutex, Once};

use hypercore_wrapper_api::{set_unhandled_failure_hook, CoreError};
use lazy_static::lazy_static;

lazy_static! {
    static ref REPORTED: Mutex<Vec<String>> = Mutex::new(Vec::new());
}

/// Install the recording hook once for the whole test binary. Tests use
/// unique failure messages so they can share the record.
pub(crate) fn install_recorder() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        set_unhandled_failure_hook(Arc::new(|e: &CoreError| {
            REPORTED.lock().unwrap().push(e.to_string());
        }));
    });
}

pub(crate) fn reported(message: &str) -> usize {
    REPORTED
        .lock()
        .unwrap()
        .iter()
        .filter(|m| m.as_str() == message)
        .count()
}
