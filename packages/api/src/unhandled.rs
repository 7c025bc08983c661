//! Process-wide reporting of failures nobody observed.
//!
//! A rejected [`Deferred`](crate::Deferred) that is dropped without being
//! awaited, given a handler, or explicitly suppressed is reported here
//! exactly once. The default hook logs the failure; applications can install
//! their own, much like `std::panic::set_hook`.

use std::sync::{Arc, RwLock};

use lazy_static::lazy_static;

use crate::CoreError;

/// Receives every unhandled failure.
pub type UnhandledFailureHook = Arc<dyn Fn(&CoreError) + Send + Sync>;

lazy_static! {
    static ref HOOK: RwLock<Option<UnhandledFailureHook>> = RwLock::new(None);
}

/// Install a process-wide hook for unhandled failures.
///
/// Returns the previously installed hook, if any.
pub fn set_unhandled_failure_hook(hook: UnhandledFailureHook) -> Option<UnhandledFailureHook> {
    let mut guard = HOOK.write().unwrap_or_else(|e| e.into_inner());
    guard.replace(hook)
}

/// Remove the installed hook, restoring the default logging behaviour.
pub fn take_unhandled_failure_hook() -> Option<UnhandledFailureHook> {
    let mut guard = HOOK.write().unwrap_or_else(|e| e.into_inner());
    guard.take()
}

pub(crate) fn report_unhandled(error: &CoreError) {
    // Clone the hook out so it runs without the lock held.
    let hook = HOOK.read().unwrap_or_else(|e| e.into_inner()).clone();
    match hook {
        Some(hook) => hook(error),
        None => tracing::error!(%error, "unhandled failure in deferred value"),
    }
}
