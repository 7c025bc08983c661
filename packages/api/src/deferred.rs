//! Deferred values and completion handlers.
//!
//! A [`Deferred`] is the eventual outcome of one asynchronous operation. It is
//! eager: the producer settles it through its [`Resolver`] whether or not
//! anyone is polling. Consumers can either `.await` it or attach a
//! completion [`Handler`], and may do both, since every clone observes the
//! same outcome.
//!
//! # Failure observation
//!
//! A deferred value is *handled* once it has been awaited to completion,
//! peeked after settling, given a handler, or passed through
//! [`Deferred::suppress_unhandled`]. If the last reference to a rejected,
//! unhandled deferred value goes away, the failure is reported to the
//! process-wide hook (see [`set_unhandled_failure_hook`]).
//!
//! [`set_unhandled_failure_hook`]: crate::set_unhandled_failure_hook

use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll, Waker};
use std::thread;

use crate::unhandled::report_unhandled;
use crate::CoreError;

/// Completion handler: invoked exactly once with the failure or the value.
pub type Handler<T> = Box<dyn FnOnce(Result<T, CoreError>) + Send + 'static>;

type Continuation<T> = Box<dyn FnOnce(&Result<T, CoreError>) + Send + 'static>;

enum Slot<T> {
    Pending {
        continuations: Vec<Continuation<T>>,
        wakers: Vec<Waker>,
    },
    Settled(Arc<Result<T, CoreError>>),
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
    handled: AtomicBool,
}

impl<T> Shared<T> {
    fn new(slot: Slot<T>) -> Self {
        Self {
            slot: Mutex::new(slot),
            handled: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        // Continuations never run under the lock, so a poisoned slot still
        // holds a consistent state.
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn mark_handled(&self) {
        self.handled.store(true, Ordering::Release);
    }

    fn settle(&self, result: Result<T, CoreError>) {
        let outcome = Arc::new(result);

        let (continuations, wakers) = {
            let mut slot = self.lock();
            match std::mem::replace(&mut *slot, Slot::Settled(outcome.clone())) {
                Slot::Pending {
                    continuations,
                    wakers,
                } => (continuations, wakers),
                settled @ Slot::Settled(_) => {
                    *slot = settled;
                    return;
                }
            }
        };

        // Awaiting tasks only read the slot, so wake them before any handler
        // gets a chance to panic.
        for waker in wakers {
            waker.wake();
        }

        let mut first_panic = None;
        for continuation in continuations {
            let run = panic::catch_unwind(AssertUnwindSafe(|| continuation(&*outcome)));
            if let Err(payload) = run {
                first_panic.get_or_insert(payload);
            }
        }

        // Every handler has run; hand the first panic back to the settler.
        if let Some(payload) = first_panic {
            if !thread::panicking() {
                panic::resume_unwind(payload);
            }
        }
    }
}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        if *self.handled.get_mut() {
            return;
        }
        let slot = self.slot.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Slot::Settled(outcome) = slot {
            if let Err(error) = outcome.as_ref() {
                report_unhandled(error);
            }
        }
    }
}

/// The eventual outcome of one asynchronous operation.
///
/// Resolves exactly once. Cloning is cheap and every clone sees the same
/// outcome. Awaiting yields `Result<T, CoreError>`.
pub struct Deferred<T> {
    shared: Arc<Shared<T>>,
}

/// The producing half of a [`Deferred`].
///
/// Dropping a resolver that has not settled rejects the deferred value with
/// [`CoreError::Dropped`], so attached handlers still run exactly once.
pub struct Resolver<T> {
    shared: Option<Arc<Shared<T>>>,
}

impl<T> Deferred<T> {
    /// Create an unsettled deferred value and the resolver that settles it.
    pub fn pending() -> (Resolver<T>, Deferred<T>) {
        let shared = Arc::new(Shared::new(Slot::Pending {
            continuations: Vec::new(),
            wakers: Vec::new(),
        }));
        (
            Resolver {
                shared: Some(shared.clone()),
            },
            Deferred { shared },
        )
    }

    /// A deferred value that is already settled.
    pub fn settled(result: Result<T, CoreError>) -> Self {
        Deferred {
            shared: Arc::new(Shared::new(Slot::Settled(Arc::new(result)))),
        }
    }

    pub fn resolved(value: T) -> Self {
        Self::settled(Ok(value))
    }

    pub fn rejected(error: CoreError) -> Self {
        Self::settled(Err(error))
    }

    pub fn is_settled(&self) -> bool {
        matches!(&*self.shared.lock(), Slot::Settled(_))
    }

    /// Whether a failure of this value counts as observed.
    pub fn is_handled(&self) -> bool {
        self.shared.handled.load(Ordering::Acquire)
    }

    /// Mark a failure of this value as observed without inspecting it.
    ///
    /// Callers can still await the value or attach a handler afterwards.
    pub fn mark_handled(&self) {
        self.shared.mark_handled();
    }

    /// Chaining form of [`mark_handled`](Self::mark_handled).
    pub fn suppress_unhandled(self) -> Self {
        self.mark_handled();
        self
    }
}

impl<T> Deferred<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Attach a completion handler.
    ///
    /// The handler runs exactly once: on the settling thread when the value
    /// settles, or immediately if it already has. Attaching a handler marks
    /// the value handled.
    ///
    /// A panicking handler does not stop later handlers or awaiting tasks
    /// from seeing the outcome. The first panic is resumed on the settling
    /// thread after every handler has run.
    pub fn when_settled(&self, handler: Handler<T>) {
        self.shared.mark_handled();

        let outcome = {
            let mut slot = self.shared.lock();
            match &mut *slot {
                Slot::Pending { continuations, .. } => {
                    continuations.push(Box::new(move |outcome: &Result<T, CoreError>| {
                        handler(outcome.clone())
                    }));
                    return;
                }
                Slot::Settled(outcome) => outcome.clone(),
            }
        };

        handler(outcome.as_ref().clone());
    }

    /// The outcome, if already settled.
    pub fn peek(&self) -> Option<Result<T, CoreError>> {
        let slot = self.shared.lock();
        match &*slot {
            Slot::Pending { .. } => None,
            Slot::Settled(outcome) => {
                self.shared.mark_handled();
                Some(outcome.as_ref().clone())
            }
        }
    }
}

impl<T: Clone> Future for Deferred<T> {
    type Output = Result<T, CoreError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slot = self.shared.lock();
        match &mut *slot {
            Slot::Settled(outcome) => {
                self.shared.mark_handled();
                Poll::Ready(outcome.as_ref().clone())
            }
            Slot::Pending { wakers, .. } => {
                if !wakers.iter().any(|w| w.will_wake(cx.waker())) {
                    wakers.push(cx.waker().clone());
                }
                Poll::Pending
            }
        }
    }
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.shared.lock() {
            Slot::Pending { .. } => "pending",
            Slot::Settled(outcome) if outcome.is_ok() => "resolved",
            Slot::Settled(_) => "rejected",
        };
        f.debug_struct("Deferred")
            .field("state", &state)
            .field("handled", &self.is_handled())
            .finish()
    }
}

impl<T> Resolver<T> {
    /// Settle the deferred value with `result`.
    pub fn settle(mut self, result: Result<T, CoreError>) {
        if let Some(shared) = self.shared.take() {
            shared.settle(result);
        }
    }

    pub fn resolve(self, value: T) {
        self.settle(Ok(value));
    }

    pub fn reject(self, error: CoreError) {
        self.settle(Err(error));
    }
}

impl<T: Send + Sync + 'static> Resolver<T> {
    /// Turn this resolver into a completion handler that settles the
    /// deferred value with whatever the handler receives.
    pub fn into_handler(self) -> Handler<T> {
        Box::new(move |result| self.settle(result))
    }
}

impl<T> Drop for Resolver<T> {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            shared.settle(Err(CoreError::Dropped));
        }
    }
}

impl<T> fmt::Debug for Resolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver").finish_non_exhaustive()
    }
}
