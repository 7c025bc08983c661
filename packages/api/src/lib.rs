//! The contract between hypercores and the convention adapters.
//!
//! A hypercore exposes the same operations in one of two calling
//! conventions:
//!
//! - **Completion handlers** ([`HandlerCore`]): each asynchronous operation
//!   takes a [`Handler`] that is invoked exactly once with the outcome.
//! - **Deferred values** ([`DeferredCore`]): each asynchronous operation
//!   returns a [`Deferred`], an eager single-resolution future.
//!
//! Both share [`CoreProperties`], [`EventSource`] and [`CoreControl`], and
//! declare their native convention through [`Hypercore::Convention`].
//!
//! # Example
//!
//! ```rust
//! use hypercore_wrapper_api::{CoreError, Deferred};
//!
//! let (resolver, block) = Deferred::pending();
//! block.when_settled(Box::new(|result: Result<u64, CoreError>| {
//!     assert_eq!(result.unwrap(), 7);
//! }));
//! resolver.resolve(7);
//! ```

pub use bytes::Bytes;

mod deferred;
mod error;
mod events;
mod traits;
mod types;
mod unhandled;

pub use deferred::{Deferred, Handler, Resolver};
pub use error::CoreError;
pub use events::{Emitter, EventArg, EventSource, Listener};
pub use traits::{
    uses_deferred, Convention, CoreControl, CoreProperties, DeferredCore, ExtensionHandlers,
    HandlerCore, Hypercore, PropertySnapshot, UsesDeferred, UsesHandlers, PUBLIC_PROPERTIES,
};
pub use types::{
    AuditReport, GetOptions, Peer, Range, RangeRequest, ReadStreamOptions, ReplicateOptions,
    RequestTarget, RequestToken, SeekOptions, SeekPosition, UpdateOptions, ValueEncoding,
    WriteStreamOptions,
};
pub use unhandled::{set_unhandled_failure_hook, take_unhandled_failure_hook, UnhandledFailureHook};
