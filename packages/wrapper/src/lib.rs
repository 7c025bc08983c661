//! Convert hypercores between the completion-handler and deferred-value
//! conventions.
//!
//! Both adapters forward properties, events and control operations straight
//! to the wrapped core; only the asynchronous operations change shape.
//!
//! # Example
//!
//! ```rust,ignore
//! use hypercore_wrapper::{to_deferred_style, to_handler_style};
//!
//! // Handler-native core, deferred-value API:
//! let core = to_deferred_style(my_core);
//! let first = core.append(vec![block]).await?;
//!
//! // And back again, for code that wants handlers:
//! let core = to_handler_style(core);
//! core.get(first, Default::default(), Some(Box::new(|result| { /* ... */ })));
//! ```

mod deferred_to_handler;
mod dispatch;
mod forwarder;
mod handler_to_deferred;

#[cfg(test)]
mod mock;
#[cfg(test)]
mod test_support;

pub use deferred_to_handler::DeferredToHandler;
pub use dispatch::{to_deferred_style, to_handler_style, Dispatch};
pub use forwarder::{Direction, Forwarder, ToDeferred, ToHandlers};
pub use handler_to_deferred::HandlerToDeferred;

pub use hypercore_wrapper_api as api;
