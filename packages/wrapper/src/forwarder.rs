//! The shared base of both adapters.
//!
//! A [`Forwarder`] owns one core and makes itself indistinguishable from it
//! for everything that does not depend on the calling convention:
//!
//! - Property reads go straight to the core, uncached.
//! - `subscribe`/`unsubscribe` register the listener on the core itself, so
//!   it receives the core's own emissions with the original arguments.
//! - Synchronous and control operations are passed through unchanged.
//!
//! The direction parameter `D` selects which asynchronous surface the
//! forwarder adds on top; see [`HandlerToDeferred`](crate::HandlerToDeferred)
//! and [`DeferredToHandler`](crate::DeferredToHandler).

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use hypercore_wrapper_api::{
    Bytes, CoreControl, CoreProperties, EventSource, ExtensionHandlers, Listener, Peer,
    ReadStreamOptions, ReplicateOptions, RequestTarget, ValueEncoding, WriteStreamOptions,
};
use tracing::trace;

/// Conversion direction of a [`Forwarder`].
pub trait Direction: 'static {
    /// Adapter name used in logs and `Debug` output.
    const NAME: &'static str;
}

/// Wraps a handler-native core to expose deferred values.
#[derive(Debug)]
pub enum ToDeferred {}

/// Wraps a deferred-native core to expose completion handlers.
#[derive(Debug)]
pub enum ToHandlers {}

impl Direction for ToDeferred {
    const NAME: &'static str = "HandlerToDeferred";
}

impl Direction for ToHandlers {
    const NAME: &'static str = "DeferredToHandler";
}

/// Property and event forwarding around a wrapped core.
pub struct Forwarder<C, D> {
    inner: C,
    _direction: PhantomData<D>,
}

impl<C, D: Direction> Forwarder<C, D> {
    /// Wrap `inner`.
    pub fn new(inner: C) -> Self {
        tracing::debug!(adapter = D::NAME, "wrapping core");
        Self {
            inner,
            _direction: PhantomData,
        }
    }

    /// Get a reference to the wrapped core.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Get a mutable reference to the wrapped core.
    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    /// Unwrap, returning the wrapped core.
    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: fmt::Debug, D: Direction> fmt::Debug for Forwarder<C, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(D::NAME).field("inner", &self.inner).finish()
    }
}

impl<C: CoreProperties, D> CoreProperties for Forwarder<C, D> {
    fn key(&self) -> Option<Bytes> {
        self.inner.key()
    }

    fn discovery_key(&self) -> Option<Bytes> {
        self.inner.discovery_key()
    }

    fn length(&self) -> u64 {
        self.inner.length()
    }

    fn byte_length(&self) -> u64 {
        self.inner.byte_length()
    }

    fn writable(&self) -> bool {
        self.inner.writable()
    }

    fn sparse(&self) -> bool {
        self.inner.sparse()
    }

    fn peers(&self) -> Vec<Peer> {
        self.inner.peers()
    }

    fn value_encoding(&self) -> ValueEncoding {
        self.inner.value_encoding()
    }

    fn weak(&self) -> bool {
        self.inner.weak()
    }

    fn lazy(&self) -> bool {
        self.inner.lazy()
    }
}

impl<C: EventSource, D> EventSource for Forwarder<C, D> {
    fn subscribe(&self, event: &str, listener: Listener) {
        trace!(event, "forwarding subscribe");
        self.inner.subscribe(event, listener);
    }

    fn unsubscribe(&self, event: &str, listener: &Listener) {
        trace!(event, "forwarding unsubscribe");
        self.inner.unsubscribe(event, listener);
    }
}

impl<C: CoreControl, D> CoreControl for Forwarder<C, D> {
    type ReadStream = C::ReadStream;
    type WriteStream = C::WriteStream;
    type Replication = C::Replication;
    type Extension = C::Extension;

    fn create_read_stream(&self, opts: ReadStreamOptions) -> Self::ReadStream {
        self.inner.create_read_stream(opts)
    }

    fn create_write_stream(&self, opts: WriteStreamOptions) -> Self::WriteStream {
        self.inner.create_write_stream(opts)
    }

    fn undownload(&self, target: RequestTarget) {
        trace!(?target, "forwarding undownload");
        self.inner.undownload(target);
    }

    fn cancel(&self, target: RequestTarget) {
        trace!(?target, "forwarding cancel");
        self.inner.cancel(target);
    }

    fn replicate(&self, initiator: bool, opts: ReplicateOptions) -> Self::Replication {
        self.inner.replicate(initiator, opts)
    }

    fn register_extension(
        &self,
        name: &str,
        handlers: Arc<dyn ExtensionHandlers>,
    ) -> Self::Extension {
        self.inner.register_extension(name, handlers)
    }

    fn set_uploading(&self, uploading: bool) {
        self.inner.set_uploading(uploading);
    }

    fn set_downloading(&self, downloading: bool) {
        self.inner.set_downloading(downloading);
    }
}
