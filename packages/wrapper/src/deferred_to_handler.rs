//! Expose a deferred-native core through completion handlers.
//!
//! The inherent methods take an optional handler and always hand back the
//! core's own deferred value, so a caller may use either style per call. The
//! [`HandlerCore`] impl is the strict handler surface on top of them.

use hypercore_wrapper_api::{
    AuditReport, Bytes, Deferred, DeferredCore, GetOptions, Handler, HandlerCore, Hypercore,
    Range, RangeRequest, RequestToken, SeekOptions, SeekPosition, UpdateOptions, UsesHandlers,
};
use tracing::trace;

use crate::forwarder::{Forwarder, ToHandlers};

/// Adapter: wraps a deferred-native core to provide the handler interface.
pub type DeferredToHandler<P> = Forwarder<P, ToHandlers>;

/// Attach `handler` when there is one.
fn maybe<T>(handler: Option<Handler<T>>, deferred: Deferred<T>) -> Deferred<T>
where
    T: Clone + Send + Sync + 'static,
{
    if let Some(handler) = handler {
        deferred.when_settled(handler);
    }
    deferred
}

/// Like [`maybe`], for operations whose failure may be ignored silently.
fn maybe_optional<T>(handler: Option<Handler<T>>, deferred: Deferred<T>) -> Deferred<T>
where
    T: Clone + Send + Sync + 'static,
{
    maybe(handler, deferred.suppress_unhandled())
}

impl<P: DeferredCore> DeferredToHandler<P> {
    pub fn ready(&self, handler: Option<Handler<()>>) -> Deferred<()> {
        trace!(op = "ready", "deferred -> handler");
        maybe_optional(handler, self.inner().ready())
    }

    /// Read the block at `index`. The returned request carries the core's
    /// token for `cancel`.
    pub fn get(
        &self,
        index: u64,
        opts: GetOptions,
        handler: Option<Handler<Bytes>>,
    ) -> RangeRequest<Bytes> {
        trace!(op = "get", index, "deferred -> handler");
        let request = self.inner().get(index, opts);
        let value = maybe(handler, request.value);
        RangeRequest::new(value, request.token)
    }

    pub fn append(&self, batch: Vec<Bytes>, handler: Option<Handler<u64>>) -> Deferred<u64> {
        trace!(op = "append", blocks = batch.len(), "deferred -> handler");
        maybe_optional(handler, self.inner().append(batch))
    }

    pub fn update(&self, opts: UpdateOptions, handler: Option<Handler<()>>) -> Deferred<()> {
        trace!(op = "update", "deferred -> handler");
        maybe_optional(handler, self.inner().update(opts))
    }

    pub fn seek(
        &self,
        bytes: u64,
        opts: SeekOptions,
        handler: Option<Handler<SeekPosition>>,
    ) -> Deferred<SeekPosition> {
        trace!(op = "seek", bytes, "deferred -> handler");
        maybe(handler, self.inner().seek(bytes, opts))
    }

    pub fn download(&self, range: Range, handler: Option<Handler<()>>) -> RangeRequest<()> {
        trace!(op = "download", start = range.start, "deferred -> handler");
        let request = self.inner().download(range);
        let value = maybe_optional(handler, request.value);
        RangeRequest::new(value, request.token)
    }

    pub fn has(&self, start: u64, end: u64, handler: Option<Handler<bool>>) -> Deferred<bool> {
        trace!(op = "has", start, end, "deferred -> handler");
        maybe(handler, self.inner().has(start, end))
    }

    pub fn audit(&self, handler: Option<Handler<AuditReport>>) -> Deferred<AuditReport> {
        trace!(op = "audit", "deferred -> handler");
        maybe(handler, self.inner().audit())
    }

    pub fn destroy_storage(&self, handler: Option<Handler<()>>) -> Deferred<()> {
        trace!(op = "destroy_storage", "deferred -> handler");
        maybe(handler, self.inner().destroy_storage())
    }
}

impl<P: DeferredCore> Hypercore for DeferredToHandler<P> {
    type Convention = UsesHandlers;
}

// Method calls below resolve to the inherent methods above.
impl<P: DeferredCore> HandlerCore for DeferredToHandler<P> {
    fn ready(&self, handler: Handler<()>) {
        self.ready(Some(handler));
    }

    fn get(&self, index: u64, opts: GetOptions, handler: Handler<Bytes>) -> RequestToken {
        self.get(index, opts, Some(handler)).token
    }

    fn append(&self, batch: Vec<Bytes>, handler: Handler<u64>) {
        self.append(batch, Some(handler));
    }

    fn update(&self, opts: UpdateOptions, handler: Handler<()>) {
        self.update(opts, Some(handler));
    }

    fn seek(&self, bytes: u64, opts: SeekOptions, handler: Handler<SeekPosition>) {
        self.seek(bytes, opts, Some(handler));
    }

    fn download(&self, range: Range, handler: Handler<()>) -> RequestToken {
        self.download(range, Some(handler)).token
    }

    fn has(&self, start: u64, end: u64, handler: Handler<bool>) {
        self.has(start, end, Some(handler));
    }

    fn audit(&self, handler: Handler<AuditReport>) {
        self.audit(Some(handler));
    }

    fn destroy_storage(&self, handler: Handler<()>) {
        self.destroy_storage(Some(handler));
    }
}
