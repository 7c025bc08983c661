//! Expose a handler-native core through deferred values.
//!
//! Each asynchronous call hands the core a completion handler backed by a
//! fresh [`Deferred`] and returns that deferred value immediately. The core
//! settles it whenever its own completion path runs.
//!
//! `ready`, `append`, `update` and `download` are fire-and-forget in
//! practice, so their deferred values are marked handled: ignoring a failure
//! there never reaches the unhandled-failure hook. `get`, `seek`, `has`,
//! `audit` and `destroy_storage` return results callers need, so an ignored
//! failure is still reported.

use hypercore_wrapper_api::{
    AuditReport, Bytes, Deferred, DeferredCore, GetOptions, Handler, HandlerCore, Hypercore,
    Range, RangeRequest, SeekOptions, SeekPosition, UpdateOptions, UsesDeferred,
};
use tracing::trace;

use crate::forwarder::{Forwarder, ToDeferred};

/// Adapter: wraps a handler-native core to provide the deferred interface.
///
/// # Example
///
/// ```rust,ignore
/// use hypercore_wrapper::HandlerToDeferred;
/// use hypercore_wrapper_api::DeferredCore;
///
/// let core = HandlerToDeferred::new(my_handler_core);
/// let seq = core.append(vec![block]).await?;
/// let request = core.get(seq, Default::default());
/// core.cancel((&request).into());
/// ```
pub type HandlerToDeferred<C> = Forwarder<C, ToDeferred>;

/// Call `native` with a handler that settles the returned deferred value.
fn with_handler<T, R>(native: impl FnOnce(Handler<T>) -> R) -> (Deferred<T>, R)
where
    T: Send + Sync + 'static,
{
    let (resolver, deferred) = Deferred::pending();
    let returned = native(resolver.into_handler());
    (deferred, returned)
}

impl<C: HandlerCore> Hypercore for HandlerToDeferred<C> {
    type Convention = UsesDeferred;
}

impl<C: HandlerCore> DeferredCore for HandlerToDeferred<C> {
    fn ready(&self) -> Deferred<()> {
        trace!(op = "ready", "handler -> deferred");
        let (deferred, ()) = with_handler(|h| self.inner().ready(h));
        deferred.suppress_unhandled()
    }

    fn get(&self, index: u64, opts: GetOptions) -> RangeRequest<Bytes> {
        trace!(op = "get", index, "handler -> deferred");
        let (value, token) = with_handler(|h| self.inner().get(index, opts, h));
        RangeRequest::new(value, token)
    }

    fn append(&self, batch: Vec<Bytes>) -> Deferred<u64> {
        trace!(op = "append", blocks = batch.len(), "handler -> deferred");
        let (deferred, ()) = with_handler(|h| self.inner().append(batch, h));
        deferred.suppress_unhandled()
    }

    fn update(&self, opts: UpdateOptions) -> Deferred<()> {
        trace!(op = "update", "handler -> deferred");
        let (deferred, ()) = with_handler(|h| self.inner().update(opts, h));
        deferred.suppress_unhandled()
    }

    fn seek(&self, bytes: u64, opts: SeekOptions) -> Deferred<SeekPosition> {
        trace!(op = "seek", bytes, "handler -> deferred");
        with_handler(|h| self.inner().seek(bytes, opts, h)).0
    }

    fn download(&self, range: Range) -> RangeRequest<()> {
        trace!(op = "download", start = range.start, "handler -> deferred");
        let (value, token) = with_handler(|h| self.inner().download(range, h));
        RangeRequest::new(value.suppress_unhandled(), token)
    }

    fn has(&self, start: u64, end: u64) -> Deferred<bool> {
        trace!(op = "has", start, end, "handler -> deferred");
        with_handler(|h| self.inner().has(start, end, h)).0
    }

    fn audit(&self) -> Deferred<AuditReport> {
        trace!(op = "audit", "handler -> deferred");
        with_handler(|h| self.inner().audit(h)).0
    }

    fn destroy_storage(&self) -> Deferred<()> {
        trace!(op = "destroy_storage", "handler -> deferred");
        with_handler(|h| self.inner().destroy_storage(h)).0
    }
}
