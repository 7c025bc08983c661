//! Scripted in-memory cores for tests.
//!
//! `MockCore` is handler-native and `MockDeferredCore` is deferred-native;
//! both run the same state machine. Completions happen immediately unless the
//! core is holding, in which case they queue until `release` or until a
//! matching `cancel`.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use hypercore_wrapper_api::{
    AuditReport, Bytes, CoreControl, CoreError, CoreProperties, Deferred, DeferredCore, Emitter,
    EventArg, EventSource, ExtensionHandlers, GetOptions, Handler, HandlerCore, Hypercore,
    Listener, Peer, Range, RangeRequest, ReadStreamOptions, ReplicateOptions, RequestTarget,
    RequestToken, SeekOptions, SeekPosition, UpdateOptions, UsesDeferred, UsesHandlers,
    ValueEncoding, WriteStreamOptions,
};

pub(crate) type MockCore = Mock<UsesHandlers>;
pub(crate) type MockDeferredCore = Mock<UsesDeferred>;

struct Held {
    token: Option<RequestToken>,
    complete: Box<dyn FnOnce(Option<CoreError>) + Send>,
}

#[derive(Default)]
struct MockState {
    emitter: Emitter,
    blocks: Mutex<Vec<Bytes>>,
    peers: Mutex<Vec<Peer>>,
    read_only: AtomicBool,
    not_uploading: AtomicBool,
    not_downloading: AtomicBool,
    failure: Mutex<Option<CoreError>>,
    holding: AtomicBool,
    held: Mutex<Vec<Held>>,
    next_token: AtomicU64,
    calls: Mutex<Vec<&'static str>>,
    cancelled: Mutex<Vec<RequestTarget>>,
    undownloaded: Mutex<Vec<RequestTarget>>,
    extensions: Mutex<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MockReplication {
    pub initiator: bool,
    pub opts: ReplicateOptions,
}

#[derive(Debug)]
pub(crate) struct Mock<K> {
    state: Arc<MockState>,
    _convention: PhantomData<K>,
}

impl<K> Clone for Mock<K> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            _convention: PhantomData,
        }
    }
}

impl std::fmt::Debug for MockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockState").finish_non_exhaustive()
    }
}

impl<K> Mock<K> {
    pub(crate) fn new() -> Self {
        Self {
            state: Arc::new(MockState::default()),
            _convention: PhantomData,
        }
    }

    pub(crate) fn push_block(&self, block: Bytes) {
        self.state.blocks.lock().unwrap().push(block);
    }

    pub(crate) fn set_writable(&self, writable: bool) {
        self.state.read_only.store(!writable, Ordering::SeqCst);
    }

    pub(crate) fn add_peer(&self, peer: Peer) {
        self.state.peers.lock().unwrap().push(peer);
    }

    pub(crate) fn emit(&self, event: &str, args: &[EventArg]) -> bool {
        self.state.emitter.emit(event, args)
    }

    pub(crate) fn listener_count(&self, event: &str) -> usize {
        self.state.emitter.listener_count(event)
    }

    /// Fail every asynchronous operation that completes from now on.
    pub(crate) fn fail_with(&self, error: CoreError) {
        *self.state.failure.lock().unwrap() = Some(error);
    }

    /// Queue completions instead of delivering them.
    pub(crate) fn hold(&self) {
        self.state.holding.store(true, Ordering::SeqCst);
    }

    /// Deliver every queued completion, in call order.
    pub(crate) fn release(&self) {
        self.state.holding.store(false, Ordering::SeqCst);
        let held = std::mem::take(&mut *self.state.held.lock().unwrap());
        for entry in held {
            (entry.complete)(None);
        }
    }

    pub(crate) fn held_count(&self) -> usize {
        self.state.held.lock().unwrap().len()
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.state.calls.lock().unwrap().clone()
    }

    pub(crate) fn cancelled(&self) -> Vec<RequestTarget> {
        self.state.cancelled.lock().unwrap().clone()
    }

    pub(crate) fn undownloaded(&self) -> Vec<RequestTarget> {
        self.state.undownloaded.lock().unwrap().clone()
    }

    pub(crate) fn extensions(&self) -> Vec<String> {
        self.state.extensions.lock().unwrap().clone()
    }

    pub(crate) fn uploading(&self) -> bool {
        !self.state.not_uploading.load(Ordering::SeqCst)
    }

    pub(crate) fn downloading(&self) -> bool {
        !self.state.not_downloading.load(Ordering::SeqCst)
    }

    fn mint_token(&self) -> RequestToken {
        RequestToken::new(self.state.next_token.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Run one asynchronous operation: record it, then complete now or queue.
    fn run<T, F>(
        &self,
        op: &'static str,
        token: Option<RequestToken>,
        handler: Handler<T>,
        compute: F,
    )
    where
        T: Send + 'static,
        F: FnOnce(&MockState) -> Result<T, CoreError> + Send + 'static,
    {
        self.state.calls.lock().unwrap().push(op);

        let state = self.state.clone();
        let complete: Box<dyn FnOnce(Option<CoreError>) + Send> = Box::new(move |interrupt: Option<CoreError>| {
            let failure = state.failure.lock().unwrap().clone();
            let result = match (interrupt, failure) {
                (Some(e), _) | (None, Some(e)) => Err(e),
                (None, None) => compute(state.as_ref()),
            };
            handler(result);
        });

        if self.state.holding.load(Ordering::SeqCst) {
            self.state.held.lock().unwrap().push(Held { token, complete });
        } else {
            complete(None);
        }
    }

    fn interrupt(&self, token: RequestToken) {
        let entry = {
            let mut held = self.state.held.lock().unwrap();
            held.iter()
                .position(|h| h.token == Some(token))
                .map(|pos| held.remove(pos))
        };
        if let Some(entry) = entry {
            (entry.complete)(Some(CoreError::Cancelled));
        }
    }

    fn native_ready(&self, handler: Handler<()>) {
        self.run("ready", None, handler, |_| Ok(()));
    }

    fn native_get(&self, index: u64, _opts: GetOptions, handler: Handler<Bytes>) -> RequestToken {
        let token = self.mint_token();
        self.run("get", Some(token), handler, move |state| {
            state
                .blocks
                .lock()
                .unwrap()
                .get(index as usize)
                .cloned()
                .ok_or_else(|| CoreError::operation(format!("block {} not available", index)))
        });
        token
    }

    fn native_append(&self, batch: Vec<Bytes>, handler: Handler<u64>) {
        self.run("append", None, handler, move |state| {
            if state.read_only.load(Ordering::SeqCst) {
                return Err(CoreError::operation("core is not writable"));
            }
            let mut blocks = state.blocks.lock().unwrap();
            let first = blocks.len() as u64;
            blocks.extend(batch);
            Ok(first)
        });
    }

    fn native_update(&self, _opts: UpdateOptions, handler: Handler<()>) {
        self.run("update", None, handler, |_| Ok(()));
    }

    fn native_seek(&self, bytes: u64, _opts: SeekOptions, handler: Handler<SeekPosition>) {
        self.run("seek", None, handler, move |state| {
            let mut remaining = bytes;
            for (index, block) in state.blocks.lock().unwrap().iter().enumerate() {
                let len = block.len() as u64;
                if remaining < len {
                    return Ok(SeekPosition {
                        index: index as u64,
                        offset: remaining,
                    });
                }
                remaining -= len;
            }
            Err(CoreError::operation("seek out of bounds"))
        });
    }

    fn native_download(&self, _range: Range, handler: Handler<()>) -> RequestToken {
        let token = self.mint_token();
        self.run("download", Some(token), handler, |_| Ok(()));
        token
    }

    fn native_has(&self, start: u64, end: u64, handler: Handler<bool>) {
        self.run("has", None, handler, move |state| {
            let len = state.blocks.lock().unwrap().len() as u64;
            Ok(start <= end && end <= len)
        });
    }

    fn native_audit(&self, handler: Handler<AuditReport>) {
        self.run("audit", None, handler, |_| Ok(AuditReport::default()));
    }

    fn native_destroy_storage(&self, handler: Handler<()>) {
        self.run("destroy_storage", None, handler, |state| {
            state.blocks.lock().unwrap().clear();
            Ok(())
        });
    }
}

fn deferred<T, F>(call: F) -> Deferred<T>
where
    T: Send + Sync + 'static,
    F: FnOnce(Handler<T>),
{
    let (resolver, deferred) = Deferred::pending();
    call(resolver.into_handler());
    deferred
}

impl<K> CoreProperties for Mock<K> {
    fn key(&self) -> Option<Bytes> {
        Some(Bytes::from_static(b"mock-key"))
    }

    fn discovery_key(&self) -> Option<Bytes> {
        Some(Bytes::from_static(b"mock-discovery-key"))
    }

    fn length(&self) -> u64 {
        self.state.blocks.lock().unwrap().len() as u64
    }

    fn byte_length(&self) -> u64 {
        self.state
            .blocks
            .lock()
            .unwrap()
            .iter()
            .map(|b| b.len() as u64)
            .sum()
    }

    fn writable(&self) -> bool {
        !self.state.read_only.load(Ordering::SeqCst)
    }

    fn sparse(&self) -> bool {
        true
    }

    fn peers(&self) -> Vec<Peer> {
        self.state.peers.lock().unwrap().clone()
    }

    fn value_encoding(&self) -> ValueEncoding {
        ValueEncoding::Binary
    }

    fn weak(&self) -> bool {
        false
    }

    fn lazy(&self) -> bool {
        false
    }
}

impl<K> EventSource for Mock<K> {
    fn subscribe(&self, event: &str, listener: Listener) {
        self.state.emitter.subscribe(event, listener);
    }

    fn unsubscribe(&self, event: &str, listener: &Listener) {
        self.state.emitter.unsubscribe(event, listener);
    }
}

impl<K> CoreControl for Mock<K> {
    type ReadStream = Vec<Bytes>;
    type WriteStream = WriteStreamOptions;
    type Replication = MockReplication;
    type Extension = String;

    fn create_read_stream(&self, opts: ReadStreamOptions) -> Vec<Bytes> {
        let blocks = self.state.blocks.lock().unwrap();
        let end = opts.end.map_or(blocks.len(), |e| e as usize).min(blocks.len());
        let start = (opts.start as usize).min(end);
        blocks[start..end].to_vec()
    }

    fn create_write_stream(&self, opts: WriteStreamOptions) -> WriteStreamOptions {
        opts
    }

    fn undownload(&self, target: RequestTarget) {
        self.state.undownloaded.lock().unwrap().push(target.clone());
        if let Some(token) = target.token() {
            self.interrupt(token);
        }
    }

    fn cancel(&self, target: RequestTarget) {
        self.state.cancelled.lock().unwrap().push(target.clone());
        if let Some(token) = target.token() {
            self.interrupt(token);
        }
    }

    fn replicate(&self, initiator: bool, opts: ReplicateOptions) -> MockReplication {
        MockReplication { initiator, opts }
    }

    fn register_extension(&self, name: &str, _handlers: Arc<dyn ExtensionHandlers>) -> String {
        self.state.extensions.lock().unwrap().push(name.to_string());
        name.to_string()
    }

    fn set_uploading(&self, uploading: bool) {
        self.state.not_uploading.store(!uploading, Ordering::SeqCst);
    }

    fn set_downloading(&self, downloading: bool) {
        self.state.not_downloading.store(!downloading, Ordering::SeqCst);
    }
}

impl Hypercore for MockCore {
    type Convention = UsesHandlers;
}

impl Hypercore for MockDeferredCore {
    type Convention = UsesDeferred;
}

impl HandlerCore for MockCore {
    fn ready(&self, handler: Handler<()>) {
        self.native_ready(handler);
    }

    fn get(&self, index: u64, opts: GetOptions, handler: Handler<Bytes>) -> RequestToken {
        self.native_get(index, opts, handler)
    }

    fn append(&self, batch: Vec<Bytes>, handler: Handler<u64>) {
        self.native_append(batch, handler);
    }

    fn update(&self, opts: UpdateOptions, handler: Handler<()>) {
        self.native_update(opts, handler);
    }

    fn seek(&self, bytes: u64, opts: SeekOptions, handler: Handler<SeekPosition>) {
        self.native_seek(bytes, opts, handler);
    }

    fn download(&self, range: Range, handler: Handler<()>) -> RequestToken {
        self.native_download(range, handler)
    }

    fn has(&self, start: u64, end: u64, handler: Handler<bool>) {
        self.native_has(start, end, handler);
    }

    fn audit(&self, handler: Handler<AuditReport>) {
        self.native_audit(handler);
    }

    fn destroy_storage(&self, handler: Handler<()>) {
        self.native_destroy_storage(handler);
    }
}

impl DeferredCore for MockDeferredCore {
    fn ready(&self) -> Deferred<()> {
        deferred(|h| self.native_ready(h))
    }

    fn get(&self, index: u64, opts: GetOptions) -> RangeRequest<Bytes> {
        let (resolver, value) = Deferred::pending();
        let token = self.native_get(index, opts, resolver.into_handler());
        RangeRequest::new(value, token)
    }

    fn append(&self, batch: Vec<Bytes>) -> Deferred<u64> {
        deferred(|h| self.native_append(batch, h))
    }

    fn update(&self, opts: UpdateOptions) -> Deferred<()> {
        deferred(|h| self.native_update(opts, h))
    }

    fn seek(&self, bytes: u64, opts: SeekOptions) -> Deferred<SeekPosition> {
        deferred(|h| self.native_seek(bytes, opts, h))
    }

    fn download(&self, range: Range) -> RangeRequest<()> {
        let (resolver, value) = Deferred::pending();
        let token = self.native_download(range, resolver.into_handler());
        RangeRequest::new(value, token)
    }

    fn has(&self, start: u64, end: u64) -> Deferred<bool> {
        deferred(|h| self.native_has(start, end, h))
    }

    fn audit(&self) -> Deferred<AuditReport> {
        deferred(|h| self.native_audit(h))
    }

    fn destroy_storage(&self) -> Deferred<()> {
        deferred(|h| self.native_destroy_storage(h))
    }
}
