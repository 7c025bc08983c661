//! The hypercore contract, split by concern.
//!
//! Properties, events and the synchronous control operations look the same
//! in both calling conventions. Only the asynchronous operations differ:
//! [`HandlerCore`] takes a completion handler, [`DeferredCore`] returns a
//! [`Deferred`].

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{
    AuditReport, Deferred, EventSource, GetOptions, Handler, Peer, Range, RangeRequest,
    ReadStreamOptions, ReplicateOptions, RequestTarget, RequestToken, SeekOptions,
    SeekPosition, UpdateOptions, ValueEncoding, WriteStreamOptions,
};

/// Names of the public read-only properties, in declaration order.
pub const PUBLIC_PROPERTIES: [&str; 10] = [
    "key",
    "discoveryKey",
    "length",
    "byteLength",
    "writable",
    "sparse",
    "peers",
    "valueEncoding",
    "weak",
    "lazy",
];

/// Read-only properties of a hypercore.
///
/// Every read reflects the core's current state.
pub trait CoreProperties {
    /// Public key identifying the core, once it is known.
    fn key(&self) -> Option<Bytes>;
    /// Hash of the key used to find peers without revealing the key.
    fn discovery_key(&self) -> Option<Bytes>;
    /// Number of blocks.
    fn length(&self) -> u64;
    /// Total size of all blocks in bytes.
    fn byte_length(&self) -> u64;
    fn writable(&self) -> bool;
    fn sparse(&self) -> bool;
    fn peers(&self) -> Vec<Peer>;
    fn value_encoding(&self) -> ValueEncoding;
    fn weak(&self) -> bool;
    fn lazy(&self) -> bool;

    /// Capture every public property at once.
    fn snapshot(&self) -> PropertySnapshot {
        PropertySnapshot {
            key: self.key(),
            discovery_key: self.discovery_key(),
            length: self.length(),
            byte_length: self.byte_length(),
            writable: self.writable(),
            sparse: self.sparse(),
            peers: self.peers(),
            value_encoding: self.value_encoding(),
            weak: self.weak(),
            lazy: self.lazy(),
        }
    }
}

/// Point-in-time copy of a core's public properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySnapshot {
    pub key: Option<Bytes>,
    pub discovery_key: Option<Bytes>,
    pub length: u64,
    pub byte_length: u64,
    pub writable: bool,
    pub sparse: bool,
    pub peers: Vec<Peer>,
    pub value_encoding: ValueEncoding,
    pub weak: bool,
    pub lazy: bool,
}

/// Handlers for a replication protocol extension.
pub trait ExtensionHandlers: Send + Sync {
    /// Called for every message received on the extension.
    fn on_message(&self, message: Bytes, from: &Peer);
}

/// Synchronous and control operations.
///
/// These return immediately and are identical in both conventions. The
/// stream, replication and extension values are whatever the resource hands
/// back; wrappers pass them through untouched.
pub trait CoreControl {
    type ReadStream;
    type WriteStream;
    type Replication;
    type Extension;

    fn create_read_stream(&self, opts: ReadStreamOptions) -> Self::ReadStream;
    fn create_write_stream(&self, opts: WriteStreamOptions) -> Self::WriteStream;

    /// Stop downloading a range, or the in-flight `download` behind a token.
    fn undownload(&self, target: RequestTarget);

    /// Cancel an in-flight `get` or `download`.
    fn cancel(&self, target: RequestTarget);

    fn replicate(&self, initiator: bool, opts: ReplicateOptions) -> Self::Replication;
    fn register_extension(
        &self,
        name: &str,
        handlers: Arc<dyn ExtensionHandlers>,
    ) -> Self::Extension;
    fn set_uploading(&self, uploading: bool);
    fn set_downloading(&self, downloading: bool);
}

/// Marker for a calling convention.
pub trait Convention: 'static {
    /// True for the deferred-value convention.
    const USES_DEFERRED: bool;
}

/// The completion-handler convention.
#[derive(Debug)]
pub enum UsesHandlers {}

/// The deferred-value convention.
#[derive(Debug)]
pub enum UsesDeferred {}

impl Convention for UsesHandlers {
    const USES_DEFERRED: bool = false;
}

impl Convention for UsesDeferred {
    const USES_DEFERRED: bool = true;
}

/// A hypercore, in either convention.
pub trait Hypercore: CoreProperties + EventSource + CoreControl + Send + Sync {
    /// The convention this core implements natively.
    type Convention: Convention;
}

/// Returns true if `core` natively returns deferred values.
pub fn uses_deferred<C: Hypercore + ?Sized>(_core: &C) -> bool {
    <C::Convention as Convention>::USES_DEFERRED
}

/// Asynchronous operations in the completion-handler convention.
///
/// Every operation invokes its handler exactly once. Range operations
/// return their request token immediately.
pub trait HandlerCore: Hypercore {
    fn ready(&self, handler: Handler<()>);

    /// Read the block at `index`.
    fn get(&self, index: u64, opts: GetOptions, handler: Handler<Bytes>) -> RequestToken;

    /// Append a batch of blocks. The handler receives the index of the first
    /// appended block.
    fn append(&self, batch: Vec<Bytes>, handler: Handler<u64>);

    fn update(&self, opts: UpdateOptions, handler: Handler<()>);

    /// Find the block holding byte offset `bytes`.
    fn seek(&self, bytes: u64, opts: SeekOptions, handler: Handler<SeekPosition>);

    fn download(&self, range: Range, handler: Handler<()>) -> RequestToken;

    /// Whether every block in `[start, end)` is stored locally.
    fn has(&self, start: u64, end: u64, handler: Handler<bool>);

    fn audit(&self, handler: Handler<AuditReport>);

    fn destroy_storage(&self, handler: Handler<()>);
}

/// Asynchronous operations in the deferred-value convention.
pub trait DeferredCore: Hypercore {
    fn ready(&self) -> Deferred<()>;
    fn get(&self, index: u64, opts: GetOptions) -> RangeRequest<Bytes>;
    fn append(&self, batch: Vec<Bytes>) -> Deferred<u64>;
    fn update(&self, opts: UpdateOptions) -> Deferred<()>;
    fn seek(&self, bytes: u64, opts: SeekOptions) -> Deferred<SeekPosition>;
    fn download(&self, range: Range) -> RangeRequest<()>;
    fn has(&self, start: u64, end: u64) -> Deferred<bool>;
    fn audit(&self) -> Deferred<AuditReport>;
    fn destroy_storage(&self) -> Deferred<()>;
}
