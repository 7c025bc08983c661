//! Value types passed to and returned from hypercore operations.

use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::deferred::Deferred;

/// How block values are encoded by the resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueEncoding {
    #[default]
    Binary,
    Utf8,
    Json,
}

/// A connected replication peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    /// Remote public key.
    pub remote_public_key: Bytes,
    /// Whether the remote side opened the connection.
    pub initiator: bool,
}

/// Options for `get`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetOptions {
    /// Wait for the block to be downloaded instead of failing.
    pub wait: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
    /// Override the core's value encoding for this read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_encoding: Option<ValueEncoding>,
}

/// Options for `update`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOptions {
    /// Only update from peers that already have the data.
    pub if_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
}

/// Options for `seek`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeekOptions {
    pub wait: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

/// Result of `seek`: the block containing a byte offset and the offset
/// within that block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeekPosition {
    pub index: u64,
    pub offset: u64,
}

/// A block range for `download` and `undownload`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: u64,
    /// Exclusive end. `None` means open-ended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<u64>,
    /// Download blocks in order instead of randomly.
    pub linear: bool,
}

impl Range {
    /// A closed range `[start, end)`.
    pub fn new(start: u64, end: u64) -> Self {
        Self {
            start,
            end: Some(end),
            linear: false,
        }
    }

    /// An open-ended range starting at `start`.
    pub fn starting_at(start: u64) -> Self {
        Self {
            start,
            end: None,
            linear: false,
        }
    }

    pub fn linear(mut self) -> Self {
        self.linear = true;
        self
    }
}

/// Result of `audit`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    /// Merkle tree nodes that were repaired.
    pub tree_nodes: u64,
    /// Blocks that were dropped because they failed verification.
    pub blocks: u64,
}

/// Options for `create_read_stream`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadStreamOptions {
    pub start: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<u64>,
    /// Keep the stream open and emit blocks as they are appended.
    pub live: bool,
    /// Fix the end to the length at the time the stream was created.
    pub snapshot: bool,
}

/// Options for `create_write_stream`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteStreamOptions {
    /// Blocks buffered before an append is issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_water_mark: Option<usize>,
}

/// Options for `replicate`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicateOptions {
    pub live: bool,
    pub keep_alive: bool,
}

/// Opaque handle to an in-flight `get` or `download`.
///
/// Tokens are minted by the resource; the adapters only carry them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// A range operation in the deferred convention: the eventual result plus
/// the token that cancels it.
///
/// The token is available as soon as the call returns, before `value`
/// settles.
#[derive(Debug, Clone)]
pub struct RangeRequest<T> {
    pub value: Deferred<T>,
    pub token: RequestToken,
}

impl<T> RangeRequest<T> {
    pub fn new(value: Deferred<T>, token: RequestToken) -> Self {
        Self { value, token }
    }

    /// Split into the deferred value and the token.
    pub fn into_parts(self) -> (Deferred<T>, RequestToken) {
        (self.value, self.token)
    }
}

/// What `cancel` and `undownload` act on: a raw range or an in-flight request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestTarget {
    Range(Range),
    Request(RequestToken),
}

impl RequestTarget {
    /// The request token, if this target names an in-flight request.
    pub fn token(&self) -> Option<RequestToken> {
        match self {
            RequestTarget::Request(token) => Some(*token),
            RequestTarget::Range(_) => None,
        }
    }
}

impl From<Range> for RequestTarget {
    fn from(range: Range) -> Self {
        RequestTarget::Range(range)
    }
}

impl From<RequestToken> for RequestTarget {
    fn from(token: RequestToken) -> Self {
        RequestTarget::Request(token)
    }
}

impl<T> From<&RangeRequest<T>> for RequestTarget {
    fn from(request: &RangeRequest<T>) -> Self {
        RequestTarget::Request(request.token)
    }
}
