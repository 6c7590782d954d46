use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::models::FlowKind;

/// HTTP header carrying the call id to the service
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Identifier attached to every outgoing recommendation call
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CallId(pub Uuid);

impl CallId {
    /// Creates a new random call ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for CallId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CallId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything a single call carries through the provider
#[derive(Clone, Debug)]
pub struct CallContext {
    pub id: CallId,
    pub flow: FlowKind,
    /// Monotonic per flow, starting at 1
    pub seq: u64,
    pub cancel: CancellationToken,
}

impl CallContext {
    pub fn new(flow: FlowKind, seq: u64, cancel: CancellationToken) -> Self {
        Self {
            id: CallId::new(),
            flow,
            seq,
            cancel,
        }
    }

    /// Span grouping every log line of this call
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "recommendation_call",
            call_id = %self.id,
            flow = %self.flow,
            seq = self.seq,
        )
    }
}

/// Whether a resolving call is still the newest one issued in its flow
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Current,
    Stale { latest: u64 },
}

impl Resolution {
    pub fn classify(seq: u64, latest_issued: u64) -> Self {
        if seq == latest_issued {
            Resolution::Current
        } else {
            Resolution::Stale {
                latest: latest_issued,
            }
        }
    }
}
