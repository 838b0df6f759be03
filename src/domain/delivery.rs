/// Classification of one delivery attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// The push service accepted the message.
    Delivered,
    /// The attempt failed but the endpoint may recover (network error,
    /// throttling, timeout). Not retried within the same broadcast.
    TransientFailure,
    /// The push service reported the endpoint permanently invalid; the
    /// subscription must be retired.
    PermanentlyGone,
}

/// Settlement of one delivery attempt to one subscriber. Ephemeral: consumed
/// by reconciliation, never persisted.
#[derive(Clone, Debug)]
pub struct DeliveryOutcome {
    pub endpoint: String,
    pub status: DeliveryStatus,
    pub detail: Option<String>,
}

/// Aggregate of one broadcast: attempts made, deliveries confirmed, endpoints
/// retired, and the subscriber count after reconciliation.
#[derive(Clone, Debug)]
pub struct BroadcastResult {
    pub attempted: usize,
    pub delivered: usize,
    pub retired: Vec<String>,
    pub remaining: i64,
}
