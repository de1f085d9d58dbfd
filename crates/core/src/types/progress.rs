use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One-time experience award for first full completion of a challenge.
///
/// At most one grant may ever exist per `(user_id, challenge_id)` pair;
/// the ledger enforces this together with the cumulative-total update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpGrant {
    pub user_id: String,
    pub challenge_id: String,
    pub amount: u64,
    pub reason: String,
    pub metadata: serde_json::Value,
}

/// Per-user, per-challenge progress.
///
/// `best_score` is monotonically non-decreasing and `attempts` counts
/// processing attempts, so redelivered jobs bump it without duplicating
/// the XP grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub user_id: String,
    pub challenge_id: String,
    pub completed: bool,
    pub best_score: u8,
    pub attempts: u32,
    pub last_attempt_at: DateTime<Utc>,
}
