//! Redis implementation of the work queue.

use async_trait::async_trait;
use redis::{AsyncCommands, Client};

use judge_core::{traits::WorkQueue, Error, ExecutionJob, Result};

/// Redis-backed execution queue.
///
/// Jobs live as JSON on a list key: producers `LPUSH`, workers `BRPOP`
/// with a short timeout so shutdown signals are observed promptly.
pub struct RedisWorkQueue {
    client: Client,
    key: String,
}

impl RedisWorkQueue {
    /// Connect to Redis and bind the queue to `key`.
    pub fn new(url: &str, key: &str) -> Result<Self> {
        let client = Client::open(url)
            .map_err(|e| Error::queue(format!("Failed to connect to Redis: {}", e)))?;

        Ok(Self {
            client,
            key: key.to_string(),
        })
    }
}

#[async_trait]
impl WorkQueue for RedisWorkQueue {
    async fn enqueue(&self, job: ExecutionJob) -> Result<()> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| Error::queue(format!("Redis connection error: {}", e)))?;

        let payload = serde_json::to_string(&job)?;
        let _: () = conn
            .lpush(&self.key, payload)
            .await
            .map_err(|e| Error::queue(format!("Redis lpush error: {}", e)))?;

        Ok(())
    }

    async fn dequeue(&self) -> Result<Option<ExecutionJob>> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| Error::queue(format!("Redis connection error: {}", e)))?;

        let popped: Option<(String, String)> = conn
            .brpop(&self.key, 1.0)
            .await
            .map_err(|e| Error::queue(format!("Redis brpop error: {}", e)))?;

        match popped {
            Some((_key, payload)) => {
                let job = serde_json::from_str(&payload)
                    .map_err(|e| Error::queue(format!("Malformed job payload: {}", e)))?;
                Ok(Some(job))
            }
            None => Ok(None),
        }
    }
}
