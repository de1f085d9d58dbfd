//! Mock implementations of core traits for testing.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::events::JudgeEvent;
use crate::traits::EventPublisher;
use crate::types::SubmissionStatus;

/// Publisher that records every event for later assertions.
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<JudgeEvent>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything published so far.
    pub fn events(&self) -> Vec<JudgeEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Statuses carried by submission events, in publish order.
    pub fn statuses(&self) -> Vec<SubmissionStatus> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                JudgeEvent::Submission(s) => Some(s.status),
                JudgeEvent::TestCase(_) => None,
            })
            .collect()
    }

    /// Indices of per-test events, in publish order.
    pub fn test_indices(&self) -> Vec<usize> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                JudgeEvent::TestCase(t) => Some(t.test_index),
                JudgeEvent::Submission(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: JudgeEvent) {
        self.events.lock().unwrap().push(event);
    }
}
