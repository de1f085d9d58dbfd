pub mod events;
pub mod queue;
pub mod store;

pub use events::{EventPublisher, NoOpPublisher};
pub use queue::WorkQueue;
pub use store::{ChallengeStore, ProgressStore, SubmissionStore, XpLedger};
