mod challenge;
mod job;
mod progress;
mod submission;

pub use challenge::{Challenge, TestCase};
pub use job::ExecutionJob;
pub use progress::{ProgressRecord, XpGrant};
pub use submission::{
    ExecutionOutcome, GradedResult, Submission, SubmissionStatus, TestOutcome,
};
