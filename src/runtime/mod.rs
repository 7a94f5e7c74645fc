mod job;
mod scheduler;

pub use job::{JobOutcome, LoginJob, LOGIN_JOB_TAG};
pub use scheduler::{JobScheduler, TokioScheduler};
