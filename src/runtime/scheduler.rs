use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use super::job::LoginJob;

#[async_trait]
pub trait JobScheduler: Send + Sync {
    // A second enqueue under a tag that is already pending or running must
    // be absorbed, not duplicated.
    async fn enqueue_unique(&self, tag: &str, job: LoginJob);
}

pub struct TokioScheduler {
    in_flight: Arc<DashMap<String, Uuid>>,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self {
            in_flight: Arc::new(DashMap::new()),
        }
    }
}

#[async_trait]
impl JobScheduler for TokioScheduler {
    async fn enqueue_unique(&self, tag: &str, job: LoginJob) {
        let run_id = Uuid::new_v4();
        let claimed = match self.in_flight.entry(tag.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(run_id);
                true
            }
        };

        if !claimed {
            debug!("Job '{}' already in flight, absorbing request", tag);
            return;
        }

        info!("Job '{}' enqueued (run {})", tag, run_id);
        let in_flight = Arc::clone(&self.in_flight);
        let tag = tag.to_string();
        tokio::spawn(async move {
            // The inner task isolates a panicking job; the tag is released
            // either way.
            match tokio::spawn(async move { job.run().await }).await {
                Ok(outcome) => info!("Job '{}' finished (run {}): {:?}", tag, run_id, outcome),
                Err(e) => error!("Job '{}' aborted (run {}): {}", tag, run_id, e),
            }
            in_flight.remove(&tag);
        });
    }
}
