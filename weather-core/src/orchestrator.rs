//! Fetch orchestration: one provider lookup, normalized into a closed outcome.

use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::model::WeatherPayload;
use crate::provider::WeatherProvider;
use crate::store::RequestId;

#[derive(Debug)]
pub enum FetchOutcome {
    Success(WeatherPayload),
    Failure(FetchError),
}

/// A request the store has accepted and that still needs a network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFetch {
    pub id: RequestId,
    pub city: String,
}

/// The outcome of a [`PendingFetch`], tagged with the request it answers.
#[derive(Debug)]
pub struct Completion {
    pub id: RequestId,
    pub city: String,
    pub outcome: FetchOutcome,
}

#[derive(Debug, Clone)]
pub struct Orchestrator {
    provider: Arc<dyn WeatherProvider>,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Look up `city` once. A body without a city name counts as a failure.
    pub async fn fetch(&self, city: &str) -> FetchOutcome {
        match self.provider.lookup(city).await {
            Ok(payload) if payload.has_name() => {
                debug!(city, name = %payload.name, "weather lookup succeeded");
                FetchOutcome::Success(payload)
            }
            Ok(_) => {
                warn!(city, "weather lookup returned no city name");
                FetchOutcome::Failure(FetchError::InvalidResponse)
            }
            Err(err) => {
                warn!(city, error = %err, "weather lookup failed");
                FetchOutcome::Failure(err)
            }
        }
    }

    pub async fn complete(&self, pending: PendingFetch) -> Completion {
        let outcome = self.fetch(&pending.city).await;
        Completion {
            id: pending.id,
            city: pending.city,
            outcome,
        }
    }

    /// Run the fetch on a task and send the completion back over `tx`.
    pub fn spawn(
        &self,
        pending: PendingFetch,
        tx: mpsc::UnboundedSender<Completion>,
    ) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            let completion = this.complete(pending).await;
            // Receiver gone means nobody is listening for this result anymore.
            let _ = tx.send(completion);
        })
    }
}
