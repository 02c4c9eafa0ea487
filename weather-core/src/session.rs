//! The dashboard session: store, orchestrator and persistence wired together.
//!
//! The binary creates one [`Dashboard`] and passes it by reference to whatever
//! renders or dispatches against it.

use std::sync::Arc;

use tracing::info;

use crate::{
    orchestrator::{Completion, FetchOutcome, Orchestrator, PendingFetch},
    provider::WeatherProvider,
    storage::Persistence,
    store::{WeatherState, WeatherStore},
};

/// What startup found in durable storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hydration {
    /// A previous session viewed this city.
    Resume(String),
    NoPriorSession,
}

#[derive(Debug)]
pub struct Dashboard {
    store: WeatherStore,
    orchestrator: Orchestrator,
    persistence: Persistence,
}

impl Dashboard {
    pub fn new(provider: Arc<dyn WeatherProvider>, persistence: Persistence) -> Self {
        Self {
            store: WeatherStore::new(persistence.clone()),
            orchestrator: Orchestrator::new(provider),
            persistence,
        }
    }

    pub fn state(&self) -> &WeatherState {
        self.store.state()
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn hydrate(&self) -> Hydration {
        match self.persistence.load_last_city() {
            Some(city) => Hydration::Resume(city),
            None => Hydration::NoPriorSession,
        }
    }

    /// Hydrate and, for a returning user, fetch the last viewed city.
    pub async fn resume(&mut self) -> Hydration {
        let hydration = self.hydrate();
        if let Hydration::Resume(city) = &hydration {
            info!(city = %city, "resuming last viewed city");
            self.search(city).await;
        }
        hydration
    }

    /// Accept a search from the user. Blank input is ignored entirely.
    pub fn submit_search(&mut self, text: &str) -> Option<PendingFetch> {
        let city = text.trim();
        if city.is_empty() {
            return None;
        }

        let id = self.store.request();
        Some(PendingFetch {
            id,
            city: city.to_string(),
        })
    }

    /// Apply a finished fetch. Returns `false` if it was superseded.
    pub fn apply(&mut self, completion: Completion) -> bool {
        match completion.outcome {
            FetchOutcome::Success(payload) => {
                let name = payload.name.clone();
                let applied = self.store.succeed(completion.id, payload);
                if applied {
                    self.persistence.save_last_city(&name);
                }
                applied
            }
            FetchOutcome::Failure(err) => self.store.fail(completion.id, err.user_message()),
        }
    }

    /// Submit, fetch and apply in one step. Returns `false` for blank input.
    pub async fn search(&mut self, text: &str) -> bool {
        let Some(pending) = self.submit_search(text) else {
            return false;
        };
        let completion = self.orchestrator.complete(pending).await;
        self.apply(completion)
    }

    pub fn dismiss_error(&mut self) {
        self.store.clear_error();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        WeatherPayload,
        error::{FetchError, MSG_INVALID_RESPONSE, MSG_NOT_FOUND, MSG_RATE_LIMITED},
        storage::{LAST_CITY_KEY, MemoryStore},
        store::FetchStatus,
        testing::{ScriptedProvider, named, stored},
    };
    use tokio::sync::mpsc;

    fn dashboard(provider: &Arc<ScriptedProvider>, kv: &Arc<MemoryStore>) -> Dashboard {
        Dashboard::new(provider.clone(), Persistence::new(kv.clone()))
    }

    fn shown(dash: &Dashboard) -> Option<&str> {
        dash.state().data().map(|d| d.name.as_str())
    }

    #[tokio::test]
    async fn successful_search_updates_state_and_storage() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.respond("Paris", Ok(named("Paris")));
        let kv = Arc::new(MemoryStore::new());
        let mut dash = dashboard(&provider, &kv);

        assert!(dash.search("Paris").await);

        let state = dash.state();
        assert_eq!(state.status(), FetchStatus::Succeeded);
        assert_eq!(shown(&dash), Some("Paris"));
        assert_eq!(state.history(), ["Paris"]);
        assert_eq!(stored(&kv, LAST_CITY_KEY).as_deref(), Some("Paris"));
    }

    #[tokio::test]
    async fn input_is_trimmed_and_provider_name_is_recorded() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.respond("paris", Ok(named("Paris")));
        let kv = Arc::new(MemoryStore::new());
        let mut dash = dashboard(&provider, &kv);

        assert!(dash.search("  paris ").await);

        assert_eq!(provider.calls(), vec!["paris".to_string()]);
        assert_eq!(dash.state().history(), ["Paris"]);
        assert_eq!(stored(&kv, LAST_CITY_KEY).as_deref(), Some("Paris"));
    }

    #[tokio::test]
    async fn blank_input_issues_nothing() {
        let provider = Arc::new(ScriptedProvider::new());
        let kv = Arc::new(MemoryStore::new());
        let mut dash = dashboard(&provider, &kv);

        assert!(dash.submit_search("   \t").is_none());
        assert!(!dash.search("").await);

        assert_eq!(dash.state().status(), FetchStatus::Idle);
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn not_found_keeps_previous_data() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.respond("Paris", Ok(named("Paris")));
        provider.respond("Zzzqx", Err(FetchError::NotFound));
        let kv = Arc::new(MemoryStore::new());
        let mut dash = dashboard(&provider, &kv);

        dash.search("Paris").await;
        assert!(dash.search("Zzzqx").await);

        let state = dash.state();
        assert_eq!(state.status(), FetchStatus::Failed);
        assert_eq!(state.error(), Some(MSG_NOT_FOUND));
        assert_eq!(shown(&dash), Some("Paris"));
        assert_eq!(stored(&kv, LAST_CITY_KEY).as_deref(), Some("Paris"));
    }

    #[tokio::test]
    async fn rate_limit_message() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.respond("Oslo", Err(FetchError::RateLimited));
        let mut dash = dashboard(&provider, &Arc::new(MemoryStore::new()));

        dash.search("Oslo").await;

        assert_eq!(dash.state().error(), Some(MSG_RATE_LIMITED));
    }

    #[tokio::test]
    async fn nameless_payload_is_invalid_response() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.respond("Oslo", Ok(WeatherPayload::default()));
        let kv = Arc::new(MemoryStore::new());
        let mut dash = dashboard(&provider, &kv);

        dash.search("Oslo").await;

        assert_eq!(dash.state().status(), FetchStatus::Failed);
        assert_eq!(dash.state().error(), Some(MSG_INVALID_RESPONSE));
        assert!(dash.state().history().is_empty());
        assert!(stored(&kv, LAST_CITY_KEY).is_none());
    }

    #[tokio::test]
    async fn dismiss_error_clears_banner() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.respond("Oslo", Err(FetchError::Status(500)));
        let mut dash = dashboard(&provider, &Arc::new(MemoryStore::new()));

        dash.search("Oslo").await;
        assert!(dash.state().error().is_some());

        dash.dismiss_error();
        assert!(dash.state().error().is_none());
    }

    #[tokio::test]
    async fn hydration_without_prior_session() {
        let provider = Arc::new(ScriptedProvider::new());
        let mut dash = dashboard(&provider, &Arc::new(MemoryStore::new()));

        assert_eq!(dash.resume().await, Hydration::NoPriorSession);
        assert_eq!(dash.state().status(), FetchStatus::Idle);
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn resume_fetches_last_viewed_city() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.respond("Paris", Ok(named("Paris")));
        provider.respond("Oslo", Ok(named("Oslo")));
        provider.respond("Oslo", Ok(named("Oslo")));
        let kv = Arc::new(MemoryStore::new());

        {
            let mut first = dashboard(&provider, &kv);
            first.search("Paris").await;
            first.search("Oslo").await;
        }

        let mut second = dashboard(&provider, &kv);
        assert_eq!(second.state().history(), ["Oslo", "Paris"]);

        assert_eq!(second.resume().await, Hydration::Resume("Oslo".into()));
        assert_eq!(shown(&second), Some("Oslo"));
        assert_eq!(second.state().history(), ["Oslo", "Paris"]);
    }

    #[tokio::test]
    async fn only_latest_request_is_visible() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.respond("Paris", Ok(named("Paris")));
        provider.respond("Oslo", Ok(named("Oslo")));
        let kv = Arc::new(MemoryStore::new());
        let mut dash = dashboard(&provider, &kv);

        let slow = dash.submit_search("Paris").expect("pending");
        let fast = dash.submit_search("Oslo").expect("pending");

        let (tx, mut rx) = mpsc::unbounded_channel();
        let first = dash.orchestrator().spawn(fast, tx.clone());
        first.await.expect("task");
        let second = dash.orchestrator().spawn(slow, tx);
        second.await.expect("task");

        let mut applied = Vec::new();
        while let Some(completion) = rx.recv().await {
            let city = completion.city.clone();
            applied.push((city, dash.apply(completion)));
        }

        assert_eq!(applied.len(), 2);
        assert_eq!(applied[0], ("Oslo".to_string(), true));
        assert_eq!(applied[1], ("Paris".to_string(), false));
        assert_eq!(shown(&dash), Some("Oslo"));
        assert_eq!(dash.state().history(), ["Oslo"]);
        assert_eq!(stored(&kv, LAST_CITY_KEY).as_deref(), Some("Oslo"));
    }
}
