//! Weather store: the single owner of dashboard state.
//!
//! Only the transitions below mutate [`WeatherState`]. Callers get read-only
//! access through [`WeatherStore::state`].

use tracing::debug;

use crate::{
    model::WeatherPayload,
    storage::{HISTORY_LIMIT, Persistence},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// Identifies one issued request. Later requests compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherState {
    status: FetchStatus,
    data: Option<WeatherPayload>,
    error: Option<String>,
    history: Vec<String>,
}

impl WeatherState {
    pub fn status(&self) -> FetchStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Loading
    }

    /// Last successful payload. Survives later failures.
    pub fn data(&self) -> Option<&WeatherPayload> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Most recent first, unique, at most [`HISTORY_LIMIT`] entries.
    pub fn history(&self) -> &[String] {
        &self.history
    }
}

#[derive(Debug)]
pub struct WeatherStore {
    state: WeatherState,
    last_issued: u64,
    persistence: Persistence,
}

impl WeatherStore {
    /// Create the store with history hydrated from `persistence`.
    pub fn new(persistence: Persistence) -> Self {
        let history = persistence.load_history();
        debug!(entries = history.len(), "hydrated search history");

        Self {
            state: WeatherState {
                history,
                ..WeatherState::default()
            },
            last_issued: 0,
            persistence,
        }
    }

    pub fn state(&self) -> &WeatherState {
        &self.state
    }

    /// Begin a fetch. Valid from any state; keeps the previous data on screen.
    pub fn request(&mut self) -> RequestId {
        self.last_issued += 1;
        self.state.status = FetchStatus::Loading;
        self.state.error = None;
        RequestId(self.last_issued)
    }

    /// Apply a successful fetch. Returns `false` when `id` is stale.
    pub fn succeed(&mut self, id: RequestId, payload: WeatherPayload) -> bool {
        if !self.accepts(id) {
            return false;
        }

        self.state.status = FetchStatus::Succeeded;
        self.state.error = None;
        let name = payload.name.clone();
        self.state.data = Some(payload);

        self.record_history(name);
        true
    }

    /// Apply a failed fetch. Returns `false` when `id` is stale.
    pub fn fail(&mut self, id: RequestId, message: impl Into<String>) -> bool {
        if !self.accepts(id) {
            return false;
        }

        self.state.status = FetchStatus::Failed;
        self.state.error = Some(message.into());
        true
    }

    pub fn clear_error(&mut self) {
        self.state.error = None;
    }

    fn accepts(&self, id: RequestId) -> bool {
        let current = id.0 == self.last_issued && self.state.status == FetchStatus::Loading;
        if !current {
            debug!(
                request = id.0,
                latest = self.last_issued,
                "dropping outcome of superseded request"
            );
        }
        current
    }

    // Re-searching a listed city does not move it to the front.
    fn record_history(&mut self, name: String) {
        if name.trim().is_empty() || self.state.history.contains(&name) {
            return;
        }

        self.state.history.insert(0, name);
        self.state.history.truncate(HISTORY_LIMIT);
        self.persistence.save_history(&self.state.history);
    }
}
