//! Test doubles shared by unit tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

use crate::{
    error::{FetchError, StorageError},
    model::WeatherPayload,
    provider::WeatherProvider,
    storage::{KeyValueStore, MemoryStore},
};

pub fn named(name: &str) -> WeatherPayload {
    WeatherPayload {
        name: name.to_string(),
        ..Default::default()
    }
}

/// Raw value under `key`.
pub fn stored(store: &MemoryStore, key: &str) -> Option<String> {
    store.get(key).expect("memory store never fails")
}

/// Storage whose every read and write fails.
#[derive(Debug)]
pub struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("disk on fire".into()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("disk on fire".into()))
    }
}

/// Provider that replays queued responses per city.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    responses: Mutex<HashMap<String, VecDeque<Result<WeatherPayload, FetchError>>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, city: &str, response: Result<WeatherPayload, FetchError>) {
        self.responses
            .lock()
            .entry(city.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl WeatherProvider for ScriptedProvider {
    async fn lookup(&self, city: &str) -> Result<WeatherPayload, FetchError> {
        self.calls.lock().push(city.to_string());
        let next = self
            .responses
            .lock()
            .get_mut(city)
            .and_then(VecDeque::pop_front);

        match next {
            Some(response) => response,
            None => {
                let missing = format!("no scripted response for {city}");
                Err(FetchError::Unexpected(missing))
            }
        }
    }
}
