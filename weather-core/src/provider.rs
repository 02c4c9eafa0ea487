use crate::{Config, FetchError, WeatherPayload, provider::rapidapi::RapidApiProvider};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod rapidapi;

/// A read-only current-conditions lookup keyed by city name.
///
/// Implementations issue exactly one outbound request per call and classify
/// their own failures.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn lookup(&self, city: &str) -> Result<WeatherPayload, FetchError>;
}

/// Construct the provider described by `config`.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for the weather provider.\n\
                 Hint: run `weather-dashboard configure` or set {}.",
            crate::config::API_KEY_ENV
        )
    })?;

    let provider = RapidApiProvider::new(api_key, &config.provider)?;
    Ok(Box::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        // Only meaningful when the override is not set in the test environment.
        if std::env::var(crate::config::API_KEY_ENV).is_ok() {
            return;
        }
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("No API key configured"));
        assert!(msg.contains("weather-dashboard configure"));
    }

    #[test]
    fn provider_from_config_works_when_key_set() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());

        assert!(provider_from_config(&cfg).is_ok());
    }
}
