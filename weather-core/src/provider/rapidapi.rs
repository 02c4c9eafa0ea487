use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::{config::ProviderSettings, error::FetchError, model::WeatherPayload};

use super::WeatherProvider;

/// OpenWeather current conditions, proxied through RapidAPI.
#[derive(Debug, Clone)]
pub struct RapidApiProvider {
    api_key: String,
    base_url: String,
    host: String,
    http: Client,
}

impl RapidApiProvider {
    pub fn new(api_key: String, settings: &ProviderSettings) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(FetchError::from_transport)?;

        Ok(Self {
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            host: settings.host.clone(),
            http,
        })
    }
}

#[async_trait]
impl WeatherProvider for RapidApiProvider {
    async fn lookup(&self, city: &str) -> Result<WeatherPayload, FetchError> {
        let url = format!("{}/city", self.base_url);
        let query = [("city", city), ("lang", "EN"), ("units", "metric")];

        let res = self
            .http
            .get(&url)
            .query(&query)
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.host)
            .send()
            .await
            .map_err(FetchError::from_transport)?;

        let status = res.status();
        if !status.is_success() {
            debug!(%status, city, "provider rejected lookup");
            return Err(FetchError::from_status(status));
        }

        let body = res.text().await.map_err(FetchError::from_transport)?;

        match serde_json::from_str::<WeatherPayload>(&body) {
            Ok(payload) => Ok(payload),
            Err(err) => {
                debug!(error = %err, body = %truncate_body(&body), "undecodable provider body");
                Err(FetchError::InvalidResponse)
            }
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
