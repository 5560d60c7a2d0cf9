//! Live weather lookup via the OpenWeather current-conditions API.

use async_trait::async_trait;
use serde::Deserialize;

use crate::agent::evidence::{EvidenceQuery, EvidenceResult, EvidenceSource};

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    name: String,
    main: MainBlock,
    weather: Vec<ConditionBlock>,
    wind: Option<WindBlock>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
    feels_like: Option<f64>,
    humidity: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ConditionBlock {
    description: String,
}

#[derive(Debug, Deserialize)]
struct WindBlock {
    speed: f64,
}

/// Current-weather evidence source.
#[derive(Debug, Clone)]
pub struct WeatherTool {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl WeatherTool {
    /// Creates the tool against `base_url` with the given API key and
    /// request timeout.
    ///
    /// Falls back to a default HTTP client if one with the requested
    /// timeout cannot be built.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn format_report(response: &WeatherResponse) -> String {
        let condition = response
            .weather
            .first()
            .map_or("unknown", |c| c.description.as_str());
        let mut lines = vec![
            format!("Location: {}", response.name),
            format!("Temperature: {:.1}°C", response.main.temp),
        ];
        if let Some(feels_like) = response.main.feels_like {
            lines.push(format!("Feels like: {feels_like:.1}°C"));
        }
        lines.push(format!("Condition: {condition}"));
        if let Some(humidity) = response.main.humidity {
            lines.push(format!("Humidity: {humidity:.0}%"));
        }
        if let Some(wind) = &response.wind {
            lines.push(format!("Wind speed: {:.1} m/s", wind.speed));
        }
        lines.join("\n")
    }

    async fn fetch(&self, city: &str) -> EvidenceResult {
        if self.api_key.is_empty() {
            return EvidenceResult::Unavailable {
                reason: "Weather API key not configured.".to_string(),
            };
        }

        let location = format!("{city},IN");
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", location.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(city, error = %e, "weather request failed");
                return EvidenceResult::Unavailable {
                    reason: format!("Weather service unreachable: {e}"),
                };
            }
        };

        match response.status().as_u16() {
            401 => EvidenceResult::Unavailable {
                reason: "Weather API key invalid or not activated yet.".to_string(),
            },
            404 => EvidenceResult::Unavailable {
                reason: format!("City '{city}' not found."),
            },
            status if status >= 400 => EvidenceResult::Unavailable {
                reason: format!("Weather service returned status {status}."),
            },
            _ => match response.json::<WeatherResponse>().await {
                Ok(parsed) => EvidenceResult::Available {
                    content: Self::format_report(&parsed),
                },
                Err(e) => EvidenceResult::Unavailable {
                    reason: format!("Weather response malformed: {e}"),
                },
            },
        }
    }
}

#[async_trait]
impl EvidenceSource for WeatherTool {
    fn name(&self) -> &'static str {
        "weather"
    }

    fn section_label(&self, _query: &EvidenceQuery<'_>) -> String {
        "[LIVE WEATHER DATA]".to_string()
    }

    async fn invoke(&self, query: &EvidenceQuery<'_>) -> EvidenceResult {
        self.fetch(query.city).await
    }
}
