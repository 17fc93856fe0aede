use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// Current conditions as reported by the upstream provider. Temperature is
/// left in Kelvin here; conversion happens when the observation is persisted.
#[derive(Debug, Clone)]
pub struct Observation {
    pub temperature_k: f64,
    pub description: Option<String>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
}

/// External source consulted when a city has no local record.
#[async_trait]
pub trait CurrentWeather: Send + Sync {
    async fn current(&self, city: &str) -> anyhow::Result<Observation>;
}

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            http: Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: Option<f64>,
    pressure: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: Option<f64>,
    deg: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: Option<OwWind>,
}

#[async_trait]
impl CurrentWeather for OpenWeatherClient {
    async fn current(&self, city: &str) -> anyhow::Result<Observation> {
        let url = "https://api.openweathermap.org/data/2.5/weather";

        let res = self
            .http
            .get(url)
            .query(&[("q", city), ("appid", self.api_key.as_str())])
            .send()
            .await
            .context("Failed to send request to OpenWeather")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather JSON")?;

        let (wind_speed, wind_direction) = match parsed.wind {
            Some(w) => (w.speed, w.deg),
            None => (None, None),
        };

        Ok(Observation {
            temperature_k: parsed.main.temp,
            description: parsed.weather.first().map(|w| w.description.clone()),
            humidity: parsed.main.humidity,
            pressure: parsed.main.pressure,
            wind_speed,
            wind_direction,
        })
    }
}

/// OpenWeather's default units are Kelvin; records store Celsius.
pub fn kelvin_to_celsius(k: f64) -> f64 {
    k - 273.15
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    // Cut on a char boundary; error bodies are not guaranteed to be ASCII.
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kelvin_conversion() {
        assert!((kelvin_to_celsius(273.15) - 0.0).abs() < f64::EPSILON);
        assert!((kelvin_to_celsius(300.0) - 26.85).abs() < 1e-9);
    }

    #[test]
    fn parses_current_response() {
        let body = r#"{
            "name": "Oslo",
            "main": { "temp": 280.5, "humidity": 81, "pressure": 1012 },
            "weather": [{ "description": "light rain" }],
            "wind": { "speed": 4.6, "deg": 250 }
        }"#;
        let parsed: OwCurrentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.main.temp, 280.5);
        assert_eq!(parsed.weather[0].description, "light rain");
        assert_eq!(parsed.wind.unwrap().deg, Some(250.0));
    }

    #[test]
    fn truncates_long_bodies_on_char_boundaries() {
        let mut body = "x".repeat(199);
        body.push('é');
        body.push_str(&"y".repeat(50));
        let cut = truncate_body(&body);
        assert!(cut.ends_with("..."));
        assert!(cut.len() < body.len());

        let short = "größe";
        assert_eq!(truncate_body(short), short);
    }

    #[test]
    fn tolerates_missing_wind_block() {
        let body = r#"{ "main": { "temp": 290.0 } }"#;
        let parsed: OwCurrentResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.wind.is_none());
        assert!(parsed.weather.is_empty());
    }
}
