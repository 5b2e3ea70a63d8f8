use anyhow::{anyhow, Result};
use reqwest::blocking::Client;
use serde_json::Value;
use tracing::warn;

use super::format_coords;
use crate::config::GeocoderConfig;

pub fn reverse_geocode_url(base_url: &str) -> String {
    format!("{}/reverse", base_url.trim_end_matches('/'))
}

/// Nominatim-style reverse geocoder.
pub struct ReverseGeocoder {
    client: Client,
    base_url: String,
    user_agent: String,
}

impl ReverseGeocoder {
    pub fn new(base_url: String, user_agent: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            user_agent,
        }
    }

    pub fn from_config(cfg: &GeocoderConfig) -> Self {
        Self::new(cfg.base_url.clone(), cfg.user_agent.clone())
    }

    /// The `display_name` of the place at the given position.
    pub fn reverse_geocode(&self, lat: f64, lon: f64) -> Result<String> {
        let resp = self
            .client
            .get(reverse_geocode_url(&self.base_url))
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .query(&[
                ("format", "json".to_string()),
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("zoom", "18".to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .timeout(crate::llm::timeouts::geocode_timeout())
            .send()?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            return Err(anyhow!("reverse geocode request failed: HTTP {status} {body}"));
        }

        let body = resp.text().unwrap_or_default();
        let parsed: Value =
            serde_json::from_str(&body).map_err(|e| anyhow!("invalid reverse geocode json: {e}"))?;
        parsed
            .get("display_name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .ok_or_else(|| anyhow!("reverse geocode response has no display_name"))
    }
}

/// Human-readable place name, or the coordinates when lookup fails.
pub fn describe_location(geocoder: &ReverseGeocoder, lat: f64, lon: f64) -> String {
    match geocoder.reverse_geocode(lat, lon) {
        Ok(name) => name,
        Err(e) => {
            warn!("reverse geocoding failed: {e:#}");
            format_coords(lat, lon)
        }
    }
}
