use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::GeocoderConfig;

/// Subset of a Nominatim `/reverse` response. Every field is optional;
/// whatever the upstream leaves out is simply absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReverseGeocode {
    pub display_name: Option<String>,
    pub address: Option<AddressParts>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressParts {
    pub house_number: Option<String>,
    pub road: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
}

impl AddressParts {
    /// City, else town, else village.
    pub fn locality(&self) -> Option<&str> {
        self.city
            .as_deref()
            .or(self.town.as_deref())
            .or(self.village.as_deref())
    }
}

#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse(&self, lat: f64, lng: f64) -> anyhow::Result<ReverseGeocode>;
}

pub struct NominatimClient {
    http: reqwest::Client,
    url: String,
}

impl NominatimClient {
    pub fn new(cfg: &GeocoderConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("build geocoder http client")?;
        Ok(Self {
            http,
            url: cfg.url.clone(),
        })
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimClient {
    async fn reverse(&self, lat: f64, lng: f64) -> anyhow::Result<ReverseGeocode> {
        let lat = format!("{lat:.6}");
        let lon = format!("{lng:.6}");
        let res = self
            .http
            .get(&self.url)
            .query(&[
                ("format", "json"),
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("zoom", "18"),
                ("addressdetails", "1"),
            ])
            .send()
            .await
            .context("geocoder request failed")?;

        let status = res.status();
        if status != reqwest::StatusCode::OK {
            anyhow::bail!("geocoder returned status {status}");
        }

        let body = res
            .json::<ReverseGeocode>()
            .await
            .context("decode geocoder response")?;
        debug!(%lat, %lon, "reverse geocoded");
        Ok(body)
    }
}
