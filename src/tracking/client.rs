use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::config::ScraperConfig;
use crate::tracking::{Carrier, DhlPayload, HermesPayload, RawTrackingPayload};
use crate::utils::{AppError, Result};

const DHL_API_BASE: &str = "https://www.dhl.de";
const HERMES_API_BASE: &str = "https://api.my-deliveries.de";

/// Contract the tracking loop needs from a carrier backend: fetch the raw
/// status payload for one tracking number. Timeouts are the implementation's
/// responsibility.
#[async_trait]
pub trait TrackingClient: Send + Sync {
    async fn fetch_raw_status(
        &self,
        tracking_number: &str,
        carrier: Carrier,
    ) -> Result<RawTrackingPayload>;
}

/// Production client for the public DHL and Hermes tracking APIs.
pub struct CarrierApi {
    client: Client,
    user_agent: String,
    dhl_base: String,
    hermes_base: String,
}

impl CarrierApi {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.tracking_timeout))
            .build()?;

        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
            dhl_base: DHL_API_BASE.to_string(),
            hermes_base: HERMES_API_BASE.to_string(),
        })
    }

    /// Override the API endpoints, for tests against a local mock server.
    pub fn with_endpoints(mut self, dhl_base: &str, hermes_base: &str) -> Self {
        self.dhl_base = dhl_base.trim_end_matches('/').to_string();
        self.hermes_base = hermes_base.trim_end_matches('/').to_string();
        self
    }

    async fn fetch_dhl(&self, tracking_number: &str) -> Result<DhlPayload> {
        let url = format!("{}/int-verfolgen/data/search", self.dhl_base);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("piececode", tracking_number),
                ("inputSearch", "true"),
                ("language", "de"),
            ])
            .header("User-Agent", self.user_agent.as_str())
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    async fn fetch_hermes(&self, tracking_number: &str) -> Result<HermesPayload> {
        let url = format!(
            "{}/tnt/parcelservice/parceldetails/{}",
            self.hermes_base, tracking_number
        );
        let response = self
            .client
            .get(&url)
            .header("User-Agent", self.user_agent.as_str())
            .header("Accept", "application/json, text/plain, */*")
            .header("Origin", "https://www.myhermes.de")
            .header("Referer", "https://www.myhermes.de/")
            .header("X-Language", "de")
            .send()
            .await?
            .error_for_status()?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !content_type.contains("application/json") {
            return Err(AppError::Tracking {
                carrier: "hermes".to_string(),
                message: "invalid response from Hermes API".to_string(),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl TrackingClient for CarrierApi {
    async fn fetch_raw_status(
        &self,
        tracking_number: &str,
        carrier: Carrier,
    ) -> Result<RawTrackingPayload> {
        match carrier {
            Carrier::Dhl => Ok(RawTrackingPayload::Dhl(self.fetch_dhl(tracking_number).await?)),
            Carrier::Hermes => Ok(RawTrackingPayload::Hermes(
                self.fetch_hermes(tracking_number).await?,
            )),
        }
    }
}
