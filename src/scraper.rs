use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use scraper::{Html, Selector};
use std::str::FromStr;
use std::time::Duration;

use crate::config::ScraperConfig;
use crate::utils::{AppError, Result};

/// CSS id of the price heading on a listing page.
const PRICE_SELECTOR: &str = "h2#viewad-price";

/// Contract the price loop needs from a listing backend: the current asking
/// price for one listing URL.
#[async_trait]
pub trait PriceClient: Send + Sync {
    async fn fetch_current_price(&self, url: &str) -> Result<f64>;
}

/// Production client: fetches the listing page and extracts the price from
/// the ad's price heading.
pub struct ListingScraper {
    client: Client,
    user_agent: String,
    price_selector: Selector,
    price_regex: Regex,
}

impl ListingScraper {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;

        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
            price_selector: Selector::parse(PRICE_SELECTOR)
                .map_err(|e| AppError::Scraping(format!("invalid price selector: {}", e)))?,
            price_regex: Regex::new(r"(\d+(?:[.,]\d+)?)")
                .map_err(|e| AppError::Scraping(format!("invalid price regex: {}", e)))?,
        })
    }

    /// Extract the price from a listing page body. Listings use a comma as
    /// decimal separator ("1.234,56 €" style amounts collapse to the leading
    /// group, matching what the marketplace renders for private ads).
    pub fn extract_price(&self, html: &str) -> Option<f64> {
        let document = Html::parse_document(html);
        let text: String = document
            .select(&self.price_selector)
            .next()?
            .text()
            .collect();

        let captures = self.price_regex.captures(&text)?;
        let raw = captures.get(1)?.as_str().replace(',', ".");
        Decimal::from_str(&raw).ok()?.to_f64()
    }
}

#[async_trait]
impl PriceClient for ListingScraper {
    async fn fetch_current_price(&self, url: &str) -> Result<f64> {
        let body = self
            .client
            .get(url)
            .header("User-Agent", self.user_agent.as_str())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        self.extract_price(&body)
            .ok_or_else(|| AppError::Scraping(format!("no price found at {}", url)))
    }
}
