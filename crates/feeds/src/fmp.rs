//! Financial Modeling Prep quote client.

use async_trait::async_trait;
use poller_core::{parse_earnings_announcement, QuoteRecord, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::FmpApiConfig;
use crate::http::{build_client, get_json};

/// Source of quotes, one symbol per request.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Quotes for `symbol`. An empty vec means the provider had no data.
    async fn quote(&self, symbol: &str) -> Result<Vec<QuoteRecord>>;
}

/// One entry of the `/api/v3/quote/{symbol}` array.
///
/// Funds, indices and fresh listings come back with nulls in most columns;
/// only `symbol`, `price` and `timestamp` are always present.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FmpQuote {
    pub symbol: String,
    pub name: Option<String>,
    pub price: f64,
    pub changes_percentage: Option<f64>,
    pub change: Option<f64>,
    pub day_low: Option<f64>,
    pub day_high: Option<f64>,
    pub year_high: Option<f64>,
    pub year_low: Option<f64>,
    pub market_cap: Option<f64>,
    #[serde(rename = "priceAvg50")]
    pub price_avg_50: Option<f64>,
    #[serde(rename = "priceAvg200")]
    pub price_avg_200: Option<f64>,
    pub exchange: Option<String>,
    pub volume: Option<i64>,
    pub avg_volume: Option<i64>,
    pub open: Option<f64>,
    pub previous_close: Option<f64>,
    pub eps: Option<f64>,
    pub pe: Option<f64>,
    pub earnings_announcement: Option<String>,
    pub shares_outstanding: Option<f64>,
    pub timestamp: i64,
}

impl From<FmpQuote> for QuoteRecord {
    fn from(quote: FmpQuote) -> Self {
        let earnings_announcement = match quote.earnings_announcement.as_deref() {
            None | Some("") => None,
            Some(raw) => {
                let parsed = parse_earnings_announcement(raw);
                if parsed.is_none() {
                    warn!(
                        symbol = %quote.symbol,
                        value = raw,
                        "Invalid datetime format for earningsAnnouncement"
                    );
                }
                parsed
            }
        };

        Self {
            symbol: quote.symbol,
            name: quote.name,
            price: quote.price,
            changes_percentage: quote.changes_percentage,
            change: quote.change,
            day_low: quote.day_low,
            day_high: quote.day_high,
            year_high: quote.year_high,
            year_low: quote.year_low,
            market_cap: quote.market_cap,
            price_avg_50: quote.price_avg_50,
            price_avg_200: quote.price_avg_200,
            exchange: quote.exchange,
            volume: quote.volume,
            avg_volume: quote.avg_volume,
            open: quote.open,
            previous_close: quote.previous_close,
            eps: quote.eps,
            pe: quote.pe,
            earnings_announcement,
            shares_outstanding: quote.shares_outstanding,
            timestamp: quote.timestamp,
        }
    }
}

/// HTTP client for the FMP quote endpoint.
#[derive(Debug, Clone)]
pub struct FmpClient {
    client: Client,
    config: FmpApiConfig,
}

impl FmpClient {
    pub fn new(config: FmpApiConfig) -> Result<Self> {
        let client = build_client(config.timeout())?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl QuoteSource for FmpClient {
    async fn quote(&self, symbol: &str) -> Result<Vec<QuoteRecord>> {
        let url = format!("{}/api/v3/quote/{}", self.config.base_url, symbol);
        let request = self
            .client
            .get(&url)
            .query(&[("apikey", self.config.api_key.as_str())]);

        let raw: Vec<FmpQuote> = get_json(request, &format!("FMP quote {symbol}")).await?;
        debug!(symbol = symbol, entries = raw.len(), "Fetched FMP quote");
        Ok(raw.into_iter().map(QuoteRecord::from).collect())
    }
}
