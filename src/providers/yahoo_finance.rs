use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::core::market::{RatePoint, RateProvider, RateSeries};

// YahooRateProvider implementation for RateProvider
pub struct YahooRateProvider {
    base_url: String,
}

impl YahooRateProvider {
    pub fn new(base_url: &str) -> Self {
        YahooRateProvider {
            base_url: base_url.to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Vec<ChartItem>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Deserialize, Debug)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

/// Converts the chart bars into daily points. Yahoo occasionally reports a
/// null close or two bars on the same calendar day; nulls are skipped and
/// the later bar of a day wins.
fn collect_points(timestamps: &[i64], closes: &[Option<f64>]) -> Vec<RatePoint> {
    let mut points: Vec<RatePoint> = Vec::with_capacity(timestamps.len());
    for (ts, close) in timestamps.iter().zip(closes.iter()) {
        let Some(close) = close else { continue };
        let Some(dt) = Utc.timestamp_opt(*ts, 0).single() else {
            continue;
        };
        let date: NaiveDate = dt.date_naive();
        match points.last_mut() {
            Some(last) if last.date == date => last.close = *close,
            _ => points.push(RatePoint { date, close: *close }),
        }
    }
    points
}

#[async_trait]
impl RateProvider for YahooRateProvider {
    #[instrument(
        name = "YahooRateFetch",
        skip(self),
        fields(symbol = %symbol, range = %range)
    )]
    async fn fetch_history(&self, symbol: &str, range: &str) -> Result<RateSeries> {
        let url = format!(
            "{}/v8/finance/chart/{}?interval=1d&range={}",
            self.base_url, symbol, range
        );
        debug!("Requesting rate data from {}", url);

        let client = reqwest::Client::builder().user_agent("fxdca/1.0").build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for symbol: {} URL: {}", e, symbol, url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for symbol: {}",
                response.status(),
                symbol
            ));
        }

        let text = response.text().await?;
        let data: YahooChartResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", symbol, e))?;

        let item = data
            .chart
            .result
            .first()
            .ok_or_else(|| anyhow!("No rate data found for symbol: {}", symbol))?;

        let (timestamps, closes) = match (
            item.timestamp.as_ref(),
            item.indicators
                .as_ref()
                .and_then(|inds| inds.quote.first())
                .and_then(|q| q.close.as_ref()),
        ) {
            (Some(ts), Some(closes)) => (ts, closes),
            _ => return Err(anyhow!("No historical closes for symbol: {}", symbol)),
        };

        let points = collect_points(timestamps, closes);
        debug!(points = points.len(), "Parsed daily closes");

        let series = RateSeries::new(points)
            .map_err(|e| anyhow!("Bad rate series for symbol {}: {}", symbol, e))?;
        Ok(series)
    }
}
