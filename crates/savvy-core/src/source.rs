//! Upstream transaction sources
//!
//! The server pulls bank transactions for a linked account through the
//! `TransactionSource` trait. `AggregatorClient` talks to a Plaid-style
//! `/transactions/get` endpoint; `StaticSource` serves a fixed list and is
//! used in tests and local development.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::Transaction;

/// Days of history behind the transaction summary
pub const SUMMARY_WINDOW_DAYS: i64 = 30;

/// Days of history behind trend insights
pub const TRENDS_WINDOW_DAYS: i64 = 60;

/// Page size requested from the aggregator
const PAGE_SIZE: usize = 500;

/// Credential values shipped in sample env files, treated as unset
const PLACEHOLDER_CREDENTIALS: [&str; 2] = [
    "replace_with_your_actual_client_id",
    "replace_with_your_actual_sandbox_secret",
];

/// Inclusive date window ending at `today`
pub fn window(days: i64, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (today - Duration::days(days), today)
}

/// Supplier of bank transactions for a linked account
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Human-readable name for logs
    fn name(&self) -> &'static str;

    /// Fetch all transactions dated within `start..=end`
    async fn transactions(
        &self,
        access_token: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Transaction>>;
}

/// Aggregator environments and their API hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorEnv {
    Sandbox,
    Development,
    Production,
}

impl AggregatorEnv {
    pub fn base_url(&self) -> &'static str {
        match self {
            Self::Sandbox => "https://sandbox.plaid.com",
            Self::Development => "https://development.plaid.com",
            Self::Production => "https://production.plaid.com",
        }
    }
}

impl std::str::FromStr for AggregatorEnv {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            _ => Err(format!("Unknown aggregator environment: {}", s)),
        }
    }
}

#[derive(Debug, Serialize)]
struct TransactionsRequest<'a> {
    client_id: &'a str,
    secret: &'a str,
    access_token: &'a str,
    start_date: String,
    end_date: String,
    options: TransactionsOptions,
}

#[derive(Debug, Serialize)]
struct TransactionsOptions {
    count: usize,
    offset: usize,
}

#[derive(Debug, Deserialize)]
struct TransactionsResponse {
    transactions: Vec<Transaction>,
    #[serde(default)]
    total_transactions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct AggregatorErrorBody {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

/// HTTP client for the bank aggregator's transactions API
#[derive(Clone)]
pub struct AggregatorClient {
    http_client: Client,
    base_url: String,
    client_id: String,
    secret: String,
}

impl AggregatorClient {
    pub fn new(base_url: &str, client_id: &str, secret: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id: client_id.to_string(),
            secret: secret.to_string(),
        }
    }

    /// Create from environment variables
    ///
    /// Reads `PLAID_CLIENT_ID`, `PLAID_SECRET`, and either `PLAID_BASE_URL`
    /// or `PLAID_ENV` (sandbox by default). Returns `None` when credentials
    /// are missing or still set to the sample placeholders.
    pub fn from_env() -> Option<Self> {
        let client_id = std::env::var("PLAID_CLIENT_ID").ok().filter(|s| !s.is_empty());
        let secret = std::env::var("PLAID_SECRET").ok().filter(|s| !s.is_empty());

        let (client_id, secret) = match (client_id, secret) {
            (Some(id), Some(secret))
                if !PLACEHOLDER_CREDENTIALS.contains(&id.as_str())
                    && !PLACEHOLDER_CREDENTIALS.contains(&secret.as_str()) =>
            {
                (id, secret)
            }
            _ => {
                warn!("Bank aggregator credentials missing or invalid (set PLAID_CLIENT_ID and PLAID_SECRET)");
                return None;
            }
        };

        let base_url = match std::env::var("PLAID_BASE_URL").ok().filter(|s| !s.is_empty()) {
            Some(url) => url,
            None => {
                let env = std::env::var("PLAID_ENV").unwrap_or_else(|_| "sandbox".to_string());
                env.parse::<AggregatorEnv>()
                    .unwrap_or_else(|e| {
                        warn!(error = %e, "Falling back to sandbox aggregator environment");
                        AggregatorEnv::Sandbox
                    })
                    .base_url()
                    .to_string()
            }
        };

        info!(base_url = %base_url, "Bank aggregator configured");
        Some(Self::new(&base_url, &client_id, &secret))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl TransactionSource for AggregatorClient {
    fn name(&self) -> &'static str {
        "aggregator"
    }

    async fn transactions(
        &self,
        access_token: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        let mut collected: Vec<Transaction> = Vec::new();

        loop {
            let request = TransactionsRequest {
                client_id: &self.client_id,
                secret: &self.secret,
                access_token,
                start_date: start.format("%Y-%m-%d").to_string(),
                end_date: end.format("%Y-%m-%d").to_string(),
                options: TransactionsOptions {
                    count: PAGE_SIZE,
                    offset: collected.len(),
                },
            };

            let response = self
                .http_client
                .post(format!("{}/transactions/get", self.base_url))
                .json(&request)
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let body: Option<AggregatorErrorBody> = response.json().await.ok();
                let detail = body
                    .map(|b| {
                        format!(
                            "{}: {}",
                            b.error_code.unwrap_or_else(|| "UNKNOWN".to_string()),
                            b.error_message.unwrap_or_default()
                        )
                    })
                    .unwrap_or_else(|| "no error body".to_string());
                return Err(Error::Source(format!("{} ({})", status, detail)));
            }

            let page: TransactionsResponse = response.json().await?;
            let fetched = page.transactions.len();
            collected.extend(page.transactions);

            let total = page.total_transactions.unwrap_or(collected.len());
            debug!(fetched, collected = collected.len(), total, "Fetched transaction page");
            if fetched == 0 || collected.len() >= total {
                break;
            }
        }

        Ok(collected)
    }
}

/// Fixed transaction list, filtered by the requested window
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    transactions: Vec<Transaction>,
}

impl StaticSource {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }
}

#[async_trait]
impl TransactionSource for StaticSource {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn transactions(
        &self,
        _access_token: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        Ok(self
            .transactions
            .iter()
            .filter(|t| t.date >= start && t.date <= end)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_window() {
        let (start, end) = window(SUMMARY_WINDOW_DAYS, date("2024-03-31"));
        assert_eq!(start, date("2024-03-01"));
        assert_eq!(end, date("2024-03-31"));
    }

    #[test]
    fn test_env_parsing() {
        assert_eq!("Sandbox".parse::<AggregatorEnv>(), Ok(AggregatorEnv::Sandbox));
        assert_eq!(
            "production".parse::<AggregatorEnv>().unwrap().base_url(),
            "https://production.plaid.com"
        );
        assert!("staging".parse::<AggregatorEnv>().is_err());
    }

    #[test]
    fn test_client_trims_base_url() {
        let client = AggregatorClient::new("http://localhost:9000/", "id", "secret");
        assert_eq!(client.base_url(), "http://localhost:9000");
    }

    #[tokio::test]
    async fn test_static_source_filters_window() {
        let source = StaticSource::new(vec![
            Transaction::new(date("2024-01-01"), 10.0, &["Food"]),
            Transaction::new(date("2024-02-15"), 20.0, &["Food"]),
            Transaction::new(date("2024-03-01"), 30.0, &["Food"]),
        ]);

        let found = source
            .transactions("token", date("2024-02-01"), date("2024-03-01"))
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].amount, 20.0);
    }
}
