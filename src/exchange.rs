//! Authenticated session against the Binance USDT-M futures testnet REST API.

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use log::info;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;

use crate::configure::AppConfig;
use crate::errors::BotError;
use crate::models::{AccountSummary, ExchangeInfo, NewOrder, SymbolRules};

type HmacSha256 = Hmac<Sha256>;

/// Everything the order pipeline needs from the exchange. The concrete
/// implementation talks REST; tests substitute a mock.
#[async_trait]
pub trait ExchangeSession: Send + Sync {
    /// Server-side epoch millis.
    async fn server_time(&self) -> Result<i64, BotError>;
    async fn account(&self) -> Result<AccountSummary, BotError>;
    async fn symbol_rules(&self, symbol: &str) -> Result<SymbolRules, BotError>;
    async fn create_order(&self, order: &NewOrder) -> Result<OrderReceipt, BotError>;
    /// Status record for a previously placed order, passed through opaquely.
    async fn get_order(&self, symbol: &str, order_id: u64) -> Result<Value, BotError>;
}

/// Order-creation response: the exchange-assigned id plus the raw record,
/// kept untouched for display.
#[derive(Debug, Clone)]
pub struct OrderReceipt {
    pub order_id: u64,
    pub raw: Value,
}

#[derive(Debug, Deserialize)]
struct ServerTime {
    #[serde(rename = "serverTime")]
    server_time: i64,
}

pub struct FuturesClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
    api_secret: String,
    recv_window_ms: u64,
    /// Server clock minus local clock, in ms. Computed once at connect and
    /// reused for every signed timestamp afterwards.
    timestamp_offset_ms: i64,
}

impl FuturesClient {
    /// Authenticate and synchronize the local clock with the server.
    /// Any failure here is fatal and aborts before any other work.
    pub async fn connect(config: &AppConfig) -> Result<Self, BotError> {
        if config.api_key.is_empty() || config.api_secret.is_empty() {
            return Err(BotError::init(
                "loading credentials",
                anyhow::anyhow!("APP_API_KEY and APP_API_SECRET must be set"),
            ));
        }

        let mut client = FuturesClient {
            http: HttpClient::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            recv_window_ms: config.recv_window_ms,
            timestamp_offset_ms: 0,
        };

        let server_time = client
            .server_time()
            .await
            .map_err(|e| BotError::init("synchronizing server time", anyhow::Error::new(e)))?;
        let local_time = Utc::now().timestamp_millis();
        client.timestamp_offset_ms = server_time - local_time;

        info!(
            "Session initialized and time synchronized with server. Offset: {} ms",
            client.timestamp_offset_ms
        );
        Ok(client)
    }

    fn timestamp_ms(&self) -> i64 {
        Utc::now().timestamp_millis() + self.timestamp_offset_ms
    }

    fn sign(&self, query: &str) -> String {
        // HMAC accepts keys of any length, so new_from_slice cannot fail.
        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
            .expect("HMAC key of any length");
        mac.update(query.as_bytes());
        mac.finalize()
            .into_bytes()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }

    /// Render parameters as a query string, append recvWindow and the
    /// offset-adjusted timestamp, and sign the whole thing.
    fn signed_query(&self, mut params: Vec<(&'static str, String)>) -> String {
        params.push(("recvWindow", self.recv_window_ms.to_string()));
        params.push(("timestamp", self.timestamp_ms().to_string()));
        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        let signature = self.sign(&query);
        format!("{}&signature={}", query, signature)
    }

    async fn read_json(response: reqwest::Response, context: &str) -> Result<Value, BotError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BotError::dispatch(context, e))?;
        if !status.is_success() {
            return Err(BotError::dispatch(
                context,
                anyhow::anyhow!("HTTP {}: {}", status, body),
            ));
        }
        serde_json::from_str(&body).map_err(|e| BotError::dispatch(context, e))
    }
}

#[async_trait]
impl ExchangeSession for FuturesClient {
    async fn server_time(&self) -> Result<i64, BotError> {
        let context = "fetching server time";
        let url = format!("{}/fapi/v1/time", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| BotError::dispatch(context, e))?;
        let value = Self::read_json(response, context).await?;
        let parsed: ServerTime =
            serde_json::from_value(value).map_err(|e| BotError::dispatch(context, e))?;
        Ok(parsed.server_time)
    }

    async fn account(&self) -> Result<AccountSummary, BotError> {
        let context = "fetching account info";
        let url = format!(
            "{}/fapi/v2/account?{}",
            self.base_url,
            self.signed_query(Vec::new())
        );
        let response = self
            .http
            .get(&url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await
            .map_err(|e| BotError::dispatch(context, e))?;
        let value = Self::read_json(response, context).await?;
        let summary: AccountSummary =
            serde_json::from_value(value).map_err(|e| BotError::dispatch(context, e))?;
        info!("Account info retrieved: {}", summary);
        Ok(summary)
    }

    async fn symbol_rules(&self, symbol: &str) -> Result<SymbolRules, BotError> {
        let context = "fetching symbol info";
        let url = format!("{}/fapi/v1/exchangeInfo?symbol={}", self.base_url, symbol);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| BotError::dispatch(context, e))?;
        let value = Self::read_json(response, context).await?;
        let exchange_info: ExchangeInfo =
            serde_json::from_value(value).map_err(|e| BotError::dispatch(context, e))?;
        let rules = SymbolRules::from_exchange_info(&exchange_info, symbol)?;
        info!("Symbol info retrieved: {} minQty={}", rules.symbol, rules.min_qty);
        Ok(rules)
    }

    async fn create_order(&self, order: &NewOrder) -> Result<OrderReceipt, BotError> {
        let context = "placing order";
        let url = format!(
            "{}/fapi/v1/order?{}",
            self.base_url,
            self.signed_query(order.params())
        );
        let response = self
            .http
            .post(&url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await
            .map_err(|e| BotError::dispatch(context, e))?;
        let raw = Self::read_json(response, context).await?;
        let order_id = raw.get("orderId").and_then(Value::as_u64).ok_or_else(|| {
            BotError::dispatch(context, anyhow::anyhow!("response missing orderId: {}", raw))
        })?;
        info!("{} order placed: {}", order.kind(), raw);
        Ok(OrderReceipt { order_id, raw })
    }

    async fn get_order(&self, symbol: &str, order_id: u64) -> Result<Value, BotError> {
        let context = "querying order status";
        let query = self.signed_query(vec![
            ("symbol", symbol.to_string()),
            ("orderId", order_id.to_string()),
        ]);
        let url = format!("{}/fapi/v1/order?{}", self.base_url, query);
        let response = self
            .http
            .get(&url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await
            .map_err(|e| BotError::dispatch(context, e))?;
        let status = Self::read_json(response, context).await?;
        info!("Order status retrieved: {}", status);
        Ok(status)
    }
}
