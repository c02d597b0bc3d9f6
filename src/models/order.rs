use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::BotError;

pub const DEFAULT_SYMBOL: &str = "BTCUSDT";
pub const TIME_IN_FORCE_GTC: &str = "GTC";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            other => Err(format!(
                "Side must be either 'BUY' or 'SELL', got '{}'",
                other
            )),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
    Market,
    Limit,
    /// Stop-limit: a limit order armed at a trigger price.
    Stop,
}

impl OrderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderKind::Market => "MARKET",
            OrderKind::Limit => "LIMIT",
            OrderKind::Stop => "STOP",
        }
    }
}

impl FromStr for OrderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MARKET" => Ok(OrderKind::Market),
            "LIMIT" => Ok(OrderKind::Limit),
            "STOP" => Ok(OrderKind::Stop),
            other => Err(format!(
                "Order type must be 'MARKET', 'LIMIT', or 'STOP', got '{}'",
                other
            )),
        }
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw order parameters as captured from the command line. Numeric fields
/// stay in their original textual form so decimal parsing never goes
/// through a binary float.
#[derive(Debug, Clone, Default)]
pub struct OrderInput {
    pub symbol: String,
    pub side: String,
    pub order_type: String,
    pub quantity: String,
    pub price: Option<String>,
    pub stop_price: Option<String>,
}

impl OrderInput {
    /// Check every constraint in precedence order and produce a normalized
    /// request. The first violated constraint is reported.
    pub fn validate(&self) -> Result<OrderRequest, BotError> {
        let symbol = self.symbol.trim();
        if symbol.is_empty() {
            return Err(BotError::validation("Symbol must be a non-empty string"));
        }

        let side: Side = self.side.parse().map_err(BotError::validation)?;
        let kind: OrderKind = self.order_type.parse().map_err(BotError::validation)?;

        let quantity = parse_positive_decimal(&self.quantity, "Quantity")?;
        let price = self
            .price
            .as_deref()
            .map(|raw| parse_positive_decimal(raw, "Price"))
            .transpose()?;
        let stop_price = self
            .stop_price
            .as_deref()
            .map(|raw| parse_positive_decimal(raw, "Stop price"))
            .transpose()?;

        Ok(OrderRequest {
            symbol: symbol.to_uppercase(),
            side,
            kind,
            quantity,
            price,
            stop_price,
        })
    }
}

fn parse_positive_decimal(raw: &str, what: &str) -> Result<Decimal, BotError> {
    let value: Decimal = raw.trim().parse().map_err(|_| {
        BotError::validation(format!("{} must be a decimal number, got '{}'", what, raw))
    })?;
    if value <= Decimal::ZERO {
        return Err(BotError::validation(format!("{} must be positive", what)));
    }
    Ok(value)
}

/// Normalized order parameters. Presence of price/stop_price relative to
/// the order kind is enforced when the wire request is built.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: Side,
    pub kind: OrderKind,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
}

impl OrderRequest {
    /// Select the wire request shape for this order kind. A market order
    /// cannot carry price fields at all; missing required prices are
    /// validation errors and stop the pipeline before any network call.
    pub fn build(&self) -> Result<NewOrder, BotError> {
        let symbol = self.symbol.clone();
        let quantity = self.quantity.to_string();

        match self.kind {
            OrderKind::Market => Ok(NewOrder::Market {
                symbol,
                side: self.side,
                quantity,
            }),
            OrderKind::Limit => {
                let price = self
                    .price
                    .ok_or_else(|| BotError::validation("Price is required for LIMIT orders"))?;
                Ok(NewOrder::Limit {
                    symbol,
                    side: self.side,
                    quantity,
                    price: truncate_price(price),
                })
            }
            OrderKind::Stop => {
                let missing =
                    || BotError::validation("Both price and stop_price are required for STOP orders");
                let price = self.price.ok_or_else(missing)?;
                let stop_price = self.stop_price.ok_or_else(missing)?;
                Ok(NewOrder::StopLimit {
                    symbol,
                    side: self.side,
                    quantity,
                    price: truncate_price(price),
                    stop_price: truncate_price(stop_price),
                })
            }
        }
    }
}

/// Round toward zero at two decimals and render with exactly two decimals.
/// A limit price must never be overstated by rounding up.
pub fn truncate_price(value: Decimal) -> String {
    let truncated = value.round_dp_with_strategy(2, RoundingStrategy::ToZero);
    format!("{:.2}", truncated)
}

/// Wire-shaped order request, one variant per order kind. Invalid field
/// combinations are unrepresentable.
#[derive(Debug, Clone, PartialEq)]
pub enum NewOrder {
    Market {
        symbol: String,
        side: Side,
        quantity: String,
    },
    Limit {
        symbol: String,
        side: Side,
        quantity: String,
        price: String,
    },
    StopLimit {
        symbol: String,
        side: Side,
        quantity: String,
        price: String,
        stop_price: String,
    },
}

impl NewOrder {
    pub fn symbol(&self) -> &str {
        match self {
            NewOrder::Market { symbol, .. }
            | NewOrder::Limit { symbol, .. }
            | NewOrder::StopLimit { symbol, .. } => symbol,
        }
    }

    pub fn kind(&self) -> OrderKind {
        match self {
            NewOrder::Market { .. } => OrderKind::Market,
            NewOrder::Limit { .. } => OrderKind::Limit,
            NewOrder::StopLimit { .. } => OrderKind::Stop,
        }
    }

    /// Request parameters in wire order, ready for signing. Limit and
    /// stop-limit orders rest on the book until cancelled (GTC).
    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            NewOrder::Market {
                symbol,
                side,
                quantity,
            } => vec![
                ("symbol", symbol.clone()),
                ("side", side.as_str().to_string()),
                ("type", "MARKET".to_string()),
                ("quantity", quantity.clone()),
            ],
            NewOrder::Limit {
                symbol,
                side,
                quantity,
                price,
            } => vec![
                ("symbol", symbol.clone()),
                ("side", side.as_str().to_string()),
                ("type", "LIMIT".to_string()),
                ("timeInForce", TIME_IN_FORCE_GTC.to_string()),
                ("quantity", quantity.clone()),
                ("price", price.clone()),
            ],
            NewOrder::StopLimit {
                symbol,
                side,
                quantity,
                price,
                stop_price,
            } => vec![
                ("symbol", symbol.clone()),
                ("side", side.as_str().to_string()),
                ("type", "STOP".to_string()),
                ("timeInForce", TIME_IN_FORCE_GTC.to_string()),
                ("quantity", quantity.clone()),
                ("price", price.clone()),
                ("stopPrice", stop_price.clone()),
            ],
        }
    }
}
