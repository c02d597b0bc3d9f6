use rust_decimal::Decimal;
use serde::Deserialize;

use crate::errors::BotError;

/// Exchange-reported trading rules for one symbol. Only the LOT_SIZE
/// minimum is enforced locally; everything else stays on the exchange side.
#[derive(Debug, Clone)]
pub struct SymbolRules {
    pub symbol: String,
    pub min_qty: Decimal,
}

/// Subset of the /fapi/v1/exchangeInfo response we care about.
#[derive(Debug, Deserialize)]
pub struct ExchangeInfo {
    pub symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
pub struct SymbolInfo {
    pub symbol: String,
    #[serde(default)]
    pub filters: Vec<SymbolFilter>,
}

#[derive(Debug, Deserialize)]
pub struct SymbolFilter {
    #[serde(rename = "filterType")]
    pub filter_type: String,
    #[serde(rename = "minQty")]
    pub min_qty: Option<String>,
}

impl SymbolRules {
    pub fn from_exchange_info(info: &ExchangeInfo, symbol: &str) -> Result<Self, BotError> {
        let entry = info
            .symbols
            .iter()
            .find(|s| s.symbol.eq_ignore_ascii_case(symbol))
            .ok_or_else(|| {
                BotError::dispatch(
                    "looking up symbol info",
                    anyhow::anyhow!("symbol {} not present in exchange info", symbol),
                )
            })?;

        // No LOT_SIZE filter means no lower bound to enforce.
        let mut min_qty = Decimal::ZERO;
        if let Some(filter) = entry.filters.iter().find(|f| f.filter_type == "LOT_SIZE") {
            if let Some(raw) = filter.min_qty.as_deref() {
                min_qty = raw.parse().map_err(|e| {
                    BotError::dispatch(
                        "parsing LOT_SIZE minQty",
                        anyhow::anyhow!("'{}': {}", raw, e),
                    )
                })?;
            }
        }

        Ok(SymbolRules {
            symbol: entry.symbol.clone(),
            min_qty,
        })
    }
}
