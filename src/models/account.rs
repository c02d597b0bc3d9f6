use std::fmt;

use serde::Deserialize;

/// Minimal view of the futures account snapshot, fetched once at startup
/// as a connectivity check and shown to the user.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountSummary {
    #[serde(rename = "totalWalletBalance")]
    pub total_wallet_balance: String,
    #[serde(rename = "availableBalance")]
    pub available_balance: String,
    #[serde(rename = "canTrade", default)]
    pub can_trade: bool,
}

impl fmt::Display for AccountSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "wallet={} available={} canTrade={}",
            self.total_wallet_balance, self.available_balance, self.can_trade
        )
    }
}
