//! The order pipeline: guard, build, submit, query status once.

use log::info;
use serde_json::Value;

use crate::errors::BotError;
use crate::exchange::{ExchangeSession, OrderReceipt};
use crate::models::{OrderRequest, SymbolRules};

/// Run one order through the pipeline. The exchange minimum lot size is
/// enforced first, so an undersized order never reaches the network.
/// After a successful submission the order status is queried exactly once.
pub async fn place_and_track<S: ExchangeSession>(
    session: &S,
    request: &OrderRequest,
    rules: &SymbolRules,
) -> Result<(OrderReceipt, Value), BotError> {
    if request.quantity < rules.min_qty {
        return Err(BotError::validation(format!(
            "Quantity {} is below minimum {} for {}",
            request.quantity, rules.min_qty, request.symbol
        )));
    }

    let order = request.build()?;
    info!("Constructed {} order: {:?}", order.kind(), order.params());

    let receipt = session.create_order(&order).await?;
    let status = session.get_order(&request.symbol, receipt.order_id).await?;

    Ok((receipt, status))
}
