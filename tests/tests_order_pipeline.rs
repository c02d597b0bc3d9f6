use std::sync::Mutex;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use orderbot::dispatch::place_and_track;
use orderbot::errors::BotError;
use orderbot::exchange::{ExchangeSession, OrderReceipt};
use orderbot::models::{AccountSummary, NewOrder, OrderInput, SymbolRules, DEFAULT_SYMBOL};

/// Mock session that records every order-placement and status-query call.
#[derive(Default)]
struct MockExchange {
    fail_create: bool,
    created: Mutex<Vec<NewOrder>>,
    status_queries: Mutex<Vec<(String, u64)>>,
}

impl MockExchange {
    fn created_orders(&self) -> Vec<NewOrder> {
        self.created.lock().unwrap().clone()
    }

    fn queries(&self) -> Vec<(String, u64)> {
        self.status_queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExchangeSession for MockExchange {
    async fn server_time(&self) -> Result<i64, BotError> {
        Ok(1_700_000_000_000)
    }

    async fn account(&self) -> Result<AccountSummary, BotError> {
        Ok(AccountSummary {
            total_wallet_balance: "1000.0".to_string(),
            available_balance: "1000.0".to_string(),
            can_trade: true,
        })
    }

    async fn symbol_rules(&self, symbol: &str) -> Result<SymbolRules, BotError> {
        Ok(SymbolRules {
            symbol: symbol.to_string(),
            min_qty: Decimal::new(1, 3), // 0.001
        })
    }

    async fn create_order(&self, order: &NewOrder) -> Result<OrderReceipt, BotError> {
        if self.fail_create {
            return Err(BotError::dispatch(
                "placing order",
                anyhow::anyhow!("HTTP 400 Bad Request: code -2019, Margin is insufficient."),
            ));
        }
        self.created.lock().unwrap().push(order.clone());
        Ok(OrderReceipt {
            order_id: 123,
            raw: json!({"orderId": 123, "symbol": order.symbol(), "status": "NEW"}),
        })
    }

    async fn get_order(&self, symbol: &str, order_id: u64) -> Result<Value, BotError> {
        self.status_queries
            .lock()
            .unwrap()
            .push((symbol.to_string(), order_id));
        Ok(json!({"orderId": order_id, "symbol": symbol, "status": "FILLED"}))
    }
}

fn market_input(quantity: &str) -> OrderInput {
    OrderInput {
        symbol: DEFAULT_SYMBOL.to_string(),
        side: "BUY".to_string(),
        order_type: "MARKET".to_string(),
        quantity: quantity.to_string(),
        price: None,
        stop_price: None,
    }
}

fn rules(min_qty: &str) -> SymbolRules {
    SymbolRules {
        symbol: DEFAULT_SYMBOL.to_string(),
        min_qty: min_qty.parse().unwrap(),
    }
}

#[tokio::test]
async fn test_market_order_end_to_end() {
    let mock = MockExchange::default();
    let request = market_input("0.01").validate().unwrap();

    let (receipt, status) = place_and_track(&mock, &request, &rules("0.001"))
        .await
        .unwrap();

    // The emitted request carries exactly the market-order fields.
    let created = mock.created_orders();
    assert_eq!(created.len(), 1);
    assert_eq!(
        created[0].params(),
        vec![
            ("symbol", "BTCUSDT".to_string()),
            ("side", "BUY".to_string()),
            ("type", "MARKET".to_string()),
            ("quantity", "0.01".to_string()),
        ]
    );

    // Exactly one follow-up status query for the returned order id.
    assert_eq!(receipt.order_id, 123);
    assert_eq!(mock.queries(), vec![("BTCUSDT".to_string(), 123)]);
    assert_eq!(status["status"], "FILLED");
}

#[tokio::test]
async fn test_min_lot_guard_blocks_before_any_network_call() {
    let mock = MockExchange::default();
    let request = market_input("0.0005").validate().unwrap();

    let err = place_and_track(&mock, &request, &rules("0.001"))
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert!(err
        .to_string()
        .contains("Quantity 0.0005 is below minimum 0.001 for BTCUSDT"));
    assert!(mock.created_orders().is_empty());
    assert!(mock.queries().is_empty());
}

#[tokio::test]
async fn test_limit_order_price_truncated_through_pipeline() {
    let mock = MockExchange::default();
    let mut input = market_input("0.5");
    input.order_type = "LIMIT".to_string();
    input.price = Some("123.456".to_string());
    let request = input.validate().unwrap();

    place_and_track(&mock, &request, &rules("0.001"))
        .await
        .unwrap();

    let params = mock.created_orders()[0].params();
    assert!(params.contains(&("type", "LIMIT".to_string())));
    assert!(params.contains(&("price", "123.45".to_string())));
    assert!(params.contains(&("timeInForce", "GTC".to_string())));
}

#[tokio::test]
async fn test_stop_limit_order_carries_both_truncated_prices() {
    let mock = MockExchange::default();
    let mut input = market_input("0.5");
    input.side = "SELL".to_string();
    input.order_type = "STOP".to_string();
    input.price = Some("100.999".to_string());
    input.stop_price = Some("101".to_string());
    let request = input.validate().unwrap();

    place_and_track(&mock, &request, &rules("0.001"))
        .await
        .unwrap();

    let params = mock.created_orders()[0].params();
    assert!(params.contains(&("type", "STOP".to_string())));
    assert!(params.contains(&("side", "SELL".to_string())));
    assert!(params.contains(&("price", "100.99".to_string())));
    assert!(params.contains(&("stopPrice", "101.00".to_string())));
}

#[tokio::test]
async fn test_missing_limit_price_fails_before_submission() {
    let mock = MockExchange::default();
    let mut input = market_input("0.5");
    input.order_type = "LIMIT".to_string();
    let request = input.validate().unwrap();

    let err = place_and_track(&mock, &request, &rules("0.001"))
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert!(mock.created_orders().is_empty());
    assert!(mock.queries().is_empty());
}

#[tokio::test]
async fn test_dispatch_error_propagates_and_skips_status_query() {
    let mock = MockExchange {
        fail_create: true,
        ..Default::default()
    };
    let request = market_input("0.01").validate().unwrap();

    let err = place_and_track(&mock, &request, &rules("0.001"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "DISPATCH");
    assert!(err.to_string().contains("Margin is insufficient"));
    assert!(mock.queries().is_empty());
}
