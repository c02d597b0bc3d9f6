use clap::Parser;
use dotenv::dotenv;
use log::{error, info};

use orderbot::configure;
use orderbot::dispatch;
use orderbot::errors::BotError;
use orderbot::exchange::{ExchangeSession, FuturesClient};
use orderbot::logger;
use orderbot::models::{OrderInput, DEFAULT_SYMBOL};

#[derive(Debug, Parser)]
#[clap(name = "orderbot", version, about = "Binance futures testnet order CLI")]
struct Args {
    /// Trading pair
    #[clap(long, default_value = DEFAULT_SYMBOL)]
    symbol: String,

    /// Order side: BUY or SELL
    #[clap(long, value_parser = ["BUY", "SELL"])]
    side: String,

    /// Order type: MARKET, LIMIT, or STOP
    #[clap(long = "type", value_parser = ["MARKET", "LIMIT", "STOP"])]
    order_type: String,

    /// Order quantity. Taken as text so decimals parse without float rounding.
    #[clap(long)]
    quantity: String,

    /// Limit price (required for LIMIT and STOP orders)
    #[clap(long)]
    price: Option<String>,

    /// Stop price (required for STOP orders)
    #[clap(long = "stop_price")]
    stop_price: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        error!("{}", err);
        println!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), BotError> {
    dotenv().ok();
    let args = Args::parse();

    let config =
        configure::load_config().map_err(|e| BotError::init("loading configuration", e))?;
    logger::setup_logger(&config)
        .map_err(|e| BotError::init("setting up logger", anyhow::anyhow!("{}", e)))?;

    // Validate before anything touches the network.
    let input = OrderInput {
        symbol: args.symbol,
        side: args.side,
        order_type: args.order_type,
        quantity: args.quantity,
        price: args.price,
        stop_price: args.stop_price,
    };
    let request = input.validate()?;

    let client = FuturesClient::connect(&config).await?;

    // Connectivity check before trading.
    println!("Fetching account info...");
    let account = client.account().await?;
    println!("Account Info: {}", account);

    println!("Fetching symbol info for {}...", request.symbol);
    let rules = client.symbol_rules(&request.symbol).await?;
    println!("Symbol Info: {} minQty={}", rules.symbol, rules.min_qty);

    let (receipt, status) = dispatch::place_and_track(&client, &request, &rules).await?;

    println!("Order Details: {}", receipt.raw);
    println!("Order Status: {}", status);
    info!(
        "Order {} on {} completed successfully",
        receipt.order_id, request.symbol
    );

    Ok(())
}
