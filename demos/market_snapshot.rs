use cryptowrapper::{Arguments, AsyncClient, BlockingClient, ClientConfig, Provider};
use futures::future::join_all;
use std::time::Instant;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Market Snapshot");
    println!("===============");

    // 1. Blocking client: the second identical call is served from cache
    let binance = BlockingClient::new(ClientConfig::from_env(Provider::Binance)?)?;
    let args = Arguments::new()
        .with("symbol", "BTCUSDT")
        .with("interval", "1h")
        .with("limit", 3);

    for round in 1..=2 {
        let start = Instant::now();
        match binance.invoke("klines_GET", args.clone()) {
            Ok(response) => println!(
                "Binance klines #{}: cached={} in {:?}",
                round,
                response.cached,
                start.elapsed()
            ),
            Err(e) => eprintln!("Binance klines #{} failed: {}", round, e),
        }
    }

    // 2. Async client: concurrent tickers, no caching
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let deribit = AsyncClient::new(ClientConfig::new(Provider::Deribit))?;
        let instruments = ["BTC-PERPETUAL", "ETH-PERPETUAL", "SOL_USDC-PERPETUAL"];

        let handles: Vec<_> = instruments
            .iter()
            .map(|name| {
                deribit.spawn(
                    "ticker_GET",
                    Arguments::new().with("instrument_name", *name),
                )
            })
            .collect();

        println!("\n{:-<50}", "");
        for (name, result) in instruments.iter().zip(join_all(handles).await) {
            match result {
                Ok(response) => {
                    let price = &response.body["result"]["last_price"];
                    println!("{:<20} {}", name, price);
                }
                Err(e) => eprintln!("{:<20} error: {}", name, e),
            }
        }

        Ok::<_, Box<dyn std::error::Error>>(())
    })?;

    Ok(())
}
