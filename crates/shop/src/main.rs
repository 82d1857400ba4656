//! Shop demo entry point.

use persistence::InMemoryStore;
use shop::{Shop, ShopConfig, demo, telemetry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration
    let config = ShopConfig::from_env()?;

    // 2. Initialize tracing
    telemetry::init_tracing(&config);

    // 3. Install Prometheus metrics recorder
    let metrics_handle = telemetry::install_metrics()?;

    // 4. Wire the services over in-memory storage
    let shop = Shop::new(InMemoryStore::new(), &config);

    // 5. Run the seeded scenario
    let report = demo::run(&shop).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    // 6. Dump the metrics collected along the way
    println!("{}", metrics_handle.render());

    tracing::info!("demo finished");
    Ok(())
}
