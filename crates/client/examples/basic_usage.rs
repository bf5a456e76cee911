//! Scoped session: start, set a few values, compute, close.
//!
//! Run with: cargo run --example basic_usage

use phoebe_client::{Client, Config};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::load_or_default("phoebe.toml")?;
    let mut client = Client::from_config(config)?;

    client
        .with_session(|c| {
            Box::pin(async move {
                println!("Session: {}", c.session_id().unwrap_or("-"));

                c.set_value("period@binary", &1.5).await?;
                c.set_value("teff@primary", &6000).await?;

                let period = c.get_value("period@binary").await?;
                println!("Period: {period}");

                c.add_dataset(
                    "lc",
                    &json!({"dataset": "lc01", "passband": "Johnson:V"}),
                )
                .await?;

                let result = c.run_compute(&()).await?;
                println!("Success: {}", result["success"]);
                Ok(())
            })
        })
        .await?;

    Ok(())
}
