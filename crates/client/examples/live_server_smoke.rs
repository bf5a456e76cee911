//! Minimal smoke test against a running server.
//!
//! Reads host, port and API key from phoebe.toml, then starts a session,
//! sets period@binary, reads mass@primary and closes the session.
//!
//! Run with: cargo run --example live_server_smoke

use phoebe_client::{Client, Config};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    match run().await {
        Ok(()) => {
            println!("Session closed.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Live smoke test failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default("phoebe.toml")?;
    let mut client = Client::from_config(config)?;

    // Non-fatal: older servers may not expose it.
    match client.sessions().port_status().await {
        Ok(status) => println!("Port status: {status}"),
        Err(e) => println!("Warning: could not read port status: {e}"),
    }

    client
        .with_session(|c| {
            Box::pin(async move {
                println!("Setting period@binary = 0.56 ...");
                c.set_value("period@binary", &0.56).await?;

                println!("Getting mass@primary ...");
                let m1 = c.get_value("mass@primary").await?;
                println!("mass@primary: {m1}");
                Ok(())
            })
        })
        .await?;
    Ok(())
}
