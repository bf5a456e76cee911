//! Explicit session management: save the bundle to a file.
//!
//! Run with: cargo run --example explicit_session

use phoebe_client::Client;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut client = Client::builder().host("localhost").port(8001).build()?;

    let session = client.start_session().await?;
    println!("Session ID: {}", session.session_id);

    let outcome = save(&client).await;
    client.close_session().await?;
    outcome
}

async fn save(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
    client.set_value("period@binary", &2.5).await?;
    let result = client.save_bundle().await?;

    if result["success"] == true {
        if let Some(bundle) = result["result"]["bundle"].as_str() {
            std::fs::write("my_bundle.phoebe", bundle)?;
            println!("Saved my_bundle.phoebe");
        }
    }
    Ok(())
}
