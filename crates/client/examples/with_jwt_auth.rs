//! Forward a user identity token issued by an external provider.
//!
//! Run with: PHOEBE_TOKEN=... cargo run --example with_jwt_auth

use phoebe_client::{Client, Credentials, JwtAuthProvider};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let public_key = std::fs::read("public_key.pem")?;
    let auth = JwtAuthProvider::from_rsa_pem(&public_key, "https://auth.example.com", "phoebe-api")?;

    let token = std::env::var("PHOEBE_TOKEN")?;

    let mut client = Client::builder()
        .host("localhost")
        .port(8001)
        .auth_provider(auth)
        .build()?;
    client.authenticate(&Credentials::token(token)).await?;

    let claims = client.identity().await?;
    println!("Signed in as {}", claims["username"]);

    client.start_session().await?;
    client.set_value("period@binary", &1.5).await?;
    client.close_session().await?;
    Ok(())
}
