use std::sync::Arc;

use anyhow::Result;
use campus_auth::AuthOptions;
use campus_core::MemoryStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let options = AuthOptions::from_env();
    let app = campus_axum::build(options, Arc::new(MemoryStore::new()))?;

    let addr =
        std::env::var("CAMPUS_HTTP_ADDR").unwrap_or_else(|_| "127.0.0.1:3030".to_string());

    println!("[campus] listening on http://{addr}");

    app.listen(addr).await?;

    Ok(())
}
