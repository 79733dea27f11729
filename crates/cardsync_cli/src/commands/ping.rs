use crate::commands::shared::build_client;
use crate::config::Config;

/// Probe the configured catalog.
///
/// Returns whether it answered with 200.
pub(crate) async fn handle_ping(config: &Config) -> Result<bool, Box<dyn std::error::Error>> {
    let client = build_client(config)?;
    let reachable = client.test_connection().await;

    if reachable {
        println!("Catalog reachable at {}", client.base_url());
    } else {
        eprintln!("Catalog unreachable at {}", client.base_url());
    }
    Ok(reachable)
}
