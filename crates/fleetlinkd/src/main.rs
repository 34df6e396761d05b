use anyhow::Result;
use tracing::Level;

fn main() -> Result<()> {
    let json = std::env::var("FLEETLINK_LOG_FORMAT").is_ok_and(|v| v == "json");
    fleetlink_core::telemetry::init_logging(json, Level::INFO);

    tracing::info!(version = fleetlink_core::VERSION, "fleetlinkd stub started");
    Ok(())
}
