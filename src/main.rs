//! change-relay server entry point.
//!
//! Wires the mediator to the WebSocket broadcaster, optionally starts the
//! Postgres change feed, and serves HTTP.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use change_relay::app_state::AppState;
use change_relay::config::{LogFormat, RelayConfig};
use change_relay::domain::EventBus;
use change_relay::feed::PgChangeFeed;
use change_relay::service::ChangeMediator;
use change_relay::ws::WsBroadcaster;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = RelayConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting change-relay");

    // Build routing core and transport
    let mediator = Arc::new(ChangeMediator::new());
    let event_bus = EventBus::new(config.event_bus_capacity);
    let _ = mediator
        .set_broadcaster(Arc::new(WsBroadcaster::new(event_bus.clone())))
        .await;

    // Start upstream change feed
    if config.change_feed_enabled {
        let feed = PgChangeFeed::connect_lazy(&config, Arc::clone(&mediator))?;
        tokio::spawn(feed.run());
    } else {
        tracing::info!("change feed disabled; accepting changes over HTTP only");
    }

    let app = change_relay::build_app(AppState {
        mediator,
        event_bus,
    });

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
