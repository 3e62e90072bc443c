//! # Chat Session Demo
//!
//! Walks through a typical dumb_api client session:
//!
//! 1. Log in over HTTP (with a second factor if the account needs one)
//! 2. List channels and print recent history of the first one
//! 3. Open the realtime socket and print pushed messages and call signaling
//! 4. Disconnect gracefully on Ctrl+C or when the server closes
//!
//! ## Running
//!
//! ```sh
//! # Start a dumb_api server on localhost:3000, then:
//! DUMB_API_USER=alice DUMB_API_PASSWORD=secret cargo run --example chat_session
//!
//! # Override the server address; pass a TOTP code if 2FA is enabled:
//! DUMB_API_URL=https://chat.example.com DUMB_API_2FA=123456 \
//!     DUMB_API_USER=alice DUMB_API_PASSWORD=secret \
//!     cargo run --example chat_session --features transport-websocket-tls
//! ```

use dumb_api_client::{Client, ClientConfig, RealtimeEvent};
use tokio::sync::broadcast::error::RecvError;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Logging ─────────────────────────────────────────────────────
    // Set `RUST_LOG=debug` for request and socket traces.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // ── Configuration ───────────────────────────────────────────────
    let config = ClientConfig::from_env();
    let username = std::env::var("DUMB_API_USER").unwrap_or_else(|_| "alice".to_string());
    let password = std::env::var("DUMB_API_PASSWORD").unwrap_or_default();
    let second_factor = std::env::var("DUMB_API_2FA").ok();
    tracing::info!("Using server {}", config.base_url);

    let client = Client::new(config)?;
    let api = client.api();

    // ── Login ───────────────────────────────────────────────────────
    let login = api.login(&username, &password, None).await.into_result()?;
    if login.requires_2fa {
        let (Some(session_id), Some(code)) = (login.session_id.as_deref(), second_factor) else {
            tracing::error!("Account requires 2FA; set DUMB_API_2FA");
            return Ok(());
        };
        api.verify_2fa_login(&username, session_id, &code)
            .await
            .into_result()?;
    }
    tracing::info!("Logged in as {username}");

    // ── Channels and history ────────────────────────────────────────
    let channels = api.get_channels().await.into_result()?.channels;
    for channel in &channels {
        tracing::info!("#{} ({} members)", channel.name, channel.member_count);
    }
    if let Some(first) = channels.first() {
        let history = api.get_messages(&first.name, 10, None).await;
        match history.into_result() {
            Ok(page) => {
                for msg in page.messages {
                    tracing::info!("[{}] {}: {}", first.name, msg.from, msg.text);
                }
            }
            Err(e) => tracing::warn!("Could not load history: {e}"),
        }
    }

    // ── Realtime ────────────────────────────────────────────────────
    let mut events = client.realtime().subscribe();
    client.realtime().connect().await?;

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(RealtimeEvent::MessageReceived(msg)) => {
                        tracing::info!("[{}] {}: {}", msg.channel, msg.from, msg.text);
                    }
                    Ok(RealtimeEvent::Signaling { kind, envelope }) => {
                        tracing::info!("{kind} from {}", envelope.from);
                    }
                    Ok(RealtimeEvent::ConnectionChanged { connected: true, .. }) => {
                        tracing::info!("Socket connected");
                    }
                    Ok(RealtimeEvent::ConnectionChanged { connected: false, error }) => {
                        tracing::warn!("Socket closed: {}", error.as_deref().unwrap_or("by server"));
                        break;
                    }
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!("Missed {missed} event(s)");
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl+C received, disconnecting…");
                break;
            }
        }
    }

    // ── Cleanup ─────────────────────────────────────────────────────
    client.realtime().disconnect().await?;
    tracing::info!("Goodbye!");
    Ok(())
}
