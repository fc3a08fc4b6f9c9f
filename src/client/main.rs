/**
 * feedsync Client Entry Point
 *
 * A line-oriented viewer: prints the feed, submits every line typed on stdin
 * as a message, and prints messages from other viewers as they arrive.
 *
 * Commands: `/resync` reloads the feed, `/quit` exits.
 */
use feedsync::client::config::Config;
use feedsync::client::transport::HttpGateway;
use feedsync::client::{CacheMutation, ClientSyncEngine, ViewerSession};
use feedsync::shared::Message;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let identity = Arc::new(config.identity());
    if config.author().is_none() {
        eprintln!("FEED_IDENTITY_KEY not set; the feed is read-only");
    }

    let http = Arc::new(HttpGateway::new(config.app())?);
    let mut session = ViewerSession::connect_http(http, identity, config.app()).await?;
    eprintln!("Connected to {}", config.server_url());

    let deliveries = session.engine().watch_mutations().await;
    let feed = session.engine().messages().await;
    for message in feed.iter().rev() {
        print_message(message);
    }

    let watcher = tokio::spawn(watch_deliveries(session.engine().clone(), deliveries));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => continue,
            "/quit" => break,
            "/resync" => match session.engine().resync().await {
                Ok(()) => {
                    for message in session.engine().messages().await.iter().rev() {
                        print_message(message);
                    }
                }
                Err(e) => eprintln!("resync failed: {}", e),
            },
            _ => match session.engine().submit(&line).await {
                Ok(message) => print_message(&message),
                Err(e) => eprintln!("not sent: {}", e),
            },
        }
    }

    watcher.abort();
    session.teardown().await;
    Ok(())
}

/// Print messages merged from the subscription as they land
async fn watch_deliveries(engine: Arc<ClientSyncEngine>, mut mutations: broadcast::Receiver<CacheMutation>) {
    loop {
        match mutations.recv().await {
            Ok(CacheMutation::Inserted { id, provisional: false }) => {
                if let Some(message) = engine.message(&id).await {
                    print_message(&message);
                }
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!("[Sync] Display fell behind by {} changes", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}

fn print_message(message: &Message) {
    let time = chrono::DateTime::from_timestamp_millis(message.created_at)
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| message.created_at.to_string());
    println!("[{}] {}: {}", time, message.author.display_name, message.text);
}
