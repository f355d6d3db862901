use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studydesk::api::router;
use studydesk::config::AppConfig;
use studydesk::db::{self, Store};
use studydesk::gemini::{GeminiHttpClient, TextGenerator, UnconfiguredGenerator};
use studydesk::notify::{LogNotifier, Notifier, WebhookNotifier};
use studydesk::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "studydesk=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;

    let pool = db::connect(&config.database_url).await?;
    let store = Arc::new(Store::new(pool));
    store.backfill_importance().await?;

    let notifier: Arc<dyn Notifier> = match config.notify_webhook_url.clone() {
        Some(url) => {
            info!("Reminders will be posted to {}", url);
            Arc::new(WebhookNotifier::new(url)?)
        }
        None => Arc::new(LogNotifier),
    };

    let generator: Arc<dyn TextGenerator> = match config.gemini.clone() {
        Some(gemini) => Arc::new(GeminiHttpClient::new(gemini)?),
        None => {
            info!("GEMINI_API_KEY not set; study plans will report the fallback message");
            Arc::new(UnconfiguredGenerator)
        }
    };

    let state = AppState::new(store, notifier, generator, config.reminder_interval_secs);
    tokio::spawn(state.reminders.clone().start());

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
