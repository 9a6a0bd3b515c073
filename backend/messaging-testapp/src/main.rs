use anyhow::Context;
use messaging_testapp::{Config, SignalEventPump, TestApp, TracingSink};
use nova_messaging_shared::{LoopbackMessaging, MessagingModule, PlatformContext};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,messaging_testapp=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.log.json);

    tracing::info!(
        topic = %config.messaging.topic,
        project_id = %config.app.project_id,
        "Starting messaging test application"
    );

    let loopback = config
        .loopback_config()
        .context("Failed to configure loopback messaging")?;
    let module: Arc<dyn MessagingModule> = Arc::new(LoopbackMessaging::new(loopback));

    let mut app = TestApp::new(
        config.runner_settings(),
        module,
        SignalEventPump::install(),
        Arc::new(TracingSink),
        PlatformContext::none(),
    );

    let outcome = app.run().await;
    tracing::info!(outcome = ?outcome, "Messaging test application stopped");

    let code = outcome.exit_code();
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
