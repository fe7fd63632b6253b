use tokio::sync::watch;

use lis_common::config::AppConfig;
use lis_common::{db, redis_pool};
use lis_engine::directory::DirectoryClient;
use lis_engine::pipeline::ReleasePipeline;
use lis_notifier::EmailSender;
use lis_worker::consumer::QueueConsumer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lis_worker=info,lis_engine=info,lis_notifier=info".into()),
        )
        .json()
        .init();

    tracing::info!("LIS notifier worker starting...");

    // Load configuration — any missing required option aborts before the
    // loop starts
    let config = AppConfig::from_env()?;

    // Connect to the rep/kit directory
    let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;

    // Run migrations
    sqlx::migrate!("../../migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    // Snapshot the rep directory and connect the queue/dedup store
    let directory = DirectoryClient::load(pool).await?;
    let redis = redis_pool::create_redis_pool(&config.redis_url).await?;

    let sender = EmailSender::new(config.emailjs.clone());
    let pipeline = ReleasePipeline::new(directory, sender, config.notify_dry_run);

    let mut consumer = QueueConsumer::new(
        redis,
        config.queue_name.clone(),
        config.report_base_dir.clone().into(),
        pipeline,
    );

    // Flip the shutdown flag on SIGINT/SIGTERM; the consumer finishes its
    // current job, then exits the loop.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Received shutdown signal, stopping gracefully...");
        let _ = shutdown_tx.send(true);
    });

    consumer.run(shutdown_rx).await?;

    tracing::info!("LIS notifier worker stopped.");
    Ok(())
}

/// Resolve on the first SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Cannot install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
