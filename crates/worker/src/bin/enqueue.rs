//! Push one new-file job onto the work queue.
//!
//! Stand-in for the QC share watcher: announces a release-report workbook to
//! any listening worker.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin enqueue -- 2024 E12345.xls
//! ```

use lis_common::config::AppConfig;
use lis_common::redis_pool;
use lis_common::types::Job;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "enqueue=info".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let usage = "usage: enqueue <year> <file name>";
    let year = args.next().ok_or_else(|| anyhow::anyhow!(usage))?;
    let file_name = args.next().ok_or_else(|| anyhow::anyhow!(usage))?;

    let config = AppConfig::from_env()?;
    let mut redis = redis_pool::create_redis_pool(&config.redis_url).await?;

    let job = Job { year, file_name };
    let payload = serde_json::to_string(&job)?;

    let depth: i64 = redis::cmd("RPUSH")
        .arg(&config.queue_name)
        .arg(&payload)
        .query_async(&mut redis)
        .await?;

    println!(
        "Enqueued {} ({}) — queue depth {}",
        job.purchase_order(),
        job.year,
        depth
    );

    Ok(())
}
