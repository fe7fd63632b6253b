use redis::Client;
use redis::aio::ConnectionManager;

/// Connect the queue/dedup store and verify it is reachable.
///
/// The worker fails fast: an unreachable store at startup aborts the process
/// before the consumer loop starts.
pub async fn create_redis_pool(redis_url: &str) -> anyhow::Result<ConnectionManager> {
    let client = Client::open(redis_url)?;
    let mut manager = ConnectionManager::new(client).await?;

    redis::cmd("PING")
        .query_async::<String>(&mut manager)
        .await?;

    tracing::info!("Connected to Redis");
    Ok(manager)
}
