//! Queue round-trip test: what `enqueue` pushes, the consumer can decode.
//!
//! Requires Redis (`REDIS_URL`, default localhost). Run with:
//!
//! ```bash
//! cargo test -p lis-worker --test queue -- --ignored --nocapture
//! ```

use lis_common::types::Job;

const TEST_QUEUE: &str = "itest:queue:new_files";

async fn redis_conn() -> redis::aio::ConnectionManager {
    let url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    lis_common::redis_pool::create_redis_pool(&url).await.unwrap()
}

#[tokio::test]
#[ignore]
async fn test_job_round_trip_through_queue() {
    let mut redis = redis_conn().await;

    redis::cmd("DEL")
        .arg(TEST_QUEUE)
        .query_async::<()>(&mut redis)
        .await
        .unwrap();

    let job = Job {
        year: "2024".to_string(),
        file_name: "E12345.xls".to_string(),
    };
    let payload = serde_json::to_string(&job).unwrap();

    redis::cmd("RPUSH")
        .arg(TEST_QUEUE)
        .arg(&payload)
        .query_async::<i64>(&mut redis)
        .await
        .unwrap();

    // Short timeout so a broken push fails the test instead of hanging it.
    let (_queue, popped): (String, String) = redis::cmd("BLPOP")
        .arg(TEST_QUEUE)
        .arg(1)
        .query_async(&mut redis)
        .await
        .unwrap();

    let decoded: Job = serde_json::from_str(&popped).unwrap();
    assert_eq!(decoded.year, "2024");
    assert_eq!(decoded.purchase_order(), "E12345");
}

#[tokio::test]
#[ignore]
async fn test_queue_preserves_fifo_order() {
    let mut redis = redis_conn().await;
    let queue = "itest:queue:fifo";

    redis::cmd("DEL")
        .arg(queue)
        .query_async::<()>(&mut redis)
        .await
        .unwrap();

    for po in ["E1.xls", "E2.xls", "E3.xls"] {
        let payload = serde_json::to_string(&Job {
            year: "2024".to_string(),
            file_name: po.to_string(),
        })
        .unwrap();
        redis::cmd("RPUSH")
            .arg(queue)
            .arg(&payload)
            .query_async::<i64>(&mut redis)
            .await
            .unwrap();
    }

    for expected in ["E1", "E2", "E3"] {
        let (_q, popped): (String, String) = redis::cmd("BLPOP")
            .arg(queue)
            .arg(1)
            .query_async(&mut redis)
            .await
            .unwrap();
        let job: Job = serde_json::from_str(&popped).unwrap();
        assert_eq!(job.purchase_order(), expected);
    }
}
