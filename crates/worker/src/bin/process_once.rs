//! Process a single release report, bypassing the queue and dedup markers.
//!
//! The manual path for re-sending or previewing one purchase order. Runs the
//! same extract → classify → notify pipeline as the worker, then prints both
//! buckets.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin process-once -- 2024 E12345
//!
//! # Classify only, send nothing
//! cargo run --bin process-once -- 2024 E12345 --dry-run
//! ```

use std::path::Path;

use lis_common::config::AppConfig;
use lis_common::db;
use lis_common::types::Job;
use lis_engine::directory::DirectoryClient;
use lis_engine::pipeline::ReleasePipeline;
use lis_notifier::EmailSender;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "process_once=info,lis_engine=info".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let usage = "usage: process-once <year> <purchase order> [--dry-run]";
    let year = args.next().ok_or_else(|| anyhow::anyhow!(usage))?;
    let po_arg = args.next().ok_or_else(|| anyhow::anyhow!(usage))?;
    let dry_run = args.next().as_deref() == Some("--dry-run");

    // Accept either a bare PO or the workbook file name
    let po = Job {
        year: year.clone(),
        file_name: po_arg,
    }
    .purchase_order();

    let config = AppConfig::from_env()?;

    let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;
    let directory = DirectoryClient::load(pool).await?;
    let sender = EmailSender::new(config.emailjs.clone());
    let mut pipeline =
        ReleasePipeline::new(directory, sender, dry_run || config.notify_dry_run);

    let (lots, header) =
        lis_extractor::extract(Path::new(&config.report_base_dir), &year, &po)?;
    let outcome = pipeline.process(&lots, &header).await?;

    println!("PO {} released {}", header.po, header.date);
    println!("Emailed ({}):", outcome.emailed.len());
    for lot in &outcome.emailed {
        println!(
            "  {} {} -> {} <{}>",
            lot.lot, lot.part, lot.sales_rep, lot.sales_rep_email
        );
    }
    if !outcome.review.is_empty() {
        println!("Needs review ({}):", outcome.review.len());
        for lot in &outcome.review {
            println!("  {} {}", lot.lot, lot.part);
        }
    }

    Ok(())
}
