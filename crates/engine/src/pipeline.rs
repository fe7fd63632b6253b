//! Release processing pipeline.
//!
//! Takes the parsed lots + header for one report and:
//! 1. Resolves each lot's rep through the directory (cached per run)
//! 2. Joins lot, header, and rep into a delivery-ready notification
//! 3. Classifies into the email bucket or the manual-review bucket
//! 4. Submits one notification per lot — both buckets — unless suppressed
//!
//! House-account lots are emailed to the fallback address *and* reported for
//! review; the review bucket flags them for a human, it does not mute them.

use lis_common::error::PipelineError;
use lis_common::types::{LotNotification, LotRecord, ReportHeader};
use lis_notifier::EmailSender;

use crate::directory::DirectoryClient;

/// Per-report processing result, returned for caller visibility.
#[derive(Debug, Default)]
pub struct ProcessOutcome {
    /// Lots with an assigned rep, emailed to that rep.
    pub emailed: Vec<LotNotification>,
    /// House-account lots needing manual review (also emailed, to the
    /// fallback address).
    pub review: Vec<LotNotification>,
}

/// Classifier + notifier for one worker process.
pub struct ReleasePipeline {
    directory: DirectoryClient,
    sender: EmailSender,
    /// When set, classify and report but send nothing.
    dry_run: bool,
}

impl ReleasePipeline {
    pub fn new(directory: DirectoryClient, sender: EmailSender, dry_run: bool) -> Self {
        Self {
            directory,
            sender,
            dry_run,
        }
    }

    /// Process every lot of one release report.
    ///
    /// Sends fan out strictly sequentially, email bucket first. A failed send
    /// aborts the remainder of the report — the queue consumer logs it and
    /// moves on; there is no retry.
    pub async fn process(
        &mut self,
        lots: &[LotRecord],
        header: &ReportHeader,
    ) -> Result<ProcessOutcome, PipelineError> {
        let mut resolved = Vec::with_capacity(lots.len());
        for lot in lots {
            let rep = self.directory.resolve(&lot.part).await?;
            let email = self.directory.email_for(&rep);
            resolved.push(LotNotification::assemble(lot, header, rep, email));
        }

        let outcome = partition(resolved);

        if !outcome.review.is_empty() {
            let parts: Vec<&str> = outcome.review.iter().map(|l| l.part.as_str()).collect();
            tracing::warn!(po = %header.po, parts = ?parts, "Lots routed for manual review");
        }

        if self.dry_run {
            tracing::info!(po = %header.po, "Dry run — suppressing sends");
        } else {
            for notification in outcome.emailed.iter().chain(outcome.review.iter()) {
                self.sender.send(notification).await?;
            }
        }

        tracing::info!(
            po = %header.po,
            date = %header.date,
            emailed = outcome.emailed.len(),
            review = outcome.review.len(),
            "Release report processed"
        );

        Ok(outcome)
    }
}

/// Split resolved notifications into the email and review buckets. Every lot
/// lands in exactly one bucket; review membership is exactly "resolved to the
/// house sentinel".
fn partition(notifications: Vec<LotNotification>) -> ProcessOutcome {
    let (review, emailed) = notifications
        .into_iter()
        .partition(LotNotification::needs_review);

    ProcessOutcome { emailed, review }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lis_common::types::{FALLBACK_EMAIL, HOUSE_ACCOUNT};

    fn notification(part: &str, rep: &str, email: &str) -> LotNotification {
        LotNotification {
            lot: "240101".to_string(),
            part: part.to_string(),
            mfg_qty: "1000".to_string(),
            qty: "1000".to_string(),
            status: "Released".to_string(),
            note: String::new(),
            po: "E12345".to_string(),
            date: "January 02, 2024".to_string(),
            sales_rep: rep.to_string(),
            sales_rep_email: email.to_string(),
        }
    }

    #[test]
    fn test_partition_every_lot_in_exactly_one_bucket() {
        let lots = vec![
            notification("549", "Northeast", "ne@busseinc.com"),
            notification("689", HOUSE_ACCOUNT, FALLBACK_EMAIL),
            notification("710", "Midwest", "mw@busseinc.com"),
        ];
        let outcome = partition(lots);

        assert_eq!(outcome.emailed.len() + outcome.review.len(), 3);
        assert_eq!(outcome.review.len(), 1);
        assert_eq!(outcome.review[0].part, "689");
    }

    #[test]
    fn test_partition_review_iff_house_sentinel() {
        let outcome = partition(vec![
            notification("549", "Northeast", "ne@busseinc.com"),
            notification("689", HOUSE_ACCOUNT, FALLBACK_EMAIL),
        ]);

        assert!(outcome.emailed.iter().all(|l| !l.needs_review()));
        assert!(outcome.review.iter().all(|l| l.needs_review()));
    }

    #[test]
    fn test_partition_empty_report() {
        let outcome = partition(Vec::new());
        assert!(outcome.emailed.is_empty());
        assert!(outcome.review.is_empty());
    }
}
