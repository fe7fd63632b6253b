//! Durable purchase-order dedup markers.
//!
//! The work queue is at-least-once, so the same release report can arrive
//! more than once (and again after a worker restart). A marker in Redis is
//! claimed for each purchase order *before* processing begins; once set, that
//! PO is never processed again by any worker instance. The trade is explicit:
//! a crash mid-processing can lose that PO's notifications, never duplicate
//! them.
//!
//! Uses Redis `SET NX` for atomic set-if-absent across instances. Markers
//! carry no TTL — a purchase order is released exactly once, ever.

use redis::aio::ConnectionManager;

use lis_common::error::PipelineError;

/// Durable at-most-once guard keyed by purchase order.
pub struct DedupGuard;

impl DedupGuard {
    pub fn new() -> Self {
        Self
    }

    /// Atomically claim a purchase order for processing.
    ///
    /// Returns `true` if this call set the marker (first claim — proceed).
    /// Returns `false` if the marker already existed (duplicate — skip).
    pub async fn try_claim(
        &self,
        redis: &mut ConnectionManager,
        purchase_order: &str,
    ) -> Result<bool, PipelineError> {
        let key = Self::marker_key(purchase_order);

        // SET key "1" NX — Some("OK") when the key was set, None when it
        // already existed.
        let result: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg("1")
            .arg("NX")
            .query_async(redis)
            .await?;

        Ok(result.is_some())
    }

    /// Remove a marker. Operational escape hatch for re-releasing a PO;
    /// never called by the worker itself.
    pub async fn release(
        &self,
        redis: &mut ConnectionManager,
        purchase_order: &str,
    ) -> Result<(), PipelineError> {
        let key = Self::marker_key(purchase_order);
        redis::cmd("DEL").arg(&key).query_async::<()>(redis).await?;
        Ok(())
    }

    fn marker_key(purchase_order: &str) -> String {
        format!("po:notified:{purchase_order}")
    }
}

impl Default for DedupGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_key_is_po_scoped() {
        assert_eq!(DedupGuard::marker_key("E12345"), "po:notified:E12345");
    }
}
