//! Rep/kit directory client with a per-run lookup cache.
//!
//! The directory lives in two read-only tables: `kit_aliases` maps a base kit
//! code to the responsible rep, `sales_reps` maps a rep to their registered
//! email. Kit resolutions are memoized in an explicit map owned by the client;
//! there is no invalidation path — the directory is static for the life of a
//! run, and a restart picks up any changes.

use std::collections::HashMap;

use sqlx::PgPool;

use lis_common::error::PipelineError;
use lis_common::types::{FALLBACK_EMAIL, HOUSE_ACCOUNT};

/// Character opening a kit revision suffix ("689R2" is revision 2 of kit 689).
const REVISION_MARKER: char = 'R';

/// Directory client backed by PostgreSQL.
pub struct DirectoryClient {
    pool: PgPool,
    /// rep territory → registered email, snapshotted at startup.
    rep_emails: HashMap<String, String>,
    /// normalized kit → resolved rep, filled lazily.
    kit_cache: HashMap<String, String>,
    /// Directory round-trips issued since startup.
    lookups: u64,
}

impl DirectoryClient {
    /// Connect the client and snapshot the rep email table.
    ///
    /// An unreachable directory here is a fatal startup error by policy;
    /// callers abort rather than start a worker that cannot resolve reps.
    pub async fn load(pool: PgPool) -> Result<Self, PipelineError> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT territory_name, email FROM sales_reps")
                .fetch_all(&pool)
                .await?;

        tracing::info!(reps = rows.len(), "Loaded sales rep directory");

        Ok(Self {
            pool,
            rep_emails: rows.into_iter().collect(),
            kit_cache: HashMap::new(),
            lookups: 0,
        })
    }

    /// Resolve the rep responsible for a kit.
    ///
    /// The kit is normalized (revision suffix stripped) before lookup, and
    /// each distinct normalized kit hits the directory at most once per
    /// process lifetime. An unknown alias resolves to the house-account
    /// sentinel rather than an error.
    pub async fn resolve(&mut self, kit: &str) -> Result<String, PipelineError> {
        let key = normalize_kit(kit);

        if let Some(rep) = self.kit_cache.get(key) {
            return Ok(rep.clone());
        }

        self.lookups += 1;
        let row: Option<(String,)> = sqlx::query_as("SELECT rep FROM kit_aliases WHERE alias = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        let rep = match row {
            Some((rep,)) => rep,
            None => {
                tracing::debug!(kit = key, "No rep for kit, using house account");
                HOUSE_ACCOUNT.to_string()
            }
        };

        self.kit_cache.insert(key.to_string(), rep.clone());
        Ok(rep)
    }

    /// Registered email for a rep, or the IT fallback when none is on file.
    /// The house-account sentinel has no directory entry, so house lots land
    /// on the fallback address too.
    pub fn email_for(&self, rep: &str) -> String {
        self.rep_emails
            .get(rep)
            .cloned()
            .unwrap_or_else(|| FALLBACK_EMAIL.to_string())
    }

    /// Number of directory queries issued so far.
    pub fn directory_lookups(&self) -> u64 {
        self.lookups
    }
}

/// Truncate a kit code at its revision marker: every revision of a kit is
/// owned by the same rep, so lookups key on the base code.
pub fn normalize_kit(kit: &str) -> &str {
    match kit.find(REVISION_MARKER) {
        Some(idx) => &kit[..idx],
        None => kit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_revision_suffix() {
        assert_eq!(normalize_kit("689R2"), "689");
        assert_eq!(normalize_kit("689R"), "689");
    }

    #[test]
    fn test_normalize_passes_through_plain_kits() {
        assert_eq!(normalize_kit("689"), "689");
        assert_eq!(normalize_kit(""), "");
    }

    #[test]
    fn test_normalize_truncates_at_first_marker() {
        assert_eq!(normalize_kit("689R2R3"), "689");
    }
}
