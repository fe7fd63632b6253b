use serde::{Deserialize, Serialize};

/// Sentinel rep identifier for parts with no assigned sales representative.
pub const HOUSE_ACCOUNT: &str = "House or No Rep Found";

/// Address that receives notifications for reps with no registered email
/// (and, by way of the house sentinel, for house-account lots).
pub const FALLBACK_EMAIL: &str = "it@busseinc.com";

/// A work-queue item announcing a newly arrived release report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Report year, e.g. "2024"
    pub year: String,
    /// Workbook file name, e.g. "E12345.xls"
    pub file_name: String,
}

impl Job {
    /// Derive the purchase-order key this job refers to: the file name with
    /// any `.xls` suffix stripped (case-insensitive), uppercased.
    ///
    /// This key addresses the dedup marker, so it must be stable across the
    /// queue and manual processing paths.
    pub fn purchase_order(&self) -> String {
        let name = self.file_name.trim();
        let stripped = if name.to_ascii_lowercase().ends_with(".xls") {
            &name[..name.len() - 4]
        } else {
            name
        };
        stripped.to_ascii_uppercase()
    }
}

/// One physical lot line parsed from a release report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotRecord {
    pub lot: String,
    pub part: String,
    pub mfg_qty: String,
    pub qty: String,
    pub status: String,
    pub note: String,
}

/// Per-report header fields, merged into every lot of that report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportHeader {
    /// Purchase order number as printed on the report
    pub po: String,
    /// Release date formatted as a long date, e.g. "January 02, 2024"
    pub date: String,
}

/// A lot joined with its report header and resolved rep, ready for delivery.
///
/// Serialized flat as the `template_params` of the outbound email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotNotification {
    pub lot: String,
    pub part: String,
    pub mfg_qty: String,
    pub qty: String,
    pub status: String,
    pub note: String,
    pub po: String,
    pub date: String,
    pub sales_rep: String,
    pub sales_rep_email: String,
}

impl LotNotification {
    /// Join a parsed lot with its report header and resolved rep.
    /// The lot identifier is trimmed here; reports pad it with whitespace.
    pub fn assemble(
        lot: &LotRecord,
        header: &ReportHeader,
        sales_rep: String,
        sales_rep_email: String,
    ) -> Self {
        Self {
            lot: lot.lot.trim().to_string(),
            part: lot.part.clone(),
            mfg_qty: lot.mfg_qty.clone(),
            qty: lot.qty.clone(),
            status: lot.status.clone(),
            note: lot.note.clone(),
            po: header.po.clone(),
            date: header.date.clone(),
            sales_rep,
            sales_rep_email,
        }
    }

    /// Whether this lot resolved to the house-account sentinel and needs
    /// manual review.
    pub fn needs_review(&self) -> bool {
        self.sales_rep == HOUSE_ACCOUNT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(file_name: &str) -> Job {
        Job {
            year: "2024".to_string(),
            file_name: file_name.to_string(),
        }
    }

    #[test]
    fn test_purchase_order_strips_xls_suffix() {
        assert_eq!(job("E12345.xls").purchase_order(), "E12345");
        assert_eq!(job("E12345.XLS").purchase_order(), "E12345");
    }

    #[test]
    fn test_purchase_order_without_suffix() {
        assert_eq!(job("E12345").purchase_order(), "E12345");
    }

    #[test]
    fn test_purchase_order_case_normalized() {
        assert_eq!(job("e12345.xls").purchase_order(), "E12345");
    }

    #[test]
    fn test_assemble_trims_lot_and_merges_header() {
        let lot = LotRecord {
            lot: "  123456 ".to_string(),
            part: "549".to_string(),
            mfg_qty: "1000".to_string(),
            qty: "1000".to_string(),
            status: "Released".to_string(),
            note: "".to_string(),
        };
        let header = ReportHeader {
            po: "E12345".to_string(),
            date: "January 02, 2024".to_string(),
        };
        let n = LotNotification::assemble(
            &lot,
            &header,
            "Northeast".to_string(),
            "ne@busseinc.com".to_string(),
        );
        assert_eq!(n.lot, "123456");
        assert_eq!(n.po, "E12345");
        assert_eq!(n.date, "January 02, 2024");
        assert!(!n.needs_review());
    }

    #[test]
    fn test_needs_review_house_sentinel() {
        let lot = LotRecord {
            lot: "1".to_string(),
            part: "549".to_string(),
            mfg_qty: String::new(),
            qty: String::new(),
            status: String::new(),
            note: String::new(),
        };
        let header = ReportHeader {
            po: "E1".to_string(),
            date: "May 01, 2024".to_string(),
        };
        let n = LotNotification::assemble(
            &lot,
            &header,
            HOUSE_ACCOUNT.to_string(),
            FALLBACK_EMAIL.to_string(),
        );
        assert!(n.needs_review());
    }
}
