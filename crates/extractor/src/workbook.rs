//! Release-report workbook parsing.
//!
//! QC writes one `.xls` workbook per purchase order under
//! `<base>/<year> Database/Release Reports <year>/<PO>.xls`. The release sheet
//! carries a banner block (PO number + release date) above a lot table. Both
//! are read from the same worksheet:
//!
//! 1. The lot table is located by its `Lot Number` header row; rows with no
//!    catalog number and the trailing `Comments:` row are discarded.
//! 2. The banner is the first row with a date-formatted cell in the release
//!    date column; the date is rendered as a long date for the email body.

use std::path::Path;

use calamine::{Data, DataType, Range, Reader, open_workbook_auto};

use lis_common::error::PipelineError;
use lis_common::types::{LotRecord, ReportHeader};

/// Worksheet holding the release data. The QC template has carried this name
/// unchanged since 2003.
const RELEASE_SHEET: &str = "10-08-03 (2)";

/// Banner column holding the purchase order number.
const BANNER_PO_COL: usize = 2;

/// Banner column holding the release date.
const BANNER_DATE_COL: usize = 7;

/// Lot-table columns, keyed by their (trimmed) header labels.
const LOT_COLUMNS: [&str; 6] = [
    "Lot Number",
    "Catalog Number",
    "Mfg. Quantity",
    "Quantity",
    "Disposition",
    "Warehouse Locations",
];

/// Locate and parse the release report for one purchase order.
///
/// Returns the lot rows plus the per-report header. Any missing piece —
/// directory, file, worksheet, banner — is an extract error; extraction is
/// reported, never retried.
pub fn extract(
    base_dir: &Path,
    year: &str,
    purchase_order: &str,
) -> Result<(Vec<LotRecord>, ReportHeader), PipelineError> {
    let dir = base_dir
        .join(format!("{year} Database"))
        .join(format!("Release Reports {year}"));

    if !dir.is_dir() {
        return Err(PipelineError::Extract(format!(
            "report directory not found: {}",
            dir.display()
        )));
    }

    let path = dir.join(format!("{purchase_order}.xls"));
    if !path.is_file() {
        return Err(PipelineError::Extract(format!(
            "report not found: {}",
            path.display()
        )));
    }

    let mut workbook = open_workbook_auto(&path)
        .map_err(|e| PipelineError::Extract(format!("cannot open {}: {e}", path.display())))?;

    let range = workbook.worksheet_range(RELEASE_SHEET).map_err(|e| {
        PipelineError::Extract(format!(
            "worksheet {RELEASE_SHEET:?} missing in {}: {e}",
            path.display()
        ))
    })?;

    let lots = parse_lots(&range)?;
    let header = parse_header(&range)?;

    tracing::debug!(
        po = %header.po,
        date = %header.date,
        lots = lots.len(),
        "Parsed release report"
    );

    Ok((lots, header))
}

/// Parse the lot table: find the header row, map column labels to indices,
/// then read every data row below it.
fn parse_lots(range: &Range<Data>) -> Result<Vec<LotRecord>, PipelineError> {
    let rows: Vec<&[Data]> = range.rows().collect();

    let header_idx = rows
        .iter()
        .position(|row| row.iter().any(|c| cell_text(c).trim() == "Lot Number"))
        .ok_or_else(|| PipelineError::Extract("lot table header row not found".to_string()))?;

    let mut columns = [0usize; LOT_COLUMNS.len()];
    for (i, label) in LOT_COLUMNS.iter().enumerate() {
        columns[i] = rows[header_idx]
            .iter()
            .position(|c| cell_text(c).trim() == *label)
            .ok_or_else(|| {
                PipelineError::Extract(format!("lot table column {label:?} not found"))
            })?;
    }
    let [lot_col, part_col, mfg_qty_col, qty_col, status_col, note_col] = columns;

    let mut lots = Vec::new();
    for row in &rows[header_idx + 1..] {
        let part = cell_at(row, part_col);
        if part.is_empty() {
            continue;
        }

        let lot = cell_at(row, lot_col);
        if lot.trim() == "Comments:" {
            continue;
        }

        lots.push(LotRecord {
            lot,
            part,
            mfg_qty: cell_at(row, mfg_qty_col),
            qty: cell_at(row, qty_col),
            status: cell_at(row, status_col),
            note: cell_at(row, note_col),
        });
    }

    Ok(lots)
}

/// Parse the banner block: the first row whose release-date column holds a
/// date-formatted cell supplies both the PO number and the release date.
fn parse_header(range: &Range<Data>) -> Result<ReportHeader, PipelineError> {
    let start_col = range.start().map(|(_, c)| c as usize).unwrap_or(0);

    for row in range.rows() {
        let date_cell = match BANNER_DATE_COL.checked_sub(start_col).and_then(|i| row.get(i)) {
            Some(c) => c,
            None => continue,
        };

        // Only accept cells Excel itself formatted as dates. Plain floats in
        // this column are table data, not the release date.
        let date = match date_cell {
            Data::DateTime(_) | Data::DateTimeIso(_) => date_cell.as_datetime(),
            _ => None,
        };

        if let Some(date) = date {
            let po = BANNER_PO_COL
                .checked_sub(start_col)
                .and_then(|i| row.get(i))
                .map(cell_text)
                .unwrap_or_default();

            return Ok(ReportHeader {
                po: po.trim().to_string(),
                date: date.format("%B %d, %Y").to_string(),
            });
        }
    }

    Err(PipelineError::Extract(
        "release date not found in report banner".to_string(),
    ))
}

/// Cell at `idx`, rendered as display text; missing and empty cells read as "".
fn cell_at(row: &[Data], idx: usize) -> String {
    row.get(idx).map(cell_text).unwrap_or_default()
}

/// Render a cell the way it prints: whole floats without the trailing `.0`
/// (lot and catalog numbers come back from Excel as floats).
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}
