//! Delimited result table output
//!
//! Scores are written with two-decimal precision for display; validity is
//! re-derivable from the stored score, which is what `revalidate` relies
//! on.

use super::RESULT_COLUMNS;
use crate::error::{BallotError, Result};
use crate::matcher::batch::MatchRecord;
use std::path::Path;

pub fn write_results(results: &[MatchRecord], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(RESULT_COLUMNS)?;

    for row in results {
        let record = [
            row.ocr_name.clone(),
            row.ocr_address.clone(),
            row.matched_name.clone(),
            row.matched_address.clone(),
            row.date.clone(),
            format!("{:.2}", row.match_score),
            row.valid.to_string(),
            row.page_number.to_string(),
            row.row_number.to_string(),
            row.filename.clone(),
        ];
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Read a previously exported result table back, e.g. to re-derive
/// validity under a new threshold without reprocessing.
pub fn read_results(path: &Path) -> Result<Vec<MatchRecord>> {
    if !path.exists() {
        return Err(BallotError::FileNotFound(path.display().to_string()));
    }

    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let position = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| BallotError::Schema(name.to_string()))
    };
    let columns: Vec<usize> = RESULT_COLUMNS
        .iter()
        .map(|name| position(name))
        .collect::<Result<_>>()?;

    let field = |row: &csv::StringRecord, idx: usize| -> String {
        row.get(columns[idx]).unwrap_or("").to_string()
    };

    let mut results = Vec::new();
    for row in reader.records() {
        let row = row?;
        let score_text = field(&row, 5);
        let match_score: f64 = score_text.parse().map_err(|_| {
            BallotError::InvalidEntry(format!("unparsable match score: {}", score_text))
        })?;

        results.push(MatchRecord {
            ocr_name: field(&row, 0),
            ocr_address: field(&row, 1),
            matched_name: field(&row, 2),
            matched_address: field(&row, 3),
            date: field(&row, 4),
            match_score,
            valid: field(&row, 6).eq_ignore_ascii_case("true"),
            page_number: field(&row, 7).parse().unwrap_or(0),
            row_number: field(&row, 8).parse().unwrap_or(0),
            filename: field(&row, 9),
            ..Default::default()
        });
    }

    Ok(results)
}
