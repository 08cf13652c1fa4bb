//! Excel result table output

use super::RESULT_COLUMNS;
use crate::error::{BallotError, Result};
use crate::matcher::batch::MatchRecord;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::path::Path;

pub fn write_results(results: &[MatchRecord], path: &Path) -> Result<()> {
    build_workbook(results)
        .and_then(|mut workbook| workbook.save(path))
        .map_err(|e| BallotError::Export(format!("Excel write error: {}", e)))
}

fn build_workbook(results: &[MatchRecord]) -> std::result::Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Verified Signatures")?;

    let header_format = Format::new().set_bold();
    for (col, name) in RESULT_COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header_format)?;
    }

    let score_format = Format::new().set_num_format("0.00");
    for (idx, record) in results.iter().enumerate() {
        let row = idx as u32 + 1;
        worksheet.write_string(row, 0, &record.ocr_name)?;
        worksheet.write_string(row, 1, &record.ocr_address)?;
        worksheet.write_string(row, 2, &record.matched_name)?;
        worksheet.write_string(row, 3, &record.matched_address)?;
        worksheet.write_string(row, 4, &record.date)?;
        worksheet.write_number_with_format(row, 5, record.match_score, &score_format)?;
        worksheet.write_boolean(row, 6, record.valid)?;
        worksheet.write_number(row, 7, record.page_number as f64)?;
        worksheet.write_number(row, 8, record.row_number as f64)?;
        worksheet.write_string(row, 9, &record.filename)?;
    }

    worksheet.autofit();
    Ok(workbook)
}
