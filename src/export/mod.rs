pub mod csv;
pub mod excel;

use crate::cli::ExportFormat;
use crate::error::Result;
use crate::matcher::batch::MatchRecord;
use std::path::Path;

/// Column order of the exported result table.
pub const RESULT_COLUMNS: [&str; 10] = [
    "OCR Name",
    "OCR Address",
    "Matched Name",
    "Matched Address",
    "Date",
    "Match Score",
    "Valid",
    "Page Number",
    "Row Number",
    "Filename",
];

fn output_path_for_format(output: &Path, title: &str, extension: &str) -> std::path::PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", title, extension))
    } else {
        // the requested format wins over a mismatched file extension
        output.with_extension(extension)
    }
}

fn output_paths_for_both(output: &Path, title: &str) -> (std::path::PathBuf, std::path::PathBuf) {
    if output.is_dir() || output.extension().is_none() {
        let csv_path = output.join(format!("{}.csv", title));
        let xlsx_path = output.join(format!("{}.xlsx", title));
        (csv_path, xlsx_path)
    } else {
        let parent = output.parent().unwrap_or_else(|| Path::new("."));
        let stem = output
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(title);
        let csv_path = parent.join(format!("{}.csv", stem));
        let xlsx_path = parent.join(format!("{}.xlsx", stem));
        (csv_path, xlsx_path)
    }
}

pub fn export_results(
    results: &[MatchRecord],
    format: &ExportFormat,
    output: &Path,
    title: &str,
) -> Result<()> {
    match format {
        ExportFormat::Csv => {
            let output_path = output_path_for_format(output, title, "csv");
            csv::write_results(results, &output_path)?;
            println!("✔ CSV written: {}", output_path.display());
        }
        ExportFormat::Xlsx => {
            let output_path = output_path_for_format(output, title, "xlsx");
            excel::write_results(results, &output_path)?;
            println!("✔ Excel written: {}", output_path.display());
        }
        ExportFormat::Both => {
            let (csv_path, xlsx_path) = output_paths_for_both(output, title);

            csv::write_results(results, &csv_path)?;
            println!("✔ CSV written: {}", csv_path.display());

            excel::write_results(results, &xlsx_path)?;
            println!("✔ Excel written: {}", xlsx_path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_output_extension_follows_format() {
        assert_eq!(
            output_path_for_format(Path::new("results.csv"), "verified", "xlsx"),
            PathBuf::from("results.xlsx")
        );
        assert_eq!(
            output_path_for_format(Path::new("results.csv"), "verified", "csv"),
            PathBuf::from("results.csv")
        );
    }

    #[test]
    fn test_output_directory_gets_title() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            output_path_for_format(dir.path(), "verified", "csv"),
            dir.path().join("verified.csv")
        );
    }

    #[test]
    fn test_output_paths_for_both_share_stem() {
        let (csv_path, xlsx_path) = output_paths_for_both(Path::new("out/results.csv"), "verified");
        assert_eq!(csv_path, PathBuf::from("out/results.csv"));
        assert_eq!(xlsx_path, PathBuf::from("out/results.xlsx"));
    }
}
