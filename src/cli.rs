use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ballot-verify")]
#[command(about = "Petition signature OCR and voter roll cross-check", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run OCR over a folder of petition page images and write the
    /// extracted entries as JSON
    Extract {
        /// Folder of pre-rendered page images (sorted name = page order)
        #[arg(required = true)]
        pages: PathBuf,

        /// Output JSON file (default: <pages>/ocr_entries.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Source document name recorded in the Filename column
        #[arg(long)]
        source: Option<String>,

        /// OCR provider command (overrides config)
        #[arg(long)]
        ocr_command: Option<String>,

        /// Reuse cached provider responses for unchanged pages
        #[arg(long)]
        use_cache: bool,
    },

    /// Match extracted OCR entries against a voter roll and export the
    /// result table
    Match {
        /// OCR entries JSON (from `extract`)
        #[arg(required = true)]
        entries: PathBuf,

        /// Voter roll CSV
        #[arg(required = true)]
        roll: PathBuf,

        /// Output file or directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (csv/xlsx/both)
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,

        /// Acceptance threshold 0-100 (overrides config)
        #[arg(short, long)]
        threshold: Option<f64>,
    },

    /// Extract and match in one pass
    Run {
        /// Folder of pre-rendered page images
        #[arg(required = true)]
        pages: PathBuf,

        /// Voter roll CSV
        #[arg(required = true)]
        roll: PathBuf,

        /// Output file or directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (csv/xlsx/both)
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,

        /// Acceptance threshold 0-100 (overrides config)
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Source document name recorded in the Filename column
        #[arg(long)]
        source: Option<String>,

        /// OCR provider command (overrides config)
        #[arg(long)]
        ocr_command: Option<String>,

        /// Reuse cached provider responses for unchanged pages
        #[arg(long)]
        use_cache: bool,
    },

    /// Re-derive the Valid column of an exported result table under a
    /// new threshold, without re-running OCR or matching
    Revalidate {
        /// Previously exported result CSV
        #[arg(required = true)]
        results: PathBuf,

        /// New acceptance threshold 0-100
        #[arg(short, long)]
        threshold: f64,

        /// Output file (default: overwrite in place)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show or edit settings
    Config {
        /// Set the acceptance threshold
        #[arg(long)]
        set_threshold: Option<f64>,

        /// Set the OCR provider command
        #[arg(long)]
        set_ocr_command: Option<String>,

        /// Show current settings
        #[arg(long)]
        show: bool,
    },

    /// Manage the OCR response cache
    Cache {
        /// Delete the cache
        #[arg(long)]
        clear: bool,

        /// Target folder (default: current directory)
        #[arg(short, long)]
        folder: Option<PathBuf>,

        /// Show cache info
        #[arg(long)]
        info: bool,
    },
}

#[derive(Clone, Debug, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
    Both,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "both" => Ok(ExportFormat::Both),
            _ => Err(format!("Unknown format: {}. Use csv, xlsx, or both", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Xlsx => write!(f, "xlsx"),
            ExportFormat::Both => write!(f, "both"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_format_from_str() {
        assert!(matches!("csv".parse::<ExportFormat>(), Ok(ExportFormat::Csv)));
        assert!(matches!("EXCEL".parse::<ExportFormat>(), Ok(ExportFormat::Xlsx)));
        assert!(matches!("both".parse::<ExportFormat>(), Ok(ExportFormat::Both)));
        assert!("pdf".parse::<ExportFormat>().is_err());
    }
}
