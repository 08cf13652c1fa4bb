use ballot_verify::{cli, config, error, export, matcher, ocr, roll, scanner};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use indicatif::{ProgressBar, ProgressStyle};
use matcher::batch::{self, MatchSummary};
use ocr::cache::CacheFile;
use ocr::provider::CliOcrProvider;
use ocr::OcrEntry;
use roll::VoterRoll;
use std::path::{Path, PathBuf};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Extract {
            pages,
            output,
            source,
            ocr_command,
            use_cache,
        } => {
            println!("🗳 ballot-verify - OCR extraction\n");

            let entries = run_extract(
                &pages,
                source.as_deref(),
                ocr_command,
                use_cache,
                &config,
                cli.verbose,
            )
            .await?;

            let output = output.unwrap_or_else(|| pages.join("ocr_entries.json"));
            let json = serde_json::to_string_pretty(&entries)?;
            std::fs::write(&output, json)?;
            println!("✔ {} entries written: {}", entries.len(), output.display());
        }

        Commands::Match {
            entries,
            roll,
            output,
            format,
            threshold,
        } => {
            println!("🗳 ballot-verify - voter roll cross-check\n");

            println!("[1/3] Loading OCR entries...");
            let content = std::fs::read_to_string(&entries)?;
            let ocr_entries: Vec<OcrEntry> = serde_json::from_str(&content)?;
            println!("✔ {} entries loaded\n", ocr_entries.len());

            println!("[2/3] Loading voter roll...");
            let voter_roll = VoterRoll::load_csv(&roll)?;
            println!("✔ {} voter records loaded\n", voter_roll.len());

            println!("[3/3] Matching...");
            let threshold = threshold.unwrap_or(config.threshold);
            let (results, summary) = run_match(&ocr_entries, &voter_roll, threshold, cli.verbose);

            let output_dir = output.unwrap_or_else(|| PathBuf::from("."));
            export::export_results(&results, &format, &output_dir, "verified_signatures")?;

            print_summary(&summary, threshold);
        }

        Commands::Run {
            pages,
            roll,
            output,
            format,
            threshold,
            source,
            ocr_command,
            use_cache,
        } => {
            println!("🗳 ballot-verify - full pipeline\n");

            println!("[1/3] OCR extraction...");
            let ocr_entries = run_extract(
                &pages,
                source.as_deref(),
                ocr_command,
                use_cache,
                &config,
                cli.verbose,
            )
            .await?;
            println!("✔ {} entries extracted\n", ocr_entries.len());

            println!("[2/3] Loading voter roll...");
            let voter_roll = VoterRoll::load_csv(&roll)?;
            println!("✔ {} voter records loaded\n", voter_roll.len());

            println!("[3/3] Matching...");
            let threshold = threshold.unwrap_or(config.threshold);
            let (results, summary) = run_match(&ocr_entries, &voter_roll, threshold, cli.verbose);

            let output_dir = output.unwrap_or_else(|| pages.clone());
            export::export_results(&results, &format, &output_dir, "verified_signatures")?;

            print_summary(&summary, threshold);
        }

        Commands::Revalidate {
            results,
            threshold,
            output,
        } => {
            println!("🗳 ballot-verify - revalidate\n");

            let mut rows = export::csv::read_results(&results)?;
            for row in &mut rows {
                row.revalidate(threshold);
            }

            let output = output.unwrap_or(results);
            export::csv::write_results(&rows, &output)?;
            println!("✔ results written: {}", output.display());

            let summary = MatchSummary::from_results(&rows, 0);
            print_summary(&summary, threshold);
        }

        Commands::Config {
            set_threshold,
            set_ocr_command,
            show,
        } => {
            let mut config = config;

            if let Some(threshold) = set_threshold {
                config.set_threshold(threshold)?;
                println!("✔ threshold set to {}", threshold);
            }

            if let Some(command) = set_ocr_command {
                config.set_ocr_command(command.clone())?;
                println!("✔ OCR command set to {}", command);
            }

            if show {
                println!("Settings:");
                println!("  threshold: {}", config.threshold);
                println!("  OCR command: {}", config.effective_ocr_command());
                println!("  timeout: {}s", config.timeout_seconds);
            }
        }

        Commands::Cache { clear, folder, info } => {
            let target = folder.unwrap_or_else(|| PathBuf::from("."));
            let cache_path = CacheFile::cache_path(&target);

            if info || !clear {
                if cache_path.exists() {
                    let cache = CacheFile::load(&target);
                    println!("Cache info:");
                    println!("  path: {}", cache_path.display());
                    println!("  pages: {}", cache.len());
                    if let Ok(meta) = std::fs::metadata(&cache_path) {
                        println!("  size: {} bytes", meta.len());
                    }
                } else {
                    println!("No cache file: {}", cache_path.display());
                }
            }

            if clear {
                match CacheFile::clear(&target) {
                    Ok(true) => println!("✔ cache deleted: {}", cache_path.display()),
                    Ok(false) => println!("No cache file to delete"),
                    Err(e) => println!("cache delete error: {}", e),
                }
            }
        }
    }

    Ok(())
}

async fn run_extract(
    pages_dir: &Path,
    source: Option<&str>,
    ocr_command: Option<String>,
    use_cache: bool,
    config: &Config,
    verbose: bool,
) -> Result<Vec<OcrEntry>> {
    let pages = scanner::scan_pages(pages_dir)?;
    if pages.is_empty() {
        return Err(error::BallotError::NoPagesFound(
            pages_dir.display().to_string(),
        ));
    }
    println!("  {} page image(s) found", pages.len());

    let command = ocr_command.unwrap_or_else(|| config.effective_ocr_command());
    let provider = CliOcrProvider::new(command, config.timeout_seconds);

    let source_name = source
        .map(str::to_string)
        .or_else(|| {
            pages_dir
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
        })
        .unwrap_or_else(|| "petition".to_string());

    let mut cache = if use_cache {
        Some(CacheFile::load(pages_dir))
    } else {
        None
    };

    let bar = page_bar(pages.len() as u64);
    let bar_for_progress = bar.clone();
    let report = move |done: usize, _total: usize| {
        bar_for_progress.set_position(done as u64);
    };

    let (entries, failed_pages) = ocr::provider::extract_all(
        &provider,
        &pages,
        &source_name,
        cache.as_mut(),
        verbose,
        Some(&report),
    )
    .await;
    bar.finish_and_clear();

    if let Some(cache) = &cache {
        cache.save(pages_dir)?;
    }

    if failed_pages > 0 {
        println!("  ⚠ {} page(s) failed and were skipped", failed_pages);
    }

    Ok(entries)
}

fn run_match(
    entries: &[OcrEntry],
    voter_roll: &VoterRoll,
    threshold: f64,
    verbose: bool,
) -> (Vec<batch::MatchRecord>, MatchSummary) {
    let bar = page_bar(entries.len() as u64);
    let bar_for_progress = bar.clone();
    let report = move |done: usize, _total: usize| {
        bar_for_progress.set_position(done as u64);
    };

    let (results, summary) = batch::match_all(entries, voter_roll, threshold, None, Some(&report));
    bar.finish_and_clear();

    if verbose {
        for row in &results {
            let diag = row
                .combined_score
                .map(|c| format!(", combined {:.1}", c))
                .unwrap_or_default();
            println!(
                "  page {} row {}: {} tier, score {:.1}{}",
                row.page_number, row.row_number, row.tier, row.match_score, diag
            );
        }
    }

    (results, summary)
}

fn print_summary(summary: &MatchSummary, threshold: f64) {
    println!(
        "\n✅ {} of {} valid ({:.1}%) at threshold {}",
        summary.valid_count,
        summary.total_count,
        summary.valid_percentage(),
        threshold
    );
    if summary.skipped_count > 0 {
        println!("   {} entries skipped (unreadable name)", summary.skipped_count);
    }
}

fn page_bar(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::with_template("  [{bar:30}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}
