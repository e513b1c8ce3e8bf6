pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, ExtractMode, OutputFormat};
pub use config::{CliOverrides, Config, ExtractorConfig, OutputConfig, ScanConfig};
pub use error::{CharcoalError, Result, UserFriendlyError};

// Core functionality re-exports
pub use extractor::{BlockExtractor, CodeBlock, PersistMode, PersistReport, Persister};
pub use scanner::{FileFilter, LogFile, LogScanner};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Outcome of one full run over a source file or directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub destination: PathBuf,
    pub mode: PersistMode,
    pub language_tag: String,
    pub sources_processed: usize,
    pub total_blocks_written: usize,
    pub sources: Vec<SourceReport>,
    pub errors: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceReport {
    pub source: PathBuf,
    pub blocks_found: usize,
    pub blocks_written: usize,
    pub output_paths: Vec<PathBuf>,
}

impl RunReport {
    fn new(destination: PathBuf, mode: PersistMode, language_tag: String) -> Self {
        Self {
            destination,
            mode,
            language_tag,
            sources_processed: 0,
            total_blocks_written: 0,
            sources: Vec::new(),
            errors: Vec::new(),
            completed_at: Utc::now(),
        }
    }

    fn record(&mut self, source: &Path, blocks_found: usize, persist: &PersistReport) {
        self.sources_processed += 1;
        self.total_blocks_written += persist.blocks_written;
        self.errors.extend(persist.errors.iter().cloned());
        self.sources.push(SourceReport {
            source: source.to_path_buf(),
            blocks_found,
            blocks_written: persist.blocks_written,
            output_paths: persist.output_paths.clone(),
        });
    }
}

/// Main library interface for Charcoal functionality
pub struct Charcoal {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl Charcoal {
    /// Create a new Charcoal instance with the provided configuration
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);
        let shutdown = GracefulShutdown::new()?;

        Ok(Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        })
    }

    /// Create a Charcoal instance for testing (no signal handler conflicts)
    pub fn new_for_test(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(false);
        let shutdown = GracefulShutdown::new_for_test();

        Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        }
    }

    /// Create Charcoal instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(config, output_mode, cli_args.verbose, cli_args.quiet)
    }

    /// Extract code blocks from a source file or directory of log files.
    pub fn run(&self, source: &Path, mode: PersistMode) -> Result<RunReport> {
        // Invalid matching rules surface here, before any I/O happens.
        let extractor = BlockExtractor::new(&self.config.extractor)?;

        let mut report = RunReport::new(
            self.config.output.destination.clone(),
            mode,
            self.config.extractor.language_tag.clone(),
        );

        if source.is_dir() {
            self.run_batch(source, &extractor, mode, &mut report)?;
        } else {
            self.run_single(source, &extractor, mode, &mut report)?;
        }

        report.completed_at = Utc::now();

        if self.config.output.write_report {
            self.write_report_json(&report)?;
        }

        Ok(report)
    }

    /// One source file: read, extract, persist into the destination root.
    fn run_single(
        &self,
        source: &Path,
        extractor: &BlockExtractor,
        mode: PersistMode,
        report: &mut RunReport,
    ) -> Result<()> {
        self.output_formatter
            .start_operation(&format!("Extracting code blocks from {}", source.display()));

        let content = read_source_text(source)?;
        let blocks = extractor.extract(&content);

        let persister = Persister::from_config(&self.config.output);
        let persist_report = persister.persist(&blocks, mode)?;

        self.output_formatter
            .print_source_result(&source.display().to_string(), &persist_report);
        report.record(source, blocks.len(), &persist_report);

        Ok(())
    }

    /// A directory of log files: scan, then process each sequentially.
    /// Failures local to one file are recorded and never abort the batch.
    fn run_batch(
        &self,
        root: &Path,
        extractor: &BlockExtractor,
        mode: PersistMode,
        report: &mut RunReport,
    ) -> Result<()> {
        self.output_formatter
            .start_operation(&format!("Scanning {} for log files", root.display()));

        let scanner = LogScanner::new(&self.config.scan);
        let log_files = scanner.scan_directory(root)?;

        if log_files.is_empty() {
            self.output_formatter.info(&format!(
                "No log files with extensions [{}] found under {}",
                self.config.scan.extensions.join(", "),
                root.display()
            ));
            return Ok(());
        }

        self.output_formatter
            .info(&format!("Found {} log file(s)", log_files.len()));
        self.output_formatter
            .debug(&scanner.get_statistics(&log_files).display_summary());

        let progress = self.progress_manager.create_file_progress(log_files.len() as u64);

        for (processed, log_file) in log_files.iter().enumerate() {
            self.shutdown.check_shutdown()?;
            ui::progress::update_file_progress(
                &progress,
                processed as u64,
                &log_file.display_path(),
            );

            let content = match read_source_text(&log_file.source_path) {
                Ok(content) => content,
                Err(e) => {
                    report.sources_processed += 1;
                    report
                        .errors
                        .push(format!("{}: {}", log_file.display_path(), e));
                    continue;
                }
            };

            let blocks = extractor.extract(&content);
            let persister = self.batch_persister(log_file, mode);

            match persister.persist(&blocks, mode) {
                Ok(persist_report) => {
                    self.progress_manager.suspend(|| {
                        self.output_formatter
                            .print_source_result(&log_file.display_path(), &persist_report);
                    });
                    report.record(&log_file.source_path, blocks.len(), &persist_report);
                }
                Err(e) => {
                    report.sources_processed += 1;
                    report
                        .errors
                        .push(format!("{}: {}", log_file.display_path(), e));
                }
            }
        }

        ui::progress::finish_progress_with_summary(
            &progress,
            &format!("Processed {} log file(s)", report.sources_processed),
        );

        Ok(())
    }

    /// Per-source output layout for batch runs: per-file mode nests each
    /// source's blocks under its own subdirectory so indices never collide;
    /// aggregate mode writes one `<stem>.<ext>` per source.
    fn batch_persister(&self, log_file: &LogFile, mode: PersistMode) -> Persister {
        let persister = Persister::from_config(&self.config.output);
        match mode {
            PersistMode::PerFile => persister.into_subdirectory(&log_file.stem),
            PersistMode::Aggregate => persister.with_aggregate_stem(&log_file.stem),
        }
    }

    fn write_report_json(&self, report: &RunReport) -> Result<()> {
        fs::create_dir_all(&self.config.output.destination)?;
        let report_path = self.config.output.destination.join("extraction_report.json");
        let json_content =
            serde_json::to_string_pretty(report).map_err(|e| CharcoalError::Config {
                message: format!("Failed to serialize run report: {}", e),
            })?;

        fs::write(&report_path, json_content)?;
        self.output_formatter
            .debug(&format!("Wrote run report to {}", report_path.display()));

        Ok(())
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &CharcoalError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Read one source file as text, mapping missing/unreadable paths to the
/// not-found condition, which is fatal to that source only.
fn read_source_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CharcoalError::SourceNotFound {
            path: path.display().to_string(),
        },
        ErrorKind::PermissionDenied => CharcoalError::Permission {
            path: path.display().to_string(),
        },
        _ => CharcoalError::Io(e),
    })
}

/// Convenience function to extract code blocks with minimal setup
pub fn extract_to_dir(source: &Path, destination: &Path, mode: PersistMode) -> Result<RunReport> {
    let mut config = Config::default();
    config.output.destination = destination.to_path_buf();

    let charcoal = Charcoal::new(config, OutputMode::Plain, 0, true)?;
    charcoal.run(source, mode)
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TWO_BLOCK_LOG: &str = "```python\nprint(1)\n```\ntext\n```python\nprint(2)\n```";

    fn charcoal_with_dest(dest: &Path) -> Charcoal {
        let mut config = Config::default();
        config.output.destination = dest.to_path_buf();
        Charcoal::new_for_test(config, OutputMode::Plain, 0, true)
    }

    #[test]
    fn test_single_file_per_file_run() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("chat.log");
        fs::write(&log_path, TWO_BLOCK_LOG).unwrap();

        let dest = temp_dir.path().join("out");
        let charcoal = charcoal_with_dest(&dest);

        let report = charcoal.run(&log_path, PersistMode::PerFile).unwrap();

        assert_eq!(report.sources_processed, 1);
        assert_eq!(report.total_blocks_written, 2);
        assert!(report.errors.is_empty());
        assert_eq!(
            fs::read_to_string(dest.join("code_block_1.py")).unwrap(),
            "print(1)"
        );
        assert_eq!(
            fs::read_to_string(dest.join("code_block_2.py")).unwrap(),
            "print(2)"
        );
    }

    #[test]
    fn test_single_file_aggregate_run() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("chat.log");
        fs::write(&log_path, TWO_BLOCK_LOG).unwrap();

        let dest = temp_dir.path().join("out");
        let charcoal = charcoal_with_dest(&dest);

        let report = charcoal.run(&log_path, PersistMode::Aggregate).unwrap();

        assert_eq!(report.total_blocks_written, 2);
        let combined = fs::read_to_string(dest.join("combined_code.py")).unwrap();
        assert!(combined.contains("# Code block 1\nprint(1)"));
        assert!(combined.contains("# Code block 2\nprint(2)"));
    }

    #[test]
    fn test_zero_blocks_is_not_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("empty.log");
        fs::write(&log_path, "no fences here").unwrap();

        let dest = temp_dir.path().join("out");
        let charcoal = charcoal_with_dest(&dest);

        let report = charcoal.run(&log_path, PersistMode::PerFile).unwrap();

        assert_eq!(report.sources_processed, 1);
        assert_eq!(report.total_blocks_written, 0);
        assert!(report.errors.is_empty());
        assert!(dest.is_dir());
    }

    #[test]
    fn test_missing_source_is_fatal_for_single_run() {
        let temp_dir = TempDir::new().unwrap();
        let charcoal = charcoal_with_dest(&temp_dir.path().join("out"));

        let result = charcoal.run(
            &temp_dir.path().join("missing.log"),
            PersistMode::PerFile,
        );

        assert!(matches!(result, Err(CharcoalError::SourceNotFound { .. })));
    }

    #[test]
    fn test_batch_run_separates_sources() {
        let temp_dir = TempDir::new().unwrap();
        let logs = temp_dir.path().join("logs");
        fs::create_dir(&logs).unwrap();
        fs::write(logs.join("alpha.log"), "```python\na = 1\n```").unwrap();
        fs::write(
            logs.join("beta.log"),
            "```python\nb = 1\n```\n```python\nb = 2\n```",
        )
        .unwrap();

        let dest = temp_dir.path().join("out");
        let charcoal = charcoal_with_dest(&dest);

        let report = charcoal.run(&logs, PersistMode::PerFile).unwrap();

        assert_eq!(report.sources_processed, 2);
        assert_eq!(report.total_blocks_written, 3);
        assert!(dest.join("alpha/code_block_1.py").exists());
        assert!(dest.join("beta/code_block_1.py").exists());
        assert!(dest.join("beta/code_block_2.py").exists());
    }

    #[test]
    fn test_batch_aggregate_names_outputs_after_sources() {
        let temp_dir = TempDir::new().unwrap();
        let logs = temp_dir.path().join("logs");
        fs::create_dir(&logs).unwrap();
        fs::write(logs.join("session.log"), "```python\nx = 1\n```").unwrap();

        let dest = temp_dir.path().join("out");
        let charcoal = charcoal_with_dest(&dest);

        let report = charcoal.run(&logs, PersistMode::Aggregate).unwrap();

        assert_eq!(report.total_blocks_written, 1);
        assert!(dest.join("session.py").exists());
    }

    #[test]
    fn test_batch_with_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let logs = temp_dir.path().join("logs");
        fs::create_dir(&logs).unwrap();

        let charcoal = charcoal_with_dest(&temp_dir.path().join("out"));
        let report = charcoal.run(&logs, PersistMode::PerFile).unwrap();

        assert_eq!(report.sources_processed, 0);
        assert_eq!(report.total_blocks_written, 0);
    }

    #[test]
    fn test_cancelled_batch_propagates() {
        let temp_dir = TempDir::new().unwrap();
        let logs = temp_dir.path().join("logs");
        fs::create_dir(&logs).unwrap();
        fs::write(logs.join("a.log"), "```python\nx = 1\n```").unwrap();

        let charcoal = charcoal_with_dest(&temp_dir.path().join("out"));
        charcoal.request_shutdown();

        let result = charcoal.run(&logs, PersistMode::PerFile);
        assert!(matches!(result, Err(CharcoalError::Cancelled)));
    }

    #[test]
    fn test_run_report_written_when_enabled() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("chat.log");
        fs::write(&log_path, TWO_BLOCK_LOG).unwrap();

        let dest = temp_dir.path().join("out");
        let mut config = Config::default();
        config.output.destination = dest.clone();
        config.output.write_report = true;

        let charcoal = Charcoal::new_for_test(config, OutputMode::Plain, 0, true);
        charcoal.run(&log_path, PersistMode::PerFile).unwrap();

        let report_path = dest.join("extraction_report.json");
        assert!(report_path.exists());

        let parsed: RunReport =
            serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(parsed.total_blocks_written, 2);
        assert_eq!(parsed.language_tag, "python");
    }

    #[test]
    fn test_empty_language_tag_rejected_by_validation() {
        let mut config = Config::default();
        config.extractor.language_tag = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sample_config_generation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sample.toml");

        Charcoal::generate_sample_config(&config_path).unwrap();
        assert!(config_path.exists());

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[extractor]"));
        assert!(content.contains("[output]"));
        assert!(content.contains("[scan]"));
    }

    #[test]
    fn test_version_info() {
        assert!(!version_info().is_empty());
    }
}
