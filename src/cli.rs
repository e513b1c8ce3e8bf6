use crate::config::{CliOverrides, Config};
use crate::error::Result;
use crate::extractor::PersistMode;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "charcoal")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract fenced Python code blocks from chat logs")]
#[command(
    long_about = "Charcoal scans chat log files for fenced code blocks (```python ... ```) \
                       and writes each block to its own file, or all blocks into a single \
                       aggregate file."
)]
#[command(after_help = "EXAMPLES:\n  \
    charcoal chat.log\n  \
    charcoal chat.log --output extracted --mode aggregate\n  \
    charcoal ./logs --formats log,txt --exclude archive,tmp\n  \
    charcoal chat.log --tag rust --ext rs\n  \
    charcoal chat.log --config my-config.toml\n")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Chat log file, or a directory to scan for log files
    #[arg(required_unless_present = "generate_config")]
    pub source: Option<PathBuf>,

    /// Destination directory for extracted code (default: extracted_code)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// How extracted blocks are written
    #[arg(short, long, value_enum, default_value_t = ExtractMode::PerFile)]
    pub mode: ExtractMode,

    /// Log file extensions to scan for in directory mode (comma-separated)
    #[arg(short, long, help = "File extensions to treat as logs (e.g. log,txt)")]
    pub formats: Option<String>,

    /// Directories to exclude in directory mode
    #[arg(short, long, value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,

    /// Language tag expected after the opening fence
    #[arg(long, help = "Language tag after the opening fence (default: python)")]
    pub tag: Option<String>,

    /// Extension for the written code files
    #[arg(long = "ext", help = "Extension for written code files (default: py)")]
    pub extension: Option<String>,

    /// Maximum source file size in MB
    #[arg(long, help = "Maximum source file size to process (in MB)")]
    pub max_size: Option<u64>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Write a machine-readable run report into the destination
    #[arg(long, help = "Write extraction_report.json into the destination")]
    pub report: bool,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (show what would be done without executing)
    #[arg(long, help = "Show what would be extracted without writing files")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExtractMode {
    /// One output file per extracted block
    PerFile,
    /// All blocks concatenated into one file
    Aggregate,
}

impl From<ExtractMode> for PersistMode {
    fn from(mode: ExtractMode) -> Self {
        match mode {
            ExtractMode::PerFile => PersistMode::PerFile,
            ExtractMode::Aggregate => PersistMode::Aggregate,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        let max_file_size = self.max_size.map(|size| size * 1024 * 1024); // MB to bytes

        CliOverrides::new()
            .with_formats(self.formats.clone())
            .with_exclude(self.exclude.clone())
            .with_max_file_size(max_file_size)
            .with_destination(self.output.clone())
            .with_language_tag(self.tag.clone())
            .with_file_extension(self.extension.clone())
            .with_write_report(if self.report { Some(true) } else { None })
    }

    pub fn persist_mode(&self) -> PersistMode {
        self.mode.into()
    }

    pub fn should_use_colors(&self) -> bool {
        !self.quiet && console::Term::stdout().features().colors_supported()
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose > 0 && !self.quiet
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}
