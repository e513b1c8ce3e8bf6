use crate::error::{CharcoalError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    pub extractor: ExtractorConfig,
    pub output: OutputConfig,
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractorConfig {
    /// Language tag expected after the opening fence (```<tag>).
    pub language_tag: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub destination: PathBuf,
    pub file_extension: String,
    pub aggregate_filename: String,
    pub write_report: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    pub extensions: Vec<String>,
    pub max_file_size: u64,
    pub exclude_dirs: Vec<String>,
    pub max_depth: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            language_tag: "python".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            destination: PathBuf::from("extracted_code"),
            file_extension: "py".to_string(),
            aggregate_filename: "combined_code".to_string(),
            write_report: false,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["log".to_string(), "txt".to_string()],
            max_file_size: 10 * 1024 * 1024, // 10MB
            exclude_dirs: vec![
                ".git".to_string(),
                "node_modules".to_string(),
                "target".to_string(),
                "__pycache__".to_string(),
            ],
            max_depth: 10,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(CharcoalError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CharcoalError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| CharcoalError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["charcoal.toml", ".charcoal.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref formats) = cli_args.formats {
            self.scan.extensions = formats
                .split(',')
                .map(|s| s.trim().trim_start_matches('.').to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(ref exclude) = cli_args.exclude {
            self.scan.exclude_dirs.extend(exclude.clone());
        }

        if let Some(max_size) = cli_args.max_file_size {
            self.scan.max_file_size = max_size;
        }

        if let Some(ref destination) = cli_args.destination {
            self.output.destination = destination.clone();
        }

        if let Some(ref tag) = cli_args.language_tag {
            self.extractor.language_tag = tag.clone();
        }

        if let Some(ref ext) = cli_args.file_extension {
            self.output.file_extension = ext.trim_start_matches('.').to_string();
        }

        if let Some(write_report) = cli_args.write_report {
            self.output.write_report = write_report;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| CharcoalError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| CharcoalError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.extractor.language_tag.trim().is_empty() {
            return Err(CharcoalError::Config {
                message: "Language tag must not be empty".to_string(),
            });
        }

        if self.output.file_extension.is_empty()
            || self.output.file_extension.contains(&['/', '\\'][..])
        {
            return Err(CharcoalError::Config {
                message: format!(
                    "Invalid output file extension: {:?}",
                    self.output.file_extension
                ),
            });
        }

        if self.output.aggregate_filename.is_empty()
            || self.output.aggregate_filename.contains(&['/', '\\'][..])
        {
            return Err(CharcoalError::Config {
                message: format!(
                    "Invalid aggregate file name: {:?}",
                    self.output.aggregate_filename
                ),
            });
        }

        if self.scan.extensions.is_empty() {
            return Err(CharcoalError::Config {
                message: "At least one log file extension must be specified".to_string(),
            });
        }

        if self.scan.max_file_size == 0 {
            return Err(CharcoalError::Config {
                message: "Maximum file size must be greater than 0".to_string(),
            });
        }

        if self.scan.max_depth == 0 {
            return Err(CharcoalError::Config {
                message: "Maximum directory depth must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub formats: Option<String>,
    pub exclude: Option<Vec<String>>,
    pub max_file_size: Option<u64>,
    pub destination: Option<PathBuf>,
    pub language_tag: Option<String>,
    pub file_extension: Option<String>,
    pub write_report: Option<bool>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_formats(mut self, formats: Option<String>) -> Self {
        self.formats = formats;
        self
    }

    pub fn with_exclude(mut self, exclude: Option<Vec<String>>) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn with_max_file_size(mut self, max_size: Option<u64>) -> Self {
        self.max_file_size = max_size;
        self
    }

    pub fn with_destination(mut self, destination: Option<PathBuf>) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_language_tag(mut self, tag: Option<String>) -> Self {
        self.language_tag = tag;
        self
    }

    pub fn with_file_extension(mut self, ext: Option<String>) -> Self {
        self.file_extension = ext;
        self
    }

    pub fn with_write_report(mut self, write_report: Option<bool>) -> Self {
        self.write_report = write_report;
        self
    }
}
