use crate::config::ScanConfig;
use crate::error::{CharcoalError, Result};
use crate::scanner::file_filter::FileFilter;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::{DirEntry, WalkDir};

/// One candidate source file discovered under the scan root.
#[derive(Debug, Clone)]
pub struct LogFile {
    pub source_path: PathBuf,
    pub relative_path: PathBuf,
    pub filename: String,
    pub stem: String,
    pub size: u64,
    pub modified: SystemTime,
}

impl LogFile {
    pub fn new(source_path: PathBuf, relative_path: PathBuf, size: u64, modified: SystemTime) -> Self {
        let filename = source_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();

        let stem = source_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unnamed")
            .to_string();

        Self {
            source_path,
            relative_path,
            filename,
            stem,
            size,
            modified,
        }
    }

    pub fn display_path(&self) -> String {
        self.relative_path.display().to_string()
    }
}

/// Recursively collects log files under a directory.
///
/// Symlinks are not followed and traversal depth is bounded. An empty result
/// is a valid outcome; the caller reports it as informational.
pub struct LogScanner {
    filter: FileFilter,
    max_depth: usize,
}

impl LogScanner {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            filter: FileFilter::new(config),
            max_depth: config.max_depth,
        }
    }

    pub fn scan_directory<P: AsRef<Path>>(&self, root: P) -> Result<Vec<LogFile>> {
        let root_path = root.as_ref();

        if !root_path.exists() {
            return Err(CharcoalError::InvalidPath {
                path: root_path.display().to_string(),
            });
        }

        if !root_path.is_dir() {
            return Err(CharcoalError::InvalidPath {
                path: format!("{} is not a directory", root_path.display()),
            });
        }

        let mut log_files = Vec::new();
        let mut scan_errors = Vec::new();

        let walker = WalkDir::new(root_path)
            .max_depth(self.max_depth)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| self.should_traverse(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    if err
                        .io_error()
                        .is_some_and(|e| e.kind() == std::io::ErrorKind::PermissionDenied)
                    {
                        scan_errors.push(format!("Permission denied: {}", err));
                    } else {
                        scan_errors.push(format!("Scan error: {}", err));
                    }
                    continue;
                }
            };

            if entry.file_type().is_file() {
                match self.process_file(&entry, root_path) {
                    Ok(Some(log_file)) => log_files.push(log_file),
                    Ok(None) => {} // Filtered out
                    Err(err) => {
                        scan_errors.push(format!(
                            "Error processing {}: {}",
                            entry.path().display(),
                            err
                        ));
                    }
                }
            }
        }

        if !scan_errors.is_empty() && log_files.is_empty() {
            return Err(CharcoalError::Permission {
                path: format!("Multiple scan errors: {}", scan_errors.join(", ")),
            });
        }

        // Sort by relative path for deterministic processing order
        log_files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        Ok(log_files)
    }

    fn should_traverse(&self, entry: &DirEntry) -> bool {
        if entry.depth() > self.max_depth {
            return false;
        }

        if entry.file_type().is_file() || entry.depth() == 0 {
            return true;
        }

        if entry.file_type().is_dir() {
            return self.filter.should_traverse_directory(entry.path());
        }

        true
    }

    fn process_file(&self, entry: &DirEntry, root_path: &Path) -> Result<Option<LogFile>> {
        let path = entry.path();

        if !self.filter.is_log_file(path) {
            return Ok(None);
        }

        let metadata = entry.metadata().map_err(|e| CharcoalError::Io(e.into()))?;

        if !self.filter.is_size_allowed(metadata.len()) {
            return Ok(None);
        }

        let relative_path = self.calculate_relative_path(path, root_path)?;
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        Ok(Some(LogFile::new(
            path.to_path_buf(),
            relative_path,
            metadata.len(),
            modified,
        )))
    }

    fn calculate_relative_path(&self, file_path: &Path, root_path: &Path) -> Result<PathBuf> {
        let relative = file_path
            .strip_prefix(root_path)
            .map_err(|_| CharcoalError::InvalidPath {
                path: format!(
                    "Cannot calculate relative path for {} from root {}",
                    file_path.display(),
                    root_path.display()
                ),
            })?;

        if relative
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(CharcoalError::InvalidPath {
                path: format!(
                    "Path contains parent directory references: {}",
                    relative.display()
                ),
            });
        }

        Ok(relative.to_path_buf())
    }

    pub fn get_statistics(&self, log_files: &[LogFile]) -> ScanStatistics {
        let total_files = log_files.len();
        let total_size = log_files.iter().map(|f| f.size).sum();

        let (largest_file_size, largest_file_path) = log_files
            .iter()
            .max_by_key(|f| f.size)
            .map(|f| (f.size, f.relative_path.clone()))
            .unwrap_or((0, PathBuf::new()));

        ScanStatistics {
            total_files,
            total_size,
            largest_file_size,
            largest_file_path,
        }
    }
}

#[derive(Debug, Default)]
pub struct ScanStatistics {
    pub total_files: usize,
    pub total_size: u64,
    pub largest_file_size: u64,
    pub largest_file_path: PathBuf,
}

impl ScanStatistics {
    pub fn display_summary(&self) -> String {
        let mut summary = format!(
            "Scan results:\n  Total files: {}\n  Total size: {} bytes\n",
            self.total_files, self.total_size
        );

        if self.largest_file_size > 0 {
            summary.push_str(&format!(
                "  Largest file: {} ({} bytes)\n",
                self.largest_file_path.display(),
                self.largest_file_size
            ));
        }

        summary
    }
}
