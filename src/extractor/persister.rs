use crate::config::OutputConfig;
use crate::error::{CharcoalError, Result};
use crate::extractor::CodeBlock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// How extracted blocks are laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistMode {
    /// One file per block: `code_block_<i>.<ext>`, 1-indexed in extraction order.
    PerFile,
    /// All blocks concatenated into a single file, each preceded by a
    /// `# Code block <i>` separator line.
    Aggregate,
}

impl std::fmt::Display for PersistMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistMode::PerFile => write!(f, "per-file"),
            PersistMode::Aggregate => write!(f, "aggregate"),
        }
    }
}

/// Outcome of one persist call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistReport {
    pub blocks_written: usize,
    pub output_paths: Vec<PathBuf>,
    pub destination: PathBuf,
    pub errors: Vec<String>,
}

impl PersistReport {
    fn new(destination: PathBuf) -> Self {
        Self {
            blocks_written: 0,
            output_paths: Vec::new(),
            destination,
            errors: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Writes extracted blocks under a destination directory.
///
/// The destination is created on demand, intermediate directories included;
/// re-running the same persist call overwrites the previous output rather
/// than accumulating. Individual write failures are recorded in the report
/// and do not abort the remaining blocks.
pub struct Persister {
    destination: PathBuf,
    file_extension: String,
    aggregate_filename: String,
}

impl Persister {
    pub fn new<P: Into<PathBuf>>(destination: P) -> Self {
        Self {
            destination: destination.into(),
            file_extension: "py".to_string(),
            aggregate_filename: "combined_code".to_string(),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(config.destination.clone())
            .with_file_extension(&config.file_extension)
            .with_aggregate_filename(&config.aggregate_filename)
    }

    pub fn with_file_extension<S: Into<String>>(mut self, ext: S) -> Self {
        self.file_extension = ext.into();
        self
    }

    pub fn with_aggregate_filename<S: Into<String>>(mut self, name: S) -> Self {
        self.aggregate_filename = name.into();
        self
    }

    /// Redirect output into a subdirectory of the configured destination.
    pub fn into_subdirectory(mut self, name: &str) -> Self {
        self.destination = self.destination.join(name);
        self
    }

    /// Override the aggregate file's stem, keeping destination and extension.
    pub fn with_aggregate_stem(mut self, stem: &str) -> Self {
        self.aggregate_filename = stem.to_string();
        self
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn persist(&self, blocks: &[CodeBlock], mode: PersistMode) -> Result<PersistReport> {
        self.ensure_destination()?;

        let mut report = PersistReport::new(self.destination.clone());

        if blocks.is_empty() {
            return Ok(report);
        }

        match mode {
            PersistMode::PerFile => self.persist_per_file(blocks, &mut report),
            PersistMode::Aggregate => self.persist_aggregate(blocks, &mut report),
        }

        Ok(report)
    }

    fn persist_per_file(&self, blocks: &[CodeBlock], report: &mut PersistReport) {
        for (index, block) in blocks.iter().enumerate() {
            let path = self.block_path(index + 1);

            match fs::write(&path, &block.content) {
                Ok(()) => {
                    report.blocks_written += 1;
                    report.output_paths.push(path);
                }
                Err(e) => {
                    report
                        .errors
                        .push(format!("Failed to write {}: {}", path.display(), e));
                }
            }
        }
    }

    fn persist_aggregate(&self, blocks: &[CodeBlock], report: &mut PersistReport) {
        let mut combined = String::new();
        for (index, block) in blocks.iter().enumerate() {
            combined.push_str(&format!("# Code block {}\n", index + 1));
            combined.push_str(&block.content);
            combined.push_str("\n\n");
        }

        let path = self.aggregate_path();

        // One write per invocation; accumulation across source files is an
        // explicit caller workflow, not an append here.
        match fs::write(&path, combined) {
            Ok(()) => {
                report.blocks_written = blocks.len();
                report.output_paths.push(path);
            }
            Err(e) => {
                report
                    .errors
                    .push(format!("Failed to write {}: {}", path.display(), e));
            }
        }
    }

    pub fn block_path(&self, index: usize) -> PathBuf {
        self.destination
            .join(format!("code_block_{}.{}", index, self.file_extension))
    }

    pub fn aggregate_path(&self) -> PathBuf {
        self.destination
            .join(format!("{}.{}", self.aggregate_filename, self.file_extension))
    }

    fn ensure_destination(&self) -> Result<()> {
        if self.destination.exists() && !self.destination.is_dir() {
            return Err(CharcoalError::DestinationNotDirectory {
                path: self.destination.display().to_string(),
            });
        }

        fs::create_dir_all(&self.destination).map_err(|e| match e.kind() {
            ErrorKind::PermissionDenied => CharcoalError::Permission {
                path: self.destination.display().to_string(),
            },
            _ => CharcoalError::Io(e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn blocks(contents: &[&str]) -> Vec<CodeBlock> {
        contents.iter().map(|c| CodeBlock::new(*c)).collect()
    }

    #[test]
    fn test_per_file_writes_one_file_per_block() {
        let temp_dir = TempDir::new().unwrap();
        let persister = Persister::new(temp_dir.path().join("out"));

        let report = persister
            .persist(&blocks(&["print(1)", "print(2)"]), PersistMode::PerFile)
            .unwrap();

        assert_eq!(report.blocks_written, 2);
        assert!(report.is_complete());
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("out/code_block_1.py")).unwrap(),
            "print(1)"
        );
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("out/code_block_2.py")).unwrap(),
            "print(2)"
        );
    }

    #[test]
    fn test_missing_destination_is_created() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a/b/c");
        let persister = Persister::new(&nested);

        let report = persister
            .persist(&blocks(&["x = 1"]), PersistMode::PerFile)
            .unwrap();

        assert!(nested.is_dir());
        assert_eq!(report.blocks_written, 1);
        assert_eq!(report.destination, nested);
    }

    #[test]
    fn test_empty_input_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("out");
        let persister = Persister::new(&dest);

        let report = persister.persist(&[], PersistMode::PerFile).unwrap();

        assert_eq!(report.blocks_written, 0);
        assert!(report.output_paths.is_empty());
        assert!(report.is_complete());
        // Directory is still created for the caller
        assert!(dest.is_dir());
        assert_eq!(fs::read_dir(&dest).unwrap().count(), 0);
    }

    #[test]
    fn test_per_file_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let persister = Persister::new(temp_dir.path().join("out"));
        let input = blocks(&["a", "b"]);

        persister.persist(&input, PersistMode::PerFile).unwrap();
        let report = persister.persist(&input, PersistMode::PerFile).unwrap();

        assert_eq!(report.blocks_written, 2);
        let entries = fs::read_dir(temp_dir.path().join("out")).unwrap().count();
        assert_eq!(entries, 2);
    }

    #[test]
    fn test_round_trip_in_index_order() {
        let temp_dir = TempDir::new().unwrap();
        let persister = Persister::new(temp_dir.path().join("out"));
        let input = blocks(&["first()", "second()", "third()"]);

        let report = persister.persist(&input, PersistMode::PerFile).unwrap();

        let read_back: Vec<String> = (1..=report.blocks_written)
            .map(|i| fs::read_to_string(persister.block_path(i)).unwrap())
            .collect();
        let expected: Vec<&str> = input.iter().map(|b| b.content.as_str()).collect();
        assert_eq!(read_back, expected);
    }

    #[test]
    fn test_aggregate_writes_single_file_with_separators() {
        let temp_dir = TempDir::new().unwrap();
        let persister = Persister::new(temp_dir.path().join("out"));

        let report = persister
            .persist(&blocks(&["print(1)", "print(2)"]), PersistMode::Aggregate)
            .unwrap();

        assert_eq!(report.blocks_written, 2);
        assert_eq!(report.output_paths.len(), 1);

        let content = fs::read_to_string(persister.aggregate_path()).unwrap();
        assert_eq!(
            content,
            "# Code block 1\nprint(1)\n\n# Code block 2\nprint(2)\n\n"
        );
    }

    #[test]
    fn test_aggregate_splits_back_into_blocks() {
        let temp_dir = TempDir::new().unwrap();
        let persister = Persister::new(temp_dir.path().join("out"));
        let input = blocks(&["a = 1", "b = 2", "c = 3"]);

        persister.persist(&input, PersistMode::Aggregate).unwrap();

        let content = fs::read_to_string(persister.aggregate_path()).unwrap();
        let recovered: Vec<String> = content
            .split("# Code block ")
            .filter(|chunk| !chunk.is_empty())
            .map(|chunk| {
                // Strip the index line, trim the remainder
                chunk
                    .splitn(2, '\n')
                    .nth(1)
                    .unwrap_or("")
                    .trim()
                    .to_string()
            })
            .collect();

        let expected: Vec<&str> = input.iter().map(|b| b.content.as_str()).collect();
        assert_eq!(recovered, expected);
    }

    #[test]
    fn test_aggregate_empty_input_writes_no_file() {
        let temp_dir = TempDir::new().unwrap();
        let persister = Persister::new(temp_dir.path().join("out"));

        let report = persister.persist(&[], PersistMode::Aggregate).unwrap();

        assert_eq!(report.blocks_written, 0);
        assert!(!persister.aggregate_path().exists());
    }

    #[test]
    fn test_destination_collision_with_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("not_a_dir");
        fs::write(&file_path, "occupied").unwrap();

        let persister = Persister::new(&file_path);
        let result = persister.persist(&blocks(&["x"]), PersistMode::PerFile);

        assert!(matches!(
            result,
            Err(CharcoalError::DestinationNotDirectory { .. })
        ));
    }

    #[test]
    fn test_block_write_failure_does_not_abort_siblings() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("out");
        fs::create_dir_all(&dest).unwrap();
        // Occupy the slot for block 1 with a directory so its write fails
        fs::create_dir(dest.join("code_block_1.py")).unwrap();

        let persister = Persister::new(&dest);
        let report = persister
            .persist(&blocks(&["a", "b"]), PersistMode::PerFile)
            .unwrap();

        assert_eq!(report.blocks_written, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("code_block_1.py"));
        assert_eq!(
            fs::read_to_string(dest.join("code_block_2.py")).unwrap(),
            "b"
        );
    }

    #[test]
    fn test_custom_extension_and_aggregate_name() {
        let temp_dir = TempDir::new().unwrap();
        let persister = Persister::new(temp_dir.path().join("out"))
            .with_file_extension("rs")
            .with_aggregate_filename("all_blocks");

        persister
            .persist(&blocks(&["let x = 1;"]), PersistMode::Aggregate)
            .unwrap();

        assert!(temp_dir.path().join("out/all_blocks.rs").exists());
    }
}
