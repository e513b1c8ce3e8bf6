use crate::config::ExtractorConfig;
use crate::error::Result;
use regex::Regex;

/// One extracted excerpt, trimmed of leading and trailing whitespace.
///
/// Blocks are independent of each other; ordering is the order of appearance
/// in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub content: String,
}

impl CodeBlock {
    pub fn new<S: Into<String>>(content: S) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn line_count(&self) -> usize {
        if self.content.is_empty() {
            0
        } else {
            self.content.lines().count()
        }
    }
}

/// Extracts fenced code blocks from decoded text.
///
/// A block opens with a line of three backticks immediately followed by the
/// configured language tag and a newline, and closes at the next fence of
/// three backticks. Matching is non-greedy, so consecutive blocks stay
/// separate. Extraction is a pure function of the input text: no file-system
/// access, no shared state between calls.
pub struct BlockExtractor {
    pattern: Regex,
    language_tag: String,
}

impl BlockExtractor {
    /// Compile the matching rule. Fails only if the configured language tag
    /// produces an invalid pattern, which is a configuration error rather
    /// than a runtime data condition.
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        Self::with_language_tag(&config.language_tag)
    }

    pub fn with_language_tag(tag: &str) -> Result<Self> {
        let pattern = Regex::new(&format!(r"(?s)```{}\n(.*?)```", regex::escape(tag)))?;

        Ok(Self {
            pattern,
            language_tag: tag.to_string(),
        })
    }

    pub fn extract(&self, source: &str) -> Vec<CodeBlock> {
        self.pattern
            .captures_iter(source)
            .map(|caps| CodeBlock::new(caps[1].trim()))
            .collect()
    }

    pub fn language_tag(&self) -> &str {
        &self.language_tag
    }
}
