use std::fs::OpenOptions;
use std::io::Write;

use chrono::Local;

use crate::core::summary_stream::Summary;

/// Appends finished summaries to a transcript file.
///
/// Inactive when constructed without a path; `record` is then a no-op, so
/// call sites don't need to branch.
pub struct TranscriptLog {
    file_path: Option<String>,
}

impl TranscriptLog {
    pub fn new(file_path: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        if let Some(path) = &file_path {
            Self::test_file_access(path)?;
        }
        Ok(TranscriptLog { file_path })
    }

    pub fn is_active(&self) -> bool {
        self.file_path.is_some()
    }

    pub fn record(&self, summary: &Summary) -> Result<(), Box<dyn std::error::Error>> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(
            file,
            "## {} ({})",
            summary.metadata.url,
            Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(
            file,
            "title: {} | provider: {} | model: {} | took: {}",
            summary.metadata.title,
            summary.metadata.provider,
            summary.metadata.model,
            summary.metadata.processing_time
        )?;
        writeln!(file)?;
        writeln!(file, "{}", summary.text.trim_end())?;
        writeln!(file)?;
        Ok(())
    }

    fn test_file_access(path: &str) -> Result<(), Box<dyn std::error::Error>> {
        OpenOptions::new().create(true).append(true).open(path)?;
        Ok(())
    }
}
