use crate::config::Config;
use crate::error::{CalendarError, Result};
use crate::extractor::{ExtractionProgress, Field, FileExtraction, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseReport {
    pub input_dir: PathBuf,
    pub output_path: PathBuf,
    pub pattern: String,
    pub files: Vec<FileReport>,
    pub total_files: usize,
    pub total_records: usize,
    pub dropped_fragments: usize,
    pub bytes_processed: u64,
    pub duration_ms: u64,
    pub parsed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub records: usize,
    pub fragments: usize,
    pub dropped_fragments: usize,
}

impl From<&FileExtraction> for FileReport {
    fn from(extraction: &FileExtraction) -> Self {
        Self {
            path: extraction.source_path.clone(),
            records: extraction.records.len(),
            fragments: extraction.fragments,
            dropped_fragments: extraction.dropped_fragments,
        }
    }
}

impl ParseReport {
    pub fn new(
        config: &Config,
        extractions: &[FileExtraction],
        progress: &ExtractionProgress,
    ) -> Self {
        Self {
            input_dir: config.discovery.input_dir.clone(),
            output_path: config.output.path.clone(),
            pattern: config.discovery.pattern.clone(),
            files: extractions.iter().map(FileReport::from).collect(),
            total_files: progress.files_processed,
            total_records: progress.records_extracted,
            dropped_fragments: progress.dropped_fragments,
            bytes_processed: progress.bytes_processed,
            duration_ms: progress.elapsed().as_millis() as u64,
            parsed_at: Utc::now(),
        }
    }
}

/// Writes the combined record set as one delimited file.
pub struct OutputManager {
    output_path: PathBuf,
    delimiter: u8,
}

impl OutputManager {
    pub fn new<P: Into<PathBuf>>(output_path: P) -> Self {
        Self {
            output_path: output_path.into(),
            delimiter: b',',
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.output.path.clone()).with_delimiter(config.delimiter_byte()?))
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn get_output_path(&self) -> &Path {
        &self.output_path
    }

    /// Writes the header row and one line per record, replacing any existing file.
    ///
    /// The header is written even when `records` is empty.
    pub fn write_records(&self, records: &[Record]) -> Result<usize> {
        self.ensure_parent_directory()?;

        let file = fs::File::create(&self.output_path).map_err(|source| CalendarError::Write {
            path: self.output_path.clone(),
            source,
        })?;

        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .from_writer(BufWriter::new(file));

        writer.write_record(Field::header())?;
        for record in records {
            writer.write_record(record.values())?;
        }

        writer.flush().map_err(|source| CalendarError::Write {
            path: self.output_path.clone(),
            source,
        })?;

        tracing::info!(
            path = %self.output_path.display(),
            records = records.len(),
            "wrote combined records"
        );

        Ok(records.len())
    }

    /// Path of the JSON report that sits next to the output file.
    pub fn report_path(&self) -> PathBuf {
        let stem = self
            .output_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("calendars_parsed");
        self.output_path.with_file_name(format!("{}.report.json", stem))
    }

    pub fn save_report_json(&self, report: &ParseReport) -> Result<PathBuf> {
        let report_path = self.report_path();
        let json_content =
            serde_json::to_string_pretty(report).map_err(|e| CalendarError::Config {
                message: format!("Failed to serialize report to JSON: {}", e),
            })?;

        let mut file = fs::File::create(&report_path).map_err(|source| CalendarError::Write {
            path: report_path.clone(),
            source,
        })?;
        writeln!(file, "{}", json_content).map_err(|source| CalendarError::Write {
            path: report_path.clone(),
            source,
        })?;

        Ok(report_path)
    }

    fn ensure_parent_directory(&self) -> Result<()> {
        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| CalendarError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(case_number: &str) -> Record {
        Record {
            date: "01/02/2024".to_string(),
            case_number: case_number.to_string(),
            title: "State v. Doe".to_string(),
            event: "Hearing".to_string(),
            court: "District".to_string(),
            status: "Open".to_string(),
        }
    }

    #[test]
    fn test_header_only_for_empty_records() {
        let temp_dir = TempDir::new().unwrap();
        let manager = OutputManager::new(temp_dir.path().join("calendars_parsed.csv"));

        let written = manager.write_records(&[]).unwrap();

        assert_eq!(written, 0);
        let content = fs::read_to_string(manager.get_output_path()).unwrap();
        assert_eq!(content, "Date,Case Number,Title,Event,Court,Status\n");
    }

    #[test]
    fn test_records_written_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let manager = OutputManager::new(temp_dir.path().join("out.csv"));

        manager
            .write_records(&[record("CR-24-001"), record("CR-24-002")])
            .unwrap();

        let content = fs::read_to_string(manager.get_output_path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "01/02/2024,CR-24-001,State v. Doe,Hearing,District,Open");
        assert_eq!(lines[2], "01/02/2024,CR-24-002,State v. Doe,Hearing,District,Open");
    }

    #[test]
    fn test_fields_with_delimiter_are_quoted() {
        let temp_dir = TempDir::new().unwrap();
        let manager = OutputManager::new(temp_dir.path().join("out.csv"));

        let mut entry = record("CR-1");
        entry.title = "Doe, John \"JD\"".to_string();
        manager.write_records(&[entry]).unwrap();

        let content = fs::read_to_string(manager.get_output_path()).unwrap();
        assert!(content.contains("\"Doe, John \"\"JD\"\"\""));
    }

    #[test]
    fn test_tab_delimiter() {
        let temp_dir = TempDir::new().unwrap();
        let manager = OutputManager::new(temp_dir.path().join("out.tsv")).with_delimiter(b'\t');

        manager.write_records(&[record("CR-1")]).unwrap();

        let content = fs::read_to_string(manager.get_output_path()).unwrap();
        assert!(content.starts_with("Date\tCase Number\tTitle\tEvent\tCourt\tStatus\n"));
    }

    #[test]
    fn test_parent_directory_created_and_file_replaced() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("exports").join("2024").join("out.csv");
        let manager = OutputManager::new(&path);

        manager.write_records(&[record("A"), record("B")]).unwrap();
        manager.write_records(&[record("C")]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains(",C,"));
    }

    #[test]
    fn test_write_failure_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let manager = OutputManager::new(temp_dir.path().to_path_buf());

        let result = manager.write_records(&[record("A")]);
        assert!(matches!(result, Err(CalendarError::Write { .. })));
    }

    #[test]
    fn test_report_saved_next_to_output() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.output.path = temp_dir.path().join("calendars_parsed.csv");
        let manager = OutputManager::from_config(&config).unwrap();

        let extraction = FileExtraction {
            source_path: PathBuf::from("calendars/calendar_day_1_year_2024.html"),
            records: vec![record("A")],
            fragments: 8,
            dropped_fragments: 2,
            bytes: 512,
        };
        let mut progress = ExtractionProgress::new(1);
        progress.finish_file(&extraction);

        let report = ParseReport::new(&config, &[extraction], &progress);
        let path = manager.save_report_json(&report).unwrap();

        assert_eq!(path, temp_dir.path().join("calendars_parsed.report.json"));
        let loaded: ParseReport =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(loaded.total_records, 1);
        assert_eq!(loaded.dropped_fragments, 2);
        assert_eq!(loaded.files[0].fragments, 8);
    }
}
