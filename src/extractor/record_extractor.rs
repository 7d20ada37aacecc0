use crate::config::DEFAULT_MARKER;
use crate::error::{CalendarError, Result};
use crate::scanner::CalendarFile;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Number of cells that make up one calendar entry.
pub const FIELDS_PER_RECORD: usize = 6;

/// One calendar entry, in column order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Case Number")]
    pub case_number: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Event")]
    pub event: String,
    #[serde(rename = "Court")]
    pub court: String,
    #[serde(rename = "Status")]
    pub status: String,
}

impl Record {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Date => &self.date,
            Field::CaseNumber => &self.case_number,
            Field::Title => &self.title,
            Field::Event => &self.event,
            Field::Court => &self.court,
            Field::Status => &self.status,
        }
    }

    /// Values in column order, ready for a delimited writer.
    pub fn values(&self) -> [&str; FIELDS_PER_RECORD] {
        Field::ALL.map(|field| self.get(field))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Date,
    CaseNumber,
    Title,
    Event,
    Court,
    Status,
}

impl Field {
    pub const ALL: [Field; FIELDS_PER_RECORD] = [
        Field::Date,
        Field::CaseNumber,
        Field::Title,
        Field::Event,
        Field::Court,
        Field::Status,
    ];

    /// Field that a cell at zero-based `position` fills.
    pub fn at_position(position: usize) -> Field {
        Self::ALL[position % FIELDS_PER_RECORD]
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Date => "Date",
            Field::CaseNumber => "Case Number",
            Field::Title => "Title",
            Field::Event => "Event",
            Field::Court => "Court",
            Field::Status => "Status",
        }
    }

    pub fn is_last(self) -> bool {
        self == Field::Status
    }

    pub fn header() -> [&'static str; FIELDS_PER_RECORD] {
        Self::ALL.map(Field::label)
    }
}

/// Accumulates one group of cells until `Status` completes it.
#[derive(Debug, Default)]
pub struct RecordBuilder {
    record: Record,
    filled: usize,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Date => &mut self.record.date,
            Field::CaseNumber => &mut self.record.case_number,
            Field::Title => &mut self.record.title,
            Field::Event => &mut self.record.event,
            Field::Court => &mut self.record.court,
            Field::Status => &mut self.record.status,
        };
        *slot = value;
        self.filled += 1;
    }

    /// Number of cells in the unfinished group.
    pub fn pending(&self) -> usize {
        self.filled
    }

    /// Hands out the completed record and resets for the next group.
    pub fn finish(&mut self) -> Record {
        self.filled = 0;
        std::mem::take(&mut self.record)
    }
}

/// Records pulled out of one calendar page.
#[derive(Debug, Clone, Default)]
pub struct FileExtraction {
    pub source_path: PathBuf,
    pub records: Vec<Record>,
    pub fragments: usize,
    pub dropped_fragments: usize,
    pub bytes: u64,
}

#[derive(Debug, Clone)]
pub struct ExtractionProgress {
    pub files_processed: usize,
    pub total_files: usize,
    pub records_extracted: usize,
    pub dropped_fragments: usize,
    pub bytes_processed: u64,
    pub current_file: Option<String>,
    pub start_time: Instant,
}

impl ExtractionProgress {
    pub fn new(total_files: usize) -> Self {
        Self {
            files_processed: 0,
            total_files,
            records_extracted: 0,
            dropped_fragments: 0,
            bytes_processed: 0,
            current_file: None,
            start_time: Instant::now(),
        }
    }

    pub fn start_file(&mut self, filename: String) {
        self.current_file = Some(filename);
    }

    pub fn finish_file(&mut self, extraction: &FileExtraction) {
        self.files_processed += 1;
        self.records_extracted += extraction.records.len();
        self.dropped_fragments += extraction.dropped_fragments;
        self.bytes_processed += extraction.bytes;
    }

    pub fn percentage(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.files_processed as f64 / self.total_files as f64) * 100.0
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Where a file is in its pass through the extractor.
#[derive(Debug, Clone, Copy)]
pub enum ExtractionStage<'a> {
    Started(&'a CalendarFile),
    Finished(&'a FileExtraction),
}

pub type ProgressCallback<'a> = &'a dyn Fn(ExtractionStage<'_>, &ExtractionProgress);

pub struct RecordExtractor {
    marker: String,
}

impl RecordExtractor {
    pub fn new() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
        }
    }

    pub fn with_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Cell values in source order: the text after each marker up to the next `<`.
    pub fn cell_values<'a>(&'a self, content: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        content.split(self.marker.as_str()).skip(1).map(|fragment| {
            let end = fragment.find('<').unwrap_or(fragment.len());
            fragment[..end].trim()
        })
    }

    /// Regroups the cell values of `content` into six-field records.
    ///
    /// A trailing group with fewer than six cells never becomes a record.
    pub fn extract(&self, content: &str) -> FileExtraction {
        let mut records = Vec::new();
        let mut builder = RecordBuilder::new();
        let mut fragments = 0;

        for (position, value) in self.cell_values(content).enumerate() {
            let field = Field::at_position(position);
            builder.set(field, value.to_string());
            if field.is_last() {
                records.push(builder.finish());
            }
            fragments += 1;
        }

        FileExtraction {
            source_path: PathBuf::new(),
            records,
            fragments,
            dropped_fragments: builder.pending(),
            bytes: content.len() as u64,
        }
    }

    /// Reads one calendar page fully and extracts its records.
    pub fn extract_file(&self, calendar: &CalendarFile) -> Result<FileExtraction> {
        let content =
            fs::read_to_string(&calendar.source_path).map_err(|source| CalendarError::Read {
                path: calendar.source_path.clone(),
                source,
            })?;

        let mut extraction = self.extract(&content);
        extraction.source_path = calendar.source_path.clone();

        tracing::debug!(
            file = %calendar.display_path(),
            fragments = extraction.fragments,
            records = extraction.records.len(),
            "extracted calendar records"
        );

        if extraction.dropped_fragments > 0 {
            tracing::debug!(
                file = %calendar.display_path(),
                dropped = extraction.dropped_fragments,
                "trailing incomplete record dropped"
            );
        }

        Ok(extraction)
    }

    /// Extracts every file in order. The first unreadable file aborts the run.
    pub fn extract_files(
        &self,
        calendars: &[CalendarFile],
        progress_callback: Option<ProgressCallback<'_>>,
    ) -> Result<(Vec<FileExtraction>, ExtractionProgress)> {
        let mut progress = ExtractionProgress::new(calendars.len());
        let mut extractions = Vec::with_capacity(calendars.len());

        for calendar in calendars {
            progress.start_file(calendar.display_path());
            if let Some(callback) = progress_callback {
                callback(ExtractionStage::Started(calendar), &progress);
            }

            let extraction = self.extract_file(calendar)?;
            progress.finish_file(&extraction);

            if let Some(callback) = progress_callback {
                callback(ExtractionStage::Finished(&extraction), &progress);
            }

            extractions.push(extraction);
        }

        Ok((extractions, progress))
    }
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Joins per-file record sets, keeping file order and in-file order.
pub fn combine_records(extractions: &[FileExtraction]) -> Vec<Record> {
    let total = extractions.iter().map(|e| e.records.len()).sum();
    let mut combined = Vec::with_capacity(total);
    for extraction in extractions {
        combined.extend(extraction.records.iter().cloned());
    }
    combined
}
