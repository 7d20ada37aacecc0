use crate::config::DiscoveryConfig;
use crate::error::{CalendarError, Result};
use crate::scanner::file_filter::{parse_day_year, FileFilter};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct CalendarFile {
    pub source_path: PathBuf,
    pub relative_path: PathBuf,
    pub filename: String,
    pub size: u64,
    pub modified: SystemTime,
    pub day: Option<u32>,
    pub year: Option<u32>,
}

impl CalendarFile {
    pub fn new(
        source_path: PathBuf,
        relative_path: PathBuf,
        size: u64,
        modified: SystemTime,
    ) -> Self {
        let filename = source_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();

        let (day, year) = match parse_day_year(&filename) {
            Some((day, year)) => (Some(day), Some(year)),
            None => (None, None),
        };

        Self {
            source_path,
            relative_path,
            filename,
            size,
            modified,
            day,
            year,
        }
    }

    /// Dated pages first, by year then day; undated pages after them.
    fn sort_key(&self) -> (bool, Option<u32>, Option<u32>) {
        (self.year.is_none(), self.year, self.day)
    }

    pub fn display_path(&self) -> String {
        self.source_path.display().to_string()
    }
}

pub struct CalendarScanner {
    filter: FileFilter,
    max_depth: usize,
    sort_files: bool,
}

impl CalendarScanner {
    pub fn new(config: &DiscoveryConfig) -> Result<Self> {
        Ok(Self {
            filter: FileFilter::new(config)?,
            max_depth: config.max_depth,
            sort_files: config.sort_files,
        })
    }

    /// Lists the calendar pages under `root`.
    ///
    /// A missing directory yields an empty list rather than an error, so a run
    /// without any saved pages still produces a header-only output file.
    pub fn scan_directory<P: AsRef<Path>>(&self, root: P) -> Result<Vec<CalendarFile>> {
        let root_path = root.as_ref();

        if !root_path.exists() {
            tracing::warn!(dir = %root_path.display(), "input directory does not exist");
            return Ok(Vec::new());
        }

        if !root_path.is_dir() {
            return Err(CalendarError::InvalidPath {
                path: format!("{} is not a directory", root_path.display()),
            });
        }

        let mut calendars = Vec::new();

        let walker = WalkDir::new(root_path)
            .min_depth(1)
            .max_depth(self.max_depth)
            .follow_links(true);

        for entry in walker {
            let entry = entry.map_err(|err| CalendarError::Io(err.into()))?;

            if !entry.file_type().is_file() || !self.filter.is_calendar_file(entry.path()) {
                continue;
            }

            let metadata = entry.metadata().map_err(|err| CalendarError::Io(err.into()))?;
            let relative_path = entry
                .path()
                .strip_prefix(root_path)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| PathBuf::from(entry.file_name()));
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

            tracing::debug!(
                file = %entry.path().display(),
                size = metadata.len(),
                "discovered calendar file"
            );

            calendars.push(CalendarFile::new(
                entry.path().to_path_buf(),
                relative_path,
                metadata.len(),
                modified,
            ));
        }

        if self.sort_files {
            calendars.sort_by(|a, b| {
                a.sort_key()
                    .cmp(&b.sort_key())
                    .then_with(|| a.relative_path.cmp(&b.relative_path))
            });
        }

        tracing::info!(
            dir = %root_path.display(),
            pattern = self.filter.pattern(),
            files = calendars.len(),
            "calendar discovery finished"
        );

        Ok(calendars)
    }

    pub fn get_statistics(&self, calendars: &[CalendarFile]) -> ScanStatistics {
        let years: Vec<u32> = calendars.iter().filter_map(|c| c.year).collect();

        ScanStatistics {
            total_files: calendars.len(),
            total_size: calendars.iter().map(|c| c.size).sum(),
            earliest_year: years.iter().min().copied(),
            latest_year: years.iter().max().copied(),
            unnamed_files: calendars.iter().filter(|c| c.year.is_none()).count(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ScanStatistics {
    pub total_files: usize,
    pub total_size: u64,
    pub earliest_year: Option<u32>,
    pub latest_year: Option<u32>,
    pub unnamed_files: usize,
}

impl ScanStatistics {
    pub fn display_summary(&self) -> String {
        let mut lines = vec![
            "Calendar discovery:".to_string(),
            format!("  Pages found: {}", self.total_files),
            format!("  Bytes on disk: {}", format_bytes(self.total_size)),
        ];

        if let (Some(first), Some(last)) = (self.earliest_year, self.latest_year) {
            lines.push(format!("  Years covered: {}-{}", first, last));
        }
        if self.unnamed_files > 0 {
            lines.push(format!(
                "  Pages without day/year in name: {}",
                self.unnamed_files
            ));
        }

        lines.join("\n")
    }
}

pub(crate) fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let value = bytes as f64;

    if value < KIB {
        format!("{} B", bytes)
    } else if value < KIB * KIB {
        format!("{:.1} KB", value / KIB)
    } else if value < KIB * KIB * KIB {
        format!("{:.1} MB", value / (KIB * KIB))
    } else {
        format!("{:.1} GB", value / (KIB * KIB * KIB))
    }
}
