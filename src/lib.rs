pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, DiscoveryConfig, ExtractionConfig, OutputConfig};
pub use error::{CalendarError, Result, UserFriendlyError};

// Core functionality re-exports
pub use extractor::{
    combine_records, ExtractionProgress, ExtractionStage, Field, FileExtraction, OutputManager,
    ParseReport, Record, RecordExtractor,
};
pub use scanner::{CalendarFile, CalendarScanner, FileFilter};
pub use ui::{OutputFormatter, OutputMode, ProgressAwareOutput, ProgressManager};

use std::path::Path;

/// Runs the discover, extract and write pipeline for one configuration.
pub struct CalendarParser {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl CalendarParser {
    /// Fails with the first problem `Config::validate` finds.
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        config.validate()?;

        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        // Bars only make sense for an interactive human reader.
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Ok(Self {
            config,
            output_formatter,
            progress_manager,
        })
    }

    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(
            config,
            output_mode,
            cli_args.verbosity_level(),
            cli_args.quiet,
        )
    }

    /// Parses every discovered calendar page and writes the combined table.
    ///
    /// The output file is only touched once every page has been read.
    pub fn parse_calendars(&self) -> Result<ParseReport> {
        self.output_formatter
            .start_operation("Parsing court calendar pages");

        let calendars = self.discover_calendars()?;
        if calendars.is_empty() {
            self.output_formatter.warning(&format!(
                "No calendar pages found in {}",
                self.config.discovery.input_dir.display()
            ));
        } else {
            self.output_formatter
                .info(&format!("Found {} calendar pages", calendars.len()));
        }

        let (extractions, progress) = self.extract_calendars(&calendars)?;
        let records = combine_records(&extractions);

        let output_manager = OutputManager::from_config(&self.config)?;
        let written = output_manager.write_records(&records)?;
        self.output_formatter.success(&format!(
            "Wrote {} records to {}",
            written,
            output_manager.get_output_path().display()
        ));

        let report = ParseReport::new(&self.config, &extractions, &progress);
        if self.config.output.generate_report {
            let report_path = output_manager.save_report_json(&report)?;
            self.output_formatter
                .info(&format!("Saved report to {}", report_path.display()));
        }

        self.output_formatter.print_parse_summary(&progress, written);

        Ok(report)
    }

    /// Lists the calendar pages a run would parse, in parse order.
    pub fn discover_calendars(&self) -> Result<Vec<CalendarFile>> {
        let scanner = CalendarScanner::new(&self.config.discovery)?;
        let calendars = scanner.scan_directory(&self.config.discovery.input_dir)?;

        let stats = scanner.get_statistics(&calendars);
        self.output_formatter.debug(&stats.display_summary());

        Ok(calendars)
    }

    fn extract_calendars(
        &self,
        calendars: &[CalendarFile],
    ) -> Result<(Vec<FileExtraction>, ExtractionProgress)> {
        let extractor = RecordExtractor::new().with_marker(self.config.extraction.marker.clone());

        let file_progress = self
            .progress_manager
            .create_file_progress(calendars.len() as u64);
        let output = ProgressAwareOutput::new(&self.output_formatter, Some(&self.progress_manager));

        let progress_callback: &dyn Fn(ExtractionStage<'_>, &ExtractionProgress) =
            &|stage, progress| {
                match stage {
                    ExtractionStage::Started(calendar) => output.file_started(calendar),
                    ExtractionStage::Finished(extraction) => {
                        output.file_finished(extraction.records.len())
                    }
                }
                ui::progress::update_file_progress(&file_progress, progress);
            };

        let result = extractor.extract_files(calendars, Some(progress_callback));

        match &result {
            Ok((_, progress)) => ui::progress::finish_progress_with_summary(
                &file_progress,
                &format!("{} records", progress.records_extracted),
                progress.elapsed(),
            ),
            Err(_) => file_progress.abandon(),
        }

        result
    }

    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config).map_err(|source| {
            CalendarError::Write {
                path: output_path.as_ref().to_path_buf(),
                source,
            }
        })?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn handle_error(&self, error: &CalendarError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
        build_date: option_env!("BUILD_DATE").unwrap_or("unknown"),
        target: std::env::consts::ARCH.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_date: &'static str,
    pub target: String,
}

impl std::fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "calparse {} ({}) built on {} for {}",
            self.version, self.git_hash, self.build_date, self.target
        )
    }
}
