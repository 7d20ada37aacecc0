use crate::error::{CalendarError, UserFriendlyError};
use crate::extractor::{ExtractionProgress, ParseReport};
use crate::scanner::CalendarFile;
use crate::ui::ProgressManager;
use console::{style, Emoji, StyledObject, Term};
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

static DONE: Emoji = Emoji("✅ ", "✓ ");
static FAILED: Emoji = Emoji("❌ ", "✗ ");
static NOTE: Emoji = Emoji("ℹ️  ", "i ");
static CAUTION: Emoji = Emoji("⚠️  ", "! ");
static CALENDAR: Emoji = Emoji("📅 ", "> ");

/// Severity of a console message.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Level {
    Success,
    Error,
    Warning,
    Info,
    Debug,
}

impl Level {
    fn min_verbosity(self) -> u8 {
        match self {
            Level::Success | Level::Error | Level::Warning => 0,
            Level::Info => 1,
            Level::Debug => 2,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Info => "info",
            Level::Debug => "debug",
        }
    }

    fn emoji(self) -> &'static Emoji<'static, 'static> {
        match self {
            Level::Success => &DONE,
            Level::Error => &FAILED,
            Level::Warning => &CAUTION,
            Level::Info | Level::Debug => &NOTE,
        }
    }

    fn paint<'a>(self, message: &'a str) -> StyledObject<&'a str> {
        match self {
            Level::Success => style(message).green().bold(),
            Level::Error => style(message).red().bold(),
            Level::Warning => style(message).yellow().bold(),
            Level::Info => style(message).cyan(),
            Level::Debug => style(message).dim(),
        }
    }
}

/// Console reporter for parse runs. Errors go to stderr, everything else to stdout.
pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors =
            mode == OutputMode::Human && !quiet && Term::stdout().features().colors_supported();

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn success(&self, message: &str) {
        self.emit(Level::Success, message);
    }

    /// Always shown, even in quiet mode.
    pub fn error(&self, message: &str) {
        self.emit(Level::Error, message);
    }

    pub fn warning(&self, message: &str) {
        self.emit(Level::Warning, message);
    }

    pub fn info(&self, message: &str) {
        self.emit(Level::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.emit(Level::Debug, message);
    }

    pub fn start_operation(&self, operation: &str) {
        if !self.shows(Level::Info) {
            return;
        }
        match self.mode {
            OutputMode::Human if self.use_colors => {
                println!("{}{}", CALENDAR, style(operation).bold())
            }
            OutputMode::Human => println!("> {}", operation),
            OutputMode::Json => self.emit_json(json!({ "type": "operation", "name": operation })),
            OutputMode::Plain => println!("STARTING: {}", operation),
        }
    }

    /// `Parsing file <path> ...`
    pub fn file_started(&self, calendar: &CalendarFile) {
        if self.quiet {
            return;
        }
        match self.mode {
            OutputMode::Json => self.emit_json(json!({
                "type": "file_start",
                "path": calendar.display_path(),
                "day": calendar.day,
                "year": calendar.year,
            })),
            _ => println!("Parsing file {} ...", calendar.display_path()),
        }
    }

    /// `...done.`
    pub fn file_finished(&self, records: usize) {
        if self.quiet {
            return;
        }
        match self.mode {
            OutputMode::Json => self.emit_json(json!({ "type": "file_done", "records": records })),
            _ => println!("...done."),
        }
    }

    pub fn print_user_friendly_error(&self, error: &CalendarError) {
        self.error(&error.user_message());

        let Some(suggestion) = error.suggestion() else {
            return;
        };
        match self.mode {
            OutputMode::Json => {
                self.emit_json(json!({ "type": "suggestion", "message": suggestion }))
            }
            OutputMode::Human if self.use_colors => eprintln!(
                "{}{}",
                NOTE,
                style(format!("Suggestion: {}", suggestion)).cyan()
            ),
            OutputMode::Human => eprintln!("Suggestion: {}", suggestion),
            OutputMode::Plain => eprintln!("SUGGESTION: {}", suggestion),
        }
    }

    pub fn print_parse_summary(&self, progress: &ExtractionProgress, records_written: usize) {
        if self.quiet {
            return;
        }

        if self.mode == OutputMode::Json {
            self.emit_json(json!({
                "type": "summary",
                "files_parsed": progress.files_processed,
                "records_written": records_written,
                "dropped_fragments": progress.dropped_fragments,
                "bytes_processed": progress.bytes_processed,
                "duration_ms": progress.elapsed().as_millis() as u64,
            }));
            return;
        }

        let mut rows = vec![
            ("Files parsed", progress.files_processed.to_string()),
            ("Records written", records_written.to_string()),
            ("Time taken", format_duration(progress.elapsed())),
        ];
        if progress.dropped_fragments > 0 {
            rows.push((
                "Dropped cells",
                format!("{} (incomplete trailing records)", progress.dropped_fragments),
            ));
        }

        if self.mode == OutputMode::Plain {
            println!("COMPLETED: Calendar parsing");
            for (label, value) in rows {
                println!("{}: {}", label, value);
            }
            return;
        }

        println!();
        self.print_separator();
        if self.use_colors {
            println!("{}{}", DONE, style("Calendar parsing completed!").green().bold());
        } else {
            println!("✓ Calendar parsing completed!");
        }
        println!();
        for (label, value) in rows {
            let label = format!("{}:", label);
            if self.use_colors {
                println!("  {:<17}{}", label, style(value).cyan().bold());
            } else {
                println!("  {:<17}{}", label, value);
            }
        }
        self.print_separator();
    }

    pub fn print_parse_report(&self, report: &ParseReport) {
        if self.quiet {
            return;
        }

        if self.mode == OutputMode::Json {
            println!(
                "{}",
                serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
            );
            return;
        }

        self.print_header("Parse Report");
        for file in &report.files {
            match file.dropped_fragments {
                0 => println!("  {}: {} records", file.path.display(), file.records),
                dropped => println!(
                    "  {}: {} records ({} trailing cells dropped)",
                    file.path.display(),
                    file.records,
                    dropped
                ),
            }
        }
        println!();
        println!("Parsed at: {}", report.parsed_at.format("%Y-%m-%d %H:%M UTC"));
    }

    pub fn print_header(&self, title: &str) {
        if self.quiet {
            return;
        }
        match self.mode {
            OutputMode::Json => self.emit_json(json!({ "type": "header", "title": title })),
            OutputMode::Human if self.use_colors => {
                println!("\n{}\n", style(title).bold().cyan().underlined())
            }
            OutputMode::Human => println!("\n=== {} ===\n", title),
            OutputMode::Plain => println!("=== {} ===", title),
        }
    }

    pub fn print_separator(&self) {
        if self.quiet || self.mode == OutputMode::Json {
            return;
        }
        if self.use_colors {
            println!("{}", style("─".repeat(60)).dim());
        } else {
            println!("{}", "-".repeat(60));
        }
    }

    fn shows(&self, level: Level) -> bool {
        if level == Level::Error {
            return true;
        }
        !self.quiet && self.verbose_level >= level.min_verbosity()
    }

    fn emit(&self, level: Level, message: &str) {
        if !self.shows(level) {
            return;
        }

        let line = match self.mode {
            OutputMode::Json => {
                self.emit_json(json!({
                    "type": "message",
                    "level": level.name(),
                    "message": message,
                    "timestamp": chrono::Utc::now().to_rfc3339(),
                }));
                return;
            }
            OutputMode::Plain => format!("{}: {}", level.name().to_uppercase(), message),
            OutputMode::Human if self.use_colors => {
                format!("{}{}", level.emoji(), level.paint(message))
            }
            OutputMode::Human => format!("{}{}", level.emoji(), message),
        };

        if level == Level::Error {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    fn emit_json(&self, value: Value) {
        println!("{}", value);
    }
}

pub(crate) fn format_duration(duration: Duration) -> String {
    match duration.as_secs() {
        0 => format!("{}ms", duration.as_millis()),
        secs @ 1..=59 => format!("{}s", secs),
        secs => format!("{}m {}s", secs / 60, secs % 60),
    }
}

/// Routes per-file lines around an active progress bar so they do not tear it.
pub struct ProgressAwareOutput<'a> {
    formatter: &'a OutputFormatter,
    progress_manager: Option<&'a ProgressManager>,
}

impl<'a> ProgressAwareOutput<'a> {
    pub fn new(
        formatter: &'a OutputFormatter,
        progress_manager: Option<&'a ProgressManager>,
    ) -> Self {
        Self {
            formatter,
            progress_manager,
        }
    }

    pub fn suspend_and_print<F>(&self, f: F)
    where
        F: FnOnce(&OutputFormatter),
    {
        match self.progress_manager {
            Some(pm) => pm.suspend(|| f(self.formatter)),
            None => f(self.formatter),
        }
    }

    pub fn file_started(&self, calendar: &CalendarFile) {
        self.suspend_and_print(|f| f.file_started(calendar));
    }

    pub fn file_finished(&self, records: usize) {
        self.suspend_and_print(|f| f.file_finished(records));
    }
}
