use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "calparse")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract court calendar records from saved HTML pages into a single CSV")]
#[command(
    long_about = "calparse reads every saved calendar page matching calendar_day_*_year_*.html \
                  in ./calendars, pulls the text of each <td class=\"Data\"> cell, groups the \
                  cells six at a time into records and writes them all to calendars_parsed.csv."
)]
#[command(after_help = "EXAMPLES:\n  \
    calparse\n  \
    calparse --input pages --output out/calendar.csv\n  \
    calparse --delimiter tab --output calendars.tsv\n  \
    calparse --dry-run -v\n  \
    calparse --config my-config.toml --report")]
pub struct Cli {
    /// Directory holding the saved calendar pages
    #[arg(short, long, help = "Input directory (default: calendars)")]
    pub input: Option<PathBuf>,

    /// Filename glob selecting calendar pages
    #[arg(short, long, help = "File name pattern (default: calendar_day_*_year_*.html)")]
    pub pattern: Option<String>,

    /// Regular expressions for file names to skip
    #[arg(short, long, value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,

    /// Output file path
    #[arg(short, long, help = "Output file (default: calendars_parsed.csv)")]
    pub output: Option<PathBuf>,

    /// Field delimiter for the output file
    #[arg(
        short,
        long,
        value_parser = parse_delimiter,
        help = "Field delimiter: a single character, or 'tab'"
    )]
    pub delimiter: Option<char>,

    /// Keep files in filesystem enumeration order
    #[arg(long, help = "Do not sort discovered files by year and day")]
    pub unsorted: bool,

    /// Write a JSON report next to the output file
    #[arg(long)]
    pub report: bool,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for console messages
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (list files without parsing)
    #[arg(long, help = "List the files that would be parsed without writing output")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_input_dir(self.input.clone())
            .with_pattern(self.pattern.clone())
            .with_exclude(self.exclude.clone())
            .with_unsorted(self.unsorted)
            .with_output(self.output.clone())
            .with_delimiter(self.delimiter)
            .with_report(self.report)
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

pub fn parse_delimiter(s: &str) -> std::result::Result<char, String> {
    match s {
        "tab" | "\\t" | "\t" => return Ok('\t'),
        "comma" => return Ok(','),
        "semicolon" => return Ok(';'),
        "pipe" => return Ok('|'),
        _ => {}
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() && !matches!(c, '"' | '\n' | '\r') => Ok(c),
        (Some(_), None) => Err(format!("Unsupported delimiter: {:?}", s)),
        _ => Err("Delimiter must be a single character (or 'tab')".to_string()),
    }
}
