use crate::error::{CalendarError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_INPUT_DIR: &str = "calendars";
pub const DEFAULT_PATTERN: &str = "calendar_day_*_year_*.html";
pub const DEFAULT_MARKER: &str = "<td class=\"Data\">";
pub const DEFAULT_OUTPUT_FILE: &str = "calendars_parsed.csv";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub input_dir: PathBuf,
    pub pattern: String,
    pub exclude_patterns: Vec<String>,
    pub max_depth: usize,
    pub sort_files: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub marker: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
    pub delimiter: char,
    pub generate_report: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            pattern: DEFAULT_PATTERN.to_string(),
            exclude_patterns: Vec::new(),
            max_depth: 1, // the input directory itself, no subdirectories
            sort_files: true,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            delimiter: ',',
            generate_report: false,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(CalendarError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CalendarError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| CalendarError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        tracing::debug!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["calparse.toml", ".calparse.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref input_dir) = cli_args.input_dir {
            self.discovery.input_dir = input_dir.clone();
        }

        if let Some(ref pattern) = cli_args.pattern {
            self.discovery.pattern = pattern.clone();
        }

        if let Some(ref exclude) = cli_args.exclude {
            self.discovery.exclude_patterns.extend(exclude.iter().cloned());
        }

        if cli_args.unsorted {
            self.discovery.sort_files = false;
        }

        if let Some(ref output) = cli_args.output {
            self.output.path = output.clone();
        }

        if let Some(delimiter) = cli_args.delimiter {
            self.output.delimiter = delimiter;
        }

        if cli_args.report {
            self.output.generate_report = true;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| CalendarError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| CalendarError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.extraction.marker.is_empty() {
            return Err(CalendarError::Config {
                message: "Extraction marker must not be empty".to_string(),
            });
        }

        if self.discovery.pattern.trim().is_empty() {
            return Err(CalendarError::Config {
                message: "File pattern must not be empty".to_string(),
            });
        }

        glob::Pattern::new(&self.discovery.pattern).map_err(|e| CalendarError::InvalidPattern {
            pattern: self.discovery.pattern.clone(),
            message: e.msg.to_string(),
        })?;

        for pattern in &self.discovery.exclude_patterns {
            regex::Regex::new(pattern).map_err(|e| CalendarError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
        }

        if self.discovery.max_depth == 0 {
            return Err(CalendarError::Config {
                message: "Maximum directory depth must be greater than 0".to_string(),
            });
        }

        self.delimiter_byte()?;

        Ok(())
    }

    /// The delimiter as the single byte the CSV writer needs.
    pub fn delimiter_byte(&self) -> Result<u8> {
        let delimiter = self.output.delimiter;
        u8::try_from(delimiter)
            .ok()
            .filter(|byte| byte.is_ascii() && !matches!(byte, b'"' | b'\n' | b'\r'))
            .ok_or_else(|| CalendarError::Config {
                message: format!("Unsupported delimiter: {:?}", delimiter),
            })
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub input_dir: Option<PathBuf>,
    pub pattern: Option<String>,
    pub exclude: Option<Vec<String>>,
    pub unsorted: bool,
    pub output: Option<PathBuf>,
    pub delimiter: Option<char>,
    pub report: bool,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input_dir(mut self, input_dir: Option<PathBuf>) -> Self {
        self.input_dir = input_dir;
        self
    }

    pub fn with_pattern(mut self, pattern: Option<String>) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn with_exclude(mut self, exclude: Option<Vec<String>>) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn with_unsorted(mut self, unsorted: bool) -> Self {
        self.unsorted = unsorted;
        self
    }

    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    pub fn with_delimiter(mut self, delimiter: Option<char>) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_report(mut self, report: bool) -> Self {
        self.report = report;
        self
    }
}
