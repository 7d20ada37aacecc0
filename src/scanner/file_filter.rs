use crate::config::DiscoveryConfig;
use crate::error::{CalendarError, Result};
use glob::{MatchOptions, Pattern};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Decides which directory entries are calendar pages.
pub struct FileFilter {
    pattern: Pattern,
    exclude_patterns: Vec<Regex>,
}

impl FileFilter {
    pub fn new(config: &DiscoveryConfig) -> Result<Self> {
        let pattern = Pattern::new(&config.pattern).map_err(|e| CalendarError::InvalidPattern {
            pattern: config.pattern.clone(),
            message: e.msg.to_string(),
        })?;

        let exclude_patterns = config
            .exclude_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| CalendarError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            pattern,
            exclude_patterns,
        })
    }

    pub fn is_calendar_file(&self, path: &Path) -> bool {
        let Some(filename) = path.file_name().and_then(|s| s.to_str()) else {
            return false;
        };

        // `*` must not cross into subdirectories
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };

        if !self.pattern.matches_with(filename, options) {
            return false;
        }

        !self.matches_any_exclude(filename)
    }

    pub fn matches_any_exclude(&self, text: &str) -> bool {
        self.exclude_patterns
            .iter()
            .any(|pattern| pattern.is_match(text))
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

fn day_year_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^calendar_day_(\d+)_year_(\d+)\.html$").ok())
        .as_ref()
}

/// Day and year numbers encoded in a `calendar_day_<N>_year_<Y>.html` file name.
pub fn parse_day_year(filename: &str) -> Option<(u32, u32)> {
    let caps = day_year_regex()?.captures(filename)?;
    let day = caps.get(1)?.as_str().parse().ok()?;
    let year = caps.get(2)?.as_str().parse().ok()?;
    Some((day, year))
}
