pub mod calendar_scanner;
pub mod file_filter;

pub use calendar_scanner::{CalendarFile, CalendarScanner, ScanStatistics};
pub use file_filter::FileFilter;
