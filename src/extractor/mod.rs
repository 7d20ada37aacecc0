pub mod output_manager;
pub mod record_extractor;

pub use output_manager::{FileReport, OutputManager, ParseReport};
pub use record_extractor::{
    combine_records, ExtractionProgress, ExtractionStage, Field, FileExtraction, Record,
    RecordBuilder, RecordExtractor, FIELDS_PER_RECORD,
};
