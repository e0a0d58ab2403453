mod record_mapper;

pub use record_mapper::{DerivedRecords, MappingIssue, RecordMapper};
