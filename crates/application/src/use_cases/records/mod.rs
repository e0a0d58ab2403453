mod push_records;

pub use push_records::PushRecordsUseCase;
