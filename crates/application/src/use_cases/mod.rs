pub mod lookup;
pub mod records;

// Re-export use cases
pub use lookup::LookupRecordsUseCase;
pub use records::PushRecordsUseCase;
