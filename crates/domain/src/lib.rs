//! k8sdns Domain Layer
pub mod answer_set;
pub mod config;
pub mod dns_name;
pub mod dns_record;
pub mod errors;
pub mod event;
pub mod service;
pub mod zones;

pub use answer_set::AnswerSet;
pub use config::{AnnotationPolicy, CliOverrides, Config, ConfigError};
pub use dns_record::{DnsRecord, RecordData, RecordType};
pub use errors::{DomainError, MappingError};
pub use event::ResourceEvent;
pub use service::{ObjectKey, ServiceObject};
pub use zones::Zones;
