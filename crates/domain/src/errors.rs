use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid TTL for {0}: must be greater than zero")]
    InvalidTtl(String),

    #[error("Event source unavailable: {0}")]
    EventSourceUnavailable(String),

    #[error("Record data does not match record type {record_type}: {data}")]
    RecordDataMismatch { record_type: String, data: String },
}

/// An upstream object that cannot be turned into records at all.
///
/// Field-level problems (one bad address, a non-numeric TTL annotation) are
/// not errors; they are reported as `MappingIssue`s alongside the records
/// that could still be derived.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("Object has an empty name")]
    EmptyName,

    #[error("Object {object}: hostname annotation {annotation} contains no usable names")]
    NoUsableHostnames { object: String, annotation: String },

    #[error("Object {object}: cname annotation {annotation} has an invalid target '{target}'")]
    InvalidCnameTarget {
        object: String,
        annotation: String,
        target: String,
    },

    #[error("Object {object}: none of the {count} external addresses are valid")]
    NoValidAddresses { object: String, count: usize },
}
