use super::RecordType;
use crate::dns_name;
use crate::errors::DomainError;
use std::fmt;
use std::net::IpAddr;

/// Payload of a record: an address for A/AAAA, a target name for CNAME.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordData {
    Address(IpAddr),
    Target(String),
}

impl RecordData {
    pub fn as_target(&self) -> Option<&str> {
        match self {
            RecordData::Target(name) => Some(name),
            RecordData::Address(_) => None,
        }
    }
}

impl fmt::Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordData::Address(ip) => write!(f, "{}", ip),
            RecordData::Target(name) => f.write_str(name),
        }
    }
}

/// DNS record representation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DnsRecord {
    /// Owner name, canonical form
    name: String,
    record_type: RecordType,
    data: RecordData,
    /// Time to live in seconds, always > 0
    ttl: u32,
}

impl DnsRecord {
    /// Create a new DNS record.
    ///
    /// The owner name is normalised and must pass `dns_name::is_valid`; the
    /// data must fit the record type (an IPv4 address for A, IPv6 for AAAA,
    /// a valid name for CNAME).
    pub fn new(
        name: &str,
        record_type: RecordType,
        data: RecordData,
        ttl: u32,
    ) -> Result<Self, DomainError> {
        let name = dns_name::normalize(name);
        if !dns_name::is_valid(&name) {
            return Err(DomainError::InvalidDomainName(name));
        }
        if ttl == 0 {
            return Err(DomainError::InvalidTtl(name));
        }

        let data = match (record_type, data) {
            (RecordType::A, RecordData::Address(ip @ IpAddr::V4(_))) => RecordData::Address(ip),
            (RecordType::AAAA, RecordData::Address(ip @ IpAddr::V6(_))) => {
                RecordData::Address(ip)
            }
            (RecordType::CNAME, RecordData::Target(target)) => {
                let target = dns_name::normalize(&target);
                if !dns_name::is_valid(&target) {
                    return Err(DomainError::InvalidDomainName(target));
                }
                RecordData::Target(target)
            }
            (record_type, data) => {
                return Err(DomainError::RecordDataMismatch {
                    record_type: record_type.to_string(),
                    data: data.to_string(),
                })
            }
        };

        Ok(Self {
            name,
            record_type,
            data,
            ttl,
        })
    }

    /// Address record for `ip`, choosing A or AAAA from the address family.
    pub fn address(name: &str, ip: IpAddr, ttl: u32) -> Result<Self, DomainError> {
        let record_type = if ip.is_ipv4() {
            RecordType::A
        } else {
            RecordType::AAAA
        };
        Self::new(name, record_type, RecordData::Address(ip), ttl)
    }

    pub fn cname(name: &str, target: &str, ttl: u32) -> Result<Self, DomainError> {
        Self::new(
            name,
            RecordType::CNAME,
            RecordData::Target(target.to_string()),
            ttl,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn data(&self) -> &RecordData {
        &self.data
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }
}

impl fmt::Display for DnsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.name, self.ttl, self.record_type, self.data
        )
    }
}
