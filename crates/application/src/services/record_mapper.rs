use k8sdns_domain::{dns_name, AnnotationPolicy, DnsRecord, MappingError, ServiceObject};
use std::collections::BTreeMap;
use std::net::IpAddr;
use tracing::debug;

use crate::ports::CacheKey;

/// A field that was ignored while deriving records. The rest of the object
/// still produced records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingIssue {
    /// External address that is not an IP literal; dropped
    InvalidAddress(String),
    /// TTL annotation that is not a positive integer; default TTL used
    InvalidTtl(String),
    /// Hostname with malformed labels; its records are dropped
    InvalidHostname(String),
}

/// Records one object should currently own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedRecords {
    pub records: Vec<DnsRecord>,
    pub issues: Vec<MappingIssue>,
    pub ttl: u32,
}

impl DerivedRecords {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records grouped into answer sets by (name, type), in key order.
    pub fn into_groups(self) -> BTreeMap<CacheKey, Vec<DnsRecord>> {
        let mut groups: BTreeMap<CacheKey, Vec<DnsRecord>> = BTreeMap::new();
        for record in self.records {
            groups
                .entry(CacheKey::new(record.name(), record.record_type()))
                .or_default()
                .push(record);
        }
        groups
    }
}

/// Translates upstream service snapshots into DNS records following the
/// annotation policy. Pure: the same object and policy always give the same
/// output.
#[derive(Debug, Clone, Default)]
pub struct RecordMapper {
    policy: AnnotationPolicy,
}

impl RecordMapper {
    pub fn new(policy: AnnotationPolicy) -> Self {
        Self { policy }
    }

    /// Derive the records `object` should own right now.
    ///
    /// - no addresses and no cname annotation: nothing
    /// - TTL from the ttl annotation if it is a positive integer
    /// - one A/AAAA record per hostname and valid address
    /// - with a cname annotation, the object's own name gets a single CNAME
    ///   and no address records
    pub fn derive(&self, object: &ServiceObject) -> Result<DerivedRecords, MappingError> {
        let owner = dns_name::normalize(&object.name);
        if owner.is_empty() {
            return Err(MappingError::EmptyName);
        }

        let cname_target = match object.annotation(&self.policy.cname_key) {
            Some(raw) => {
                let target = dns_name::normalize(raw);
                if !dns_name::is_valid(&target) {
                    return Err(MappingError::InvalidCnameTarget {
                        object: object.key().to_string(),
                        annotation: self.policy.cname_key.clone(),
                        target,
                    });
                }
                Some(target)
            }
            None => None,
        };

        if object.external_addresses.is_empty() && cname_target.is_none() {
            return Ok(DerivedRecords {
                ttl: self.policy.default_ttl,
                ..Default::default()
            });
        }

        let mut issues = Vec::new();
        let ttl = self.ttl_for(object, &mut issues);
        let mut hostnames = self.hostnames_for(object, &owner)?;

        let mut addresses: Vec<IpAddr> = Vec::with_capacity(object.external_addresses.len());
        for raw in &object.external_addresses {
            match raw.trim().parse::<IpAddr>() {
                Ok(ip) if !addresses.contains(&ip) => addresses.push(ip),
                Ok(_) => {}
                Err(_) => issues.push(MappingIssue::InvalidAddress(raw.clone())),
            }
        }

        if addresses.is_empty() && !object.external_addresses.is_empty() && cname_target.is_none()
        {
            return Err(MappingError::NoValidAddresses {
                object: object.key().to_string(),
                count: object.external_addresses.len(),
            });
        }

        // The owner name carries the CNAME, so it can hold nothing else.
        if cname_target.is_some() {
            hostnames.retain(|h| *h != owner);
        }

        let mut records = Vec::with_capacity(hostnames.len() * addresses.len() + 1);
        for hostname in &hostnames {
            for ip in &addresses {
                match DnsRecord::address(hostname, *ip, ttl) {
                    Ok(record) => records.push(record),
                    Err(_) => {
                        issues.push(MappingIssue::InvalidHostname(hostname.clone()));
                        break;
                    }
                }
            }
        }

        if let Some(target) = cname_target {
            match DnsRecord::cname(&owner, &target, ttl) {
                Ok(record) => records.push(record),
                Err(_) => issues.push(MappingIssue::InvalidHostname(owner.clone())),
            }
        }

        debug!(
            object = %object.key(),
            records = records.len(),
            issues = issues.len(),
            ttl = ttl,
            "Derived records"
        );

        Ok(DerivedRecords {
            records,
            issues,
            ttl,
        })
    }

    /// Owner names `object` would produce, without validating anything else.
    /// Used when a delete arrives for an object whose applied records were
    /// never tracked.
    pub fn owner_names(&self, object: &ServiceObject) -> Vec<String> {
        let owner = dns_name::normalize(&object.name);
        let (mut names, owner_used) = match object.annotation(&self.policy.hostname_key) {
            Some(raw) => (split_hostnames(raw), false),
            None => (Vec::new(), true),
        };
        let owner_used = owner_used || object.annotation(&self.policy.cname_key).is_some();
        if owner_used && !owner.is_empty() && !names.contains(&owner) {
            names.push(owner);
        }
        names
    }

    fn ttl_for(&self, object: &ServiceObject, issues: &mut Vec<MappingIssue>) -> u32 {
        match object.annotation(&self.policy.ttl_key) {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(ttl) if ttl > 0 => ttl,
                _ => {
                    issues.push(MappingIssue::InvalidTtl(raw.to_string()));
                    self.policy.default_ttl
                }
            },
            None => self.policy.default_ttl,
        }
    }

    fn hostnames_for(
        &self,
        object: &ServiceObject,
        owner: &str,
    ) -> Result<Vec<String>, MappingError> {
        match object.annotation(&self.policy.hostname_key) {
            Some(raw) => {
                let names = split_hostnames(raw);
                if names.is_empty() {
                    return Err(MappingError::NoUsableHostnames {
                        object: object.key().to_string(),
                        annotation: self.policy.hostname_key.clone(),
                    });
                }
                Ok(names)
            }
            None => Ok(vec![owner.to_string()]),
        }
    }
}

fn split_hostnames(raw: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in raw.split(',').map(dns_name::normalize) {
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
    }
    names
}
