//! Record codec
//!
//! Maps engine [`Record`]s to provider records and back. Malformed values never
//! fail here; they travel to the provider as [`RawRecord`]s and any rejection
//! surfaces as a write error.

use std::net::IpAddr;

use dns_register_provider::{ProviderRecord, RawRecord, RecordType};

use crate::config::{MarkerFormat, DEFAULT_TTL};
use crate::types::Record;

/// TTL sent to the provider: the record's own TTL, or [`DEFAULT_TTL`] when unset or zero.
pub fn effective_ttl(record: &Record) -> u32 {
    record.explicit_ttl().unwrap_or(DEFAULT_TTL)
}

/// Builds the provider representation of `record`.
pub fn to_provider_record(record: &Record) -> ProviderRecord {
    let name = record.name.clone();
    let ttl = effective_ttl(record);

    match &record.record_type {
        RecordType::A | RecordType::Aaaa => {
            match parse_address(&record.record_type, &record.value) {
                Some(ip) => ProviderRecord::Address { name, ip, ttl },
                None => raw(record, ttl),
            }
        }
        RecordType::Cname => ProviderRecord::Cname {
            name,
            target: record.value.clone(),
            ttl,
        },
        RecordType::Txt => ProviderRecord::Txt {
            name,
            text: record.value.clone(),
            ttl,
        },
        RecordType::Ns => ProviderRecord::Ns {
            name,
            target: record.value.clone(),
            ttl,
        },
        RecordType::Mx => match parse_mx(&record.value) {
            Some((preference, target)) => ProviderRecord::Mx {
                name,
                preference,
                target,
                ttl,
            },
            None => raw(record, ttl),
        },
        RecordType::Other(_) => raw(record, ttl),
    }
}

/// Comparable value string of a provider record.
pub fn extract_value(record: &ProviderRecord) -> String {
    match record {
        ProviderRecord::Address { ip, .. } => ip.to_string(),
        ProviderRecord::Txt { text, .. } => text.clone(),
        ProviderRecord::Cname { target, .. } | ProviderRecord::Ns { target, .. } => target.clone(),
        ProviderRecord::Mx {
            preference, target, ..
        } => format!("{preference} {target}"),
        ProviderRecord::Raw(raw) => raw.data.clone(),
    }
}

/// Engine view of a provider record, as stored in the owned index.
pub fn from_provider_record(record: &ProviderRecord) -> Record {
    Record {
        name: record.name().to_string(),
        record_type: record.record_type(),
        value: extract_value(record),
        ttl: Some(record.ttl()).filter(|ttl| *ttl > 0),
    }
}

/// Ownership marker for the record named `name`.
pub fn make_marker(name: &str, format: &MarkerFormat) -> ProviderRecord {
    ProviderRecord::Txt {
        name: format.marker_name(name),
        text: format.payload(),
        ttl: DEFAULT_TTL,
    }
}

/// Normalizes a declared value so it compares equal to what [`extract_value`]
/// returns for the same record (e.g. `2001:0db8::0001` becomes `2001:db8::1`).
pub fn canonical_value(record_type: &RecordType, value: &str) -> String {
    match record_type {
        RecordType::A | RecordType::Aaaa => parse_address(record_type, value)
            .map_or_else(|| value.to_string(), |ip| ip.to_string()),
        RecordType::Mx => parse_mx(value)
            .map_or_else(|| value.to_string(), |(pref, target)| format!("{pref} {target}")),
        _ => value.to_string(),
    }
}

/// Parses an address whose family matches the record type.
fn parse_address(record_type: &RecordType, value: &str) -> Option<IpAddr> {
    let ip: IpAddr = value.trim().parse().ok()?;
    let family_matches = match record_type {
        RecordType::A => ip.is_ipv4(),
        RecordType::Aaaa => ip.is_ipv6(),
        _ => false,
    };
    family_matches.then_some(ip)
}

/// `"<preference> <target>"`
fn parse_mx(value: &str) -> Option<(u16, String)> {
    let mut parts = value.split_whitespace();
    let preference = parts.next()?.parse().ok()?;
    let target = parts.next()?.to_string();
    parts.next().is_none().then_some((preference, target))
}

fn raw(record: &Record, ttl: u32) -> ProviderRecord {
    ProviderRecord::Raw(RawRecord {
        name: record.name.clone(),
        record_type: record.record_type.clone(),
        ttl,
        data: record.value.clone(),
    })
}
